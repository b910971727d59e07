use facecam_core::render::display_list::DisplayList;
use facecam_core::render::domain::overlay_surface::{OverlaySurface, StrokeStyle, TextStyle};
use facecam_core::shared::bounding_box::BoundingBox;

/// Overlay for headless runs: reports each frame's annotations to the log
/// whenever they differ from the previous frame.
pub struct ConsoleSurface {
    list: DisplayList,
    last_summary: Option<String>,
}

impl ConsoleSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            list: DisplayList::new(width, height),
            last_summary: None,
        }
    }

    fn flush(&mut self) {
        let summary = frame_summary(&self.list);
        if self.last_summary.as_deref() != Some(summary.as_str()) {
            log::info!("{summary}");
            self.last_summary = Some(summary);
        }
    }
}

/// One-line description of a drawn frame.
pub fn frame_summary(list: &DisplayList) -> String {
    let faces = list.rects().len();
    let labels = list.labels();
    let noun = if faces == 1 { "face" } else { "faces" };
    if labels.is_empty() {
        format!("{faces} {noun}")
    } else {
        format!("{faces} {noun}: {}", labels.join(" | "))
    }
}

impl OverlaySurface for ConsoleSurface {
    fn size(&self) -> (u32, u32) {
        self.list.size()
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.list.resize(width, height);
        log::debug!("Overlay resized to {width}x{height}");
    }

    fn clear(&mut self) {
        if !self.list.is_empty() || self.last_summary.is_some() {
            self.flush();
        }
        self.list.clear();
    }

    fn stroke_rect(&mut self, rect: &BoundingBox, style: &StrokeStyle) {
        self.list.stroke_rect(rect, style);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) {
        self.list.fill_text(text, x, y, style);
    }
}
