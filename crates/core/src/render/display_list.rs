use crate::render::domain::overlay_surface::{OverlaySurface, StrokeStyle, TextStyle};
use crate::shared::bounding_box::BoundingBox;

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    StrokeRect {
        rect: BoundingBox,
        style: StrokeStyle,
    },
    FillText {
        text: String,
        x: f64,
        y: f64,
        style: TextStyle,
    },
}

/// Retained-mode overlay: records draw commands for a UI to replay.
///
/// `revision` changes on every mutation so a renderer can tell when its
/// cached geometry is stale.
#[derive(Clone, Debug, Default)]
pub struct DisplayList {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
    revision: u64,
}

impl DisplayList {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Text of every label, in draw order.
    pub fn labels(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillText { text, .. } => Some(text.as_str()),
                DrawCommand::StrokeRect { .. } => None,
            })
            .collect()
    }

    pub fn rects(&self) -> Vec<BoundingBox> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::StrokeRect { rect, .. } => Some(*rect),
                DrawCommand::FillText { .. } => None,
            })
            .collect()
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

impl OverlaySurface for DisplayList {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.commands.clear();
        self.touch();
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.touch();
    }

    fn stroke_rect(&mut self, rect: &BoundingBox, style: &StrokeStyle) {
        self.commands.push(DrawCommand::StrokeRect {
            rect: *rect,
            style: *style,
        });
        self.touch();
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_string(),
            x,
            y,
            style: *style,
        });
        self.touch();
    }
}
