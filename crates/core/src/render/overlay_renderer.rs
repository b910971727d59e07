use crate::detection::domain::detection::Detection;
use crate::render::domain::overlay_surface::{Color, OverlaySurface, StrokeStyle, TextStyle};

/// Colours and metrics for face annotations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayStyle {
    pub stroke: StrokeStyle,
    pub text: TextStyle,
    /// Vertical distance between label baselines.
    pub line_height: f64,
    /// Gap between the lowest label baseline and the box top.
    pub label_gap: f64,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            stroke: StrokeStyle {
                color: Color::GREEN,
                width: 2.0,
            },
            text: TextStyle {
                color: Color::GREEN,
                size: 16.0,
            },
            line_height: 18.0,
            label_gap: 6.0,
        }
    }
}

pub fn age_label(years: u32) -> String {
    format!("Age: {years} years")
}

pub fn emotion_label(expression: &str) -> String {
    format!("Emotion: {expression}")
}

/// Label lines for one face, top to bottom.
pub fn annotation_labels(detection: &Detection) -> Vec<String> {
    let mut labels = Vec::with_capacity(2);
    if let Some(age) = detection.rounded_age() {
        labels.push(age_label(age));
    }
    if let Some(expression) = detection.dominant_expression() {
        labels.push(emotion_label(expression));
    }
    labels
}

/// Draws detections onto an overlay surface.
#[derive(Clone, Debug, Default)]
pub struct OverlayRenderer {
    style: OverlayStyle,
}

impl OverlayRenderer {
    pub fn new(style: OverlayStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    /// Clears the surface and draws every detection, mapping boxes from
    /// frame pixels to surface pixels.
    ///
    /// An empty `detections` slice leaves the surface blank.
    pub fn render(
        &self,
        surface: &mut dyn OverlaySurface,
        detections: &[Detection],
        frame_size: (u32, u32),
    ) {
        surface.clear();
        let (sx, sy) = scale_factors(frame_size, surface.size());

        for detection in detections {
            let rect = detection.bbox.scale(sx, sy);
            surface.stroke_rect(&rect, &self.style.stroke);

            let labels = annotation_labels(detection);
            let n = labels.len() as f64;
            // Keep the top label on screen when the face touches the top edge.
            let first_baseline =
                (rect.y - self.style.label_gap - (n - 1.0) * self.style.line_height)
                    .max(self.style.line_height);
            for (i, label) in labels.iter().enumerate() {
                let y = first_baseline + i as f64 * self.style.line_height;
                surface.fill_text(label, rect.x, y, &self.style.text);
            }
        }
    }
}

fn scale_factors(frame: (u32, u32), surface: (u32, u32)) -> (f64, f64) {
    let axis = |f: u32, s: u32| if f == 0 { 1.0 } else { s as f64 / f as f64 };
    (axis(frame.0, surface.0), axis(frame.1, surface.1))
}
