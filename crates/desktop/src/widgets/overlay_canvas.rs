use std::cell::Cell;
use std::sync::{Arc, Mutex, PoisonError};

use iced::widget::canvas::{self, Cache, Path, Stroke};
use iced::{mouse, Color, Pixels, Point, Rectangle, Renderer, Size, Theme};

use facecam_core::render::display_list::{DisplayList, DrawCommand};
use facecam_core::render::domain::overlay_surface::{self, OverlaySurface};

/// Replays the session's display list on top of the video.
///
/// Geometry is cached and rebuilt only when the list's revision moves or
/// the widget bounds change.
pub struct OverlayCanvas {
    list: Arc<Mutex<DisplayList>>,
}

impl OverlayCanvas {
    pub fn new(list: Arc<Mutex<DisplayList>>) -> Self {
        Self { list }
    }
}

#[derive(Default)]
pub struct OverlayState {
    cache: Cache,
    revision: Cell<Option<u64>>,
}

impl<Message> canvas::Program<Message> for OverlayCanvas {
    type State = OverlayState;

    fn draw(
        &self,
        state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let list = self.list.lock().unwrap_or_else(PoisonError::into_inner);
        if state.revision.get() != Some(list.revision()) {
            state.cache.clear();
            state.revision.set(Some(list.revision()));
        }

        let geometry = state.cache.draw(renderer, bounds.size(), |frame| {
            let scale = scale_to_bounds(list.size(), bounds.size());
            for command in list.commands() {
                draw_command(frame, command, scale);
            }
        });
        vec![geometry]
    }
}

fn draw_command(frame: &mut canvas::Frame, command: &DrawCommand, (sx, sy): (f32, f32)) {
    match command {
        DrawCommand::StrokeRect { rect, style } => {
            let path = Path::rectangle(
                Point::new(rect.x as f32 * sx, rect.y as f32 * sy),
                Size::new(rect.width as f32 * sx, rect.height as f32 * sy),
            );
            frame.stroke(
                &path,
                Stroke::default()
                    .with_color(to_iced(style.color))
                    .with_width(style.width),
            );
        }
        DrawCommand::FillText { text, x, y, style } => {
            // Canvas text is top-anchored; the list records baselines.
            frame.fill_text(canvas::Text {
                content: text.clone(),
                position: Point::new(*x as f32 * sx, *y as f32 * sy - style.size),
                color: to_iced(style.color),
                size: Pixels(style.size),
                ..canvas::Text::default()
            });
        }
    }
}

/// Per-axis factor from display-list pixels to widget pixels.
fn scale_to_bounds(list: (u32, u32), bounds: Size) -> (f32, f32) {
    let axis = |l: u32, b: f32| if l == 0 { 1.0 } else { b / l as f32 };
    (axis(list.0, bounds.width), axis(list.1, bounds.height))
}

fn to_iced(color: overlay_surface::Color) -> Color {
    Color::from_rgb8(color.r, color.g, color.b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_scale_matches_when_sizes_agree() {
        let (sx, sy) = scale_to_bounds((1000, 563), Size::new(1000.0, 563.0));
        assert_relative_eq!(sx, 1.0);
        assert_relative_eq!(sy, 1.0);
    }

    #[test]
    fn test_scale_stretches_to_bounds() {
        let (sx, sy) = scale_to_bounds((640, 480), Size::new(1280.0, 720.0));
        assert_relative_eq!(sx, 2.0);
        assert_relative_eq!(sy, 1.5);
    }

    #[test]
    fn test_empty_list_does_not_divide_by_zero() {
        assert_eq!(scale_to_bounds((0, 0), Size::new(100.0, 100.0)), (1.0, 1.0));
    }

    #[test]
    fn test_overlay_green_maps_to_iced() {
        let c = to_iced(overlay_surface::Color::GREEN);
        assert_relative_eq!(c.g, 1.0);
        assert_relative_eq!(c.r, 0.0);
    }
}
