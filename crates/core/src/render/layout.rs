/// Viewports at least this wide get the 16:9 layout.
pub const WIDE_VIEWPORT_MIN: f64 = 768.0;

/// Upper bound on the video/overlay width.
pub const MAX_CANVAS_WIDTH: f64 = 1440.0;

/// Share of the container used on narrow viewports.
const NARROW_FILL: f64 = 0.95;

/// Display size shared by the video and its overlay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Computes the video/overlay size for a viewport and its container.
///
/// Wide viewports use 16:9 at the full container width, narrow ones 4:3
/// at 95% of it. Width is capped at [`MAX_CANVAS_WIDTH`] either way.
pub fn canvas_size(viewport_width: f64, container_width: f64) -> CanvasSize {
    let container = container_width.max(0.0);
    let (width, height) = if viewport_width >= WIDE_VIEWPORT_MIN {
        let w = container.min(MAX_CANVAS_WIDTH);
        (w, w / 16.0 * 9.0)
    } else {
        let w = (container * NARROW_FILL).min(MAX_CANVAS_WIDTH);
        (w, w / 4.0 * 3.0)
    };
    CanvasSize::new(width.round() as u32, height.round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1280.0, 1000.0, 1000, 563)]
    #[case(768.0, 768.0, 768, 432)]
    #[case(2560.0, 2000.0, 1440, 810)]
    #[case(500.0, 400.0, 380, 285)]
    #[case(767.0, 700.0, 665, 499)]
    #[case(1024.0, 0.0, 0, 0)]
    fn test_canvas_size(
        #[case] viewport: f64,
        #[case] container: f64,
        #[case] width: u32,
        #[case] height: u32,
    ) {
        assert_eq!(canvas_size(viewport, container), CanvasSize::new(width, height));
    }

    #[test]
    fn test_narrow_width_capped() {
        assert_eq!(canvas_size(700.0, 5000.0).width, 1440);
    }
}
