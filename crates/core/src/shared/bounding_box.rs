/// Axis-aligned face box in pixel coordinates.
///
/// Detectors report corners (top-left, bottom-right) while the overlay
/// draws from an origin and a size; this is the single canonical form
/// both sides agree on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a box from two opposite corners.
    ///
    /// Corner order is normalised, so swapped corners never produce a
    /// negative size.
    pub fn from_corners(top_left: [f64; 2], bottom_right: [f64; 2]) -> Self {
        let x1 = top_left[0].min(bottom_right[0]);
        let y1 = top_left[1].min(bottom_right[1]);
        let x2 = top_left[0].max(bottom_right[0]);
        let y2 = top_left[1].max(bottom_right[1]);
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    pub fn top_left(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    pub fn bottom_right(&self) -> [f64; 2] {
        [self.x + self.width, self.y + self.height]
    }

    pub fn center(&self) -> [f64; 2] {
        [self.x + self.width / 2.0, self.y + self.height / 2.0]
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Maps the box into another coordinate space (e.g. frame → overlay).
    pub fn scale(&self, sx: f64, sy: f64) -> Self {
        Self::new(self.x * sx, self.y * sy, self.width * sx, self.height * sy)
    }

    /// Grows the box around its center by `factor` (1.0 = unchanged).
    pub fn expand(&self, factor: f64) -> Self {
        let [cx, cy] = self.center();
        let w = self.width * factor;
        let h = self.height * factor;
        Self::new(cx - w / 2.0, cy - h / 2.0, w, h)
    }

    /// Intersects the box with `[0, width] × [0, height]`.
    pub fn clamp_to(&self, width: f64, height: f64) -> Self {
        let [x2, y2] = self.bottom_right();
        let x1 = self.x.clamp(0.0, width);
        let y1 = self.y.clamp(0.0, height);
        let x2 = x2.clamp(0.0, width);
        let y2 = y2.clamp(0.0, height);
        Self::new(x1, y1, (x2 - x1).max(0.0), (y2 - y1).max(0.0))
    }

    pub fn iou(&self, other: &BoundingBox) -> f64 {
        let [ax2, ay2] = self.bottom_right();
        let [bx2, by2] = other.bottom_right();
        let ix1 = self.x.max(other.x);
        let iy1 = self.y.max(other.y);
        let ix2 = ax2.min(bx2);
        let iy2 = ay2.min(by2);

        let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        if inter == 0.0 {
            return 0.0;
        }
        inter / (self.area() + other.area() - inter)
    }
}
