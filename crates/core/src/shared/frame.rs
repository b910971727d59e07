use ndarray::ArrayView3;

use crate::shared::bounding_box::BoundingBox;

/// One sampled camera image: contiguous RGB bytes in row-major order.
///
/// Format conversion happens at capture boundaries only; detectors and
/// analyzers treat pixel data as opaque.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn from_rgb_image(image: image::RgbImage, index: usize) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height, 3, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Copies the pixels under `bbox` (clamped to the frame) into a new frame.
    ///
    /// Returns `None` when the clamped box covers less than one pixel.
    pub fn crop(&self, bbox: &BoundingBox) -> Option<Frame> {
        let clamped = bbox.clamp_to(self.width as f64, self.height as f64);
        let x = clamped.x.floor() as usize;
        let y = clamped.y.floor() as usize;
        let w = (clamped.width.round() as usize).min(self.width as usize - x.min(self.width as usize));
        let h = (clamped.height.round() as usize).min(self.height as usize - y.min(self.height as usize));
        if w == 0 || h == 0 {
            return None;
        }

        let c = self.channels as usize;
        let stride = self.width as usize * c;
        let mut data = Vec::with_capacity(w * h * c);
        for row in y..y + h {
            let start = row * stride + x * c;
            data.extend_from_slice(&self.data[start..start + w * c]);
        }
        Some(Frame::new(data, w as u32, h as u32, self.channels, self.index))
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 3, 5);
        assert_eq!(frame.dimensions(), (2, 2));
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * channels")]
    fn test_mismatched_data_length_panics_in_debug() {
        let data = vec![0u8; 10]; // wrong size for 2x2x3
        Frame::new(data, 2, 2, 3, 0);
    }

    #[test]
    fn test_as_ndarray_pixel_access() {
        // 2x2 RGB: set pixel (row=1, col=0) to red
        let mut data = vec![0u8; 12];
        data[6] = 255;
        let frame = Frame::new(data, 2, 2, 3, 0);
        let arr = frame.as_ndarray();
        assert_eq!(arr.shape(), &[2, 2, 3]);
        assert_eq!(arr[[1, 0, 0]], 255);
        assert_eq!(arr[[1, 0, 1]], 0);
    }

    #[test]
    fn test_from_rgb_image() {
        let img = image::RgbImage::from_pixel(4, 3, image::Rgb([1, 2, 3]));
        let frame = Frame::from_rgb_image(img, 7);
        assert_eq!(frame.dimensions(), (4, 3));
        assert_eq!(frame.index(), 7);
        assert_eq!(&frame.data()[..3], &[1, 2, 3]);
    }

    #[test]
    fn test_crop_copies_region() {
        // 4x4 frame where each pixel's R channel is its column index
        let mut data = Vec::new();
        for _row in 0..4 {
            for col in 0..4u8 {
                data.extend_from_slice(&[col, 0, 0]);
            }
        }
        let frame = Frame::new(data, 4, 4, 3, 0);
        let crop = frame.crop(&BoundingBox::new(1.0, 1.0, 2.0, 2.0)).unwrap();
        assert_eq!(crop.dimensions(), (2, 2));
        assert_eq!(crop.data()[0], 1);
        assert_eq!(crop.data()[3], 2);
    }

    #[test]
    fn test_crop_clamps_to_frame() {
        let frame = Frame::new(vec![0u8; 10 * 10 * 3], 10, 10, 3, 0);
        let crop = frame.crop(&BoundingBox::new(-5.0, 8.0, 10.0, 10.0)).unwrap();
        assert_eq!(crop.dimensions(), (5, 2));
    }

    #[test]
    fn test_crop_outside_frame_is_none() {
        let frame = Frame::new(vec![0u8; 10 * 10 * 3], 10, 10, 3, 0);
        assert!(frame.crop(&BoundingBox::new(20.0, 20.0, 5.0, 5.0)).is_none());
    }
}
