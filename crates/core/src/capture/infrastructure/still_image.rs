use std::path::Path;

use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;

/// True when the extension names a still-image format.
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Decodes an image file into a single RGB frame.
pub fn load_frame(path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
    let rgb = image::open(path)
        .map_err(|e| format!("Failed to read image {}: {e}", path.display()))?
        .to_rgb8();
    Ok(Frame::from_rgb_image(rgb, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("face.jpg", true)]
    #[case("face.JPEG", true)]
    #[case("face.png", true)]
    #[case("clip.mp4", false)]
    #[case("noext", false)]
    fn test_is_image(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_image(Path::new(name)), expected);
    }

    #[test]
    fn test_load_frame_reads_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("still.png");
        image::RgbImage::from_pixel(8, 4, image::Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();

        let frame = load_frame(&path).unwrap();

        assert_eq!(frame.dimensions(), (8, 4));
        assert_eq!(frame.channels(), 3);
        assert_eq!(&frame.data()[..3], &[10, 20, 30]);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let err = load_frame(Path::new("/nonexistent/still.png")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/still.png"));
    }
}
