use iced::widget::image;

use facecam_core::shared::frame::Frame;

/// Converts a captured frame into an image handle iced can upload.
pub fn frame_handle(frame: &Frame) -> image::Handle {
    image::Handle::from_rgba(
        frame.width(),
        frame.height(),
        to_rgba(frame.data(), frame.channels()),
    )
}

fn to_rgba(data: &[u8], channels: u8) -> Vec<u8> {
    match channels {
        4 => data.to_vec(),
        n if n >= 3 => data
            .chunks_exact(n as usize)
            .flat_map(|px| [px[0], px[1], px[2], 255])
            .collect(),
        n => data
            .chunks_exact(n.max(1) as usize)
            .flat_map(|px| [px[0], px[0], px[0], 255])
            .collect(),
    }
}
