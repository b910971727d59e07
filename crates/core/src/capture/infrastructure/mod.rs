pub mod ffmpeg_camera;
pub mod still_image;
