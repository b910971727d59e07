pub mod loading_overlay;
pub mod overlay_canvas;
pub mod toggle_button;
pub mod video_view;
