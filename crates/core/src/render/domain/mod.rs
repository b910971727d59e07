pub mod overlay_surface;
