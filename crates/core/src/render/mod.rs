pub mod display_list;
pub mod domain;
pub mod layout;
pub mod overlay_renderer;
