pub mod capture;
pub mod detection;
pub mod render;
pub mod session;
pub mod shared;
