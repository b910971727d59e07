pub mod detection;
pub mod expressions;
pub mod face_analyzer;
pub mod face_detector;
pub mod model_loader;
