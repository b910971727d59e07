pub mod analyzing_face_detector;
pub mod execution_provider;
pub mod math;
pub mod onnx_age_gender_estimator;
pub mod onnx_blazeface_detector;
pub mod onnx_emotion_classifier;
pub mod onnx_model_loader;
