pub const BLAZEFACE_MODEL_NAME: &str = "blazeface_128.onnx";
pub const EMOTION_MODEL_NAME: &str = "emotion-ferplus-8.onnx";
pub const AGE_GENDER_MODEL_NAME: &str = "genderage.onnx";

/// FER+ emotion model from the ONNX model zoo, pinned to a commit.
pub const EMOTION_MODEL_URL: &str =
    "https://github.com/onnx/models/raw/5faef4c33eba0395177850e1e31c4a6a9e634c82/vision/body_analysis/emotion_ferplus/model/emotion-ferplus-8.onnx";

/// Application folder under the platform cache/config directories.
pub const APP_DIR_NAME: &str = "FaceCam";

/// Target refresh rate of the render loop (one detection per display frame).
pub const DEFAULT_FRAME_RATE: f64 = 60.0;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
