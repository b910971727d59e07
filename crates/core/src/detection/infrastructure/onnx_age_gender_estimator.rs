/// Age and gender estimator using the InsightFace `genderage` ONNX model.
///
/// The model reads a 96×96 RGB crop (raw 0-255 values) and emits three
/// values: female score, male score, and age / 100.
use std::path::Path;

use crate::detection::domain::detection::{Detection, Gender};
use crate::detection::domain::face_analyzer::FaceAnalyzer;
use crate::detection::infrastructure::execution_provider;
use crate::shared::frame::Frame;

const INPUT_SIZE: usize = 96;

/// The model was trained on loosely cropped faces.
const CROP_MARGIN: f64 = 1.5;

pub struct OnnxAgeGenderEstimator {
    session: ort::session::Session,
}

impl OnnxAgeGenderEstimator {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let session = execution_provider::load_session(model_path)?;
        Ok(Self { session })
    }
}

impl FaceAnalyzer for OnnxAgeGenderEstimator {
    fn analyze(
        &mut self,
        frame: &Frame,
        detection: &mut Detection,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let Some(face) = frame.crop(&detection.bbox.expand(CROP_MARGIN)) else {
            return Ok(());
        };

        let tensor = preprocess(&face);
        let input_value = ort::value::Tensor::from_array(tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        let raw = outputs[0].try_extract_array::<f32>()?;
        let raw = raw.as_slice().ok_or("Cannot get age/gender slice")?;

        let (gender, age) = decode(raw)?;
        detection.gender = Some(gender);
        detection.age = Some(age);
        Ok(())
    }
}

fn decode(raw: &[f32]) -> Result<(Gender, f32), Box<dyn std::error::Error>> {
    if raw.len() < 3 {
        return Err(format!("genderage model expected 3 outputs, got {}", raw.len()).into());
    }
    let gender = if raw[1] > raw[0] {
        Gender::Male
    } else {
        Gender::Female
    };
    let age = (raw[2] * 100.0).max(0.0);
    Ok((gender, age))
}

fn preprocess(face: &Frame) -> ndarray::Array4<f32> {
    let src = face.as_ndarray();
    let src_h = face.height() as usize;
    let src_w = face.width() as usize;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, INPUT_SIZE, INPUT_SIZE));
    for y in 0..INPUT_SIZE {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / INPUT_SIZE as f64) as usize).min(src_h - 1);
        for x in 0..INPUT_SIZE {
            let src_x =
                (((x as f64 + 0.5) * src_w as f64 / INPUT_SIZE as f64) as usize).min(src_w - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = src[[src_y, src_x, c]] as f32;
            }
        }
    }
    tensor
}
