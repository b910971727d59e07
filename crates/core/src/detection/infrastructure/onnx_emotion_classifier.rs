/// FER+ facial expression classifier using ONNX Runtime.
///
/// Scores the eight FER+ classes on a 64×64 grayscale face crop and maps
/// them onto the canonical expression names.
use std::path::Path;

use crate::detection::domain::detection::Detection;
use crate::detection::domain::expressions::{Expressions, CANONICAL_EXPRESSIONS};
use crate::detection::domain::face_analyzer::FaceAnalyzer;
use crate::detection::infrastructure::execution_provider;
use crate::detection::infrastructure::math::softmax;
use crate::shared::frame::Frame;

const INPUT_SIZE: usize = 64;

/// FER+ output order mapped to expression names.
const FERPLUS_LABELS: [&str; 8] = [
    "neutral",
    "happy",
    "surprised",
    "sad",
    "angry",
    "disgusted",
    "fearful",
    "contempt",
];

pub struct OnnxEmotionClassifier {
    session: ort::session::Session,
}

impl OnnxEmotionClassifier {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let session = execution_provider::load_session(model_path)?;
        Ok(Self { session })
    }
}

impl FaceAnalyzer for OnnxEmotionClassifier {
    fn analyze(
        &mut self,
        frame: &Frame,
        detection: &mut Detection,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let Some(face) = frame.crop(&detection.bbox) else {
            return Ok(());
        };

        let tensor = preprocess(&face);
        let input_value = ort::value::Tensor::from_array(tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        let logits = outputs[0].try_extract_array::<f32>()?;
        let logits = logits.as_slice().ok_or("Cannot get emotion logits slice")?;

        detection.expressions = Some(to_expressions(&softmax(logits)));
        Ok(())
    }
}

/// Reorders FER+ probabilities into canonical order, extras last.
fn to_expressions(probs: &[f32]) -> Expressions {
    let score_of = |name: &str| {
        FERPLUS_LABELS
            .iter()
            .position(|l| *l == name)
            .and_then(|i| probs.get(i).copied())
    };

    let mut expressions = Expressions::new();
    for name in CANONICAL_EXPRESSIONS {
        if let Some(score) = score_of(name) {
            expressions.set(name, score);
        }
    }
    for (i, name) in FERPLUS_LABELS.iter().enumerate() {
        if !CANONICAL_EXPRESSIONS.contains(name) {
            if let Some(&score) = probs.get(i) {
                expressions.set(*name, score);
            }
        }
    }
    expressions
}

/// Resize to 64×64 luma, raw 0-255 range, NCHW with one channel.
fn preprocess(face: &Frame) -> ndarray::Array4<f32> {
    let src = face.as_ndarray();
    let src_h = face.height() as usize;
    let src_w = face.width() as usize;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 1, INPUT_SIZE, INPUT_SIZE));
    for y in 0..INPUT_SIZE {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / INPUT_SIZE as f64) as usize).min(src_h - 1);
        for x in 0..INPUT_SIZE {
            let src_x =
                (((x as f64 + 0.5) * src_w as f64 / INPUT_SIZE as f64) as usize).min(src_w - 1);
            let r = src[[src_y, src_x, 0]] as f32;
            let g = src[[src_y, src_x, 1]] as f32;
            let b = src[[src_y, src_x, 2]] as f32;
            tensor[[0, 0, y, x]] = 0.299 * r + 0.587 * g + 0.114 * b;
        }
    }
    tensor
}
