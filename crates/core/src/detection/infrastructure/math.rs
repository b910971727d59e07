//! Numeric helpers shared by the ONNX detection and analysis backends.

use crate::shared::bounding_box::BoundingBox;

pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Numerically stable softmax; returns zeros if every exponent underflows.
pub fn softmax(values: &[f32]) -> Vec<f32> {
    if values.is_empty() {
        return Vec::new();
    }
    let max_val = values.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = values.iter().map(|v| (v - max_val).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum <= 0.0 || !sum.is_finite() {
        return vec![0.0; values.len()];
    }
    exps.iter().map(|e| e / sum).collect()
}

/// Greedy non-maximum suppression over `(box, score)` candidates.
///
/// Output is sorted by descending score.
pub fn nms(mut candidates: Vec<(BoundingBox, f32)>, iou_thresh: f64) -> Vec<(BoundingBox, f32)> {
    candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut keep: Vec<(BoundingBox, f32)> = Vec::new();
    for candidate in candidates {
        if keep
            .iter()
            .all(|(kept, _)| kept.iou(&candidate.0) <= iou_thresh)
        {
            keep.push(candidate);
        }
    }
    keep
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sigmoid_zero() {
        assert_relative_eq!(sigmoid(0.0), 0.5);
    }

    #[test]
    fn test_sigmoid_saturates() {
        assert!((sigmoid(10.0) - 1.0).abs() < 0.001);
        assert!(sigmoid(-10.0) < 0.001);
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        assert_relative_eq!(probs.iter().sum::<f32>(), 1.0, epsilon = 1e-6);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn test_softmax_large_logits_stable() {
        let probs = softmax(&[1000.0, 1000.0]);
        assert_relative_eq!(probs[0], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_softmax_empty() {
        assert!(softmax(&[]).is_empty());
    }

    #[test]
    fn test_nms_suppresses_overlap() {
        let dets = vec![
            (BoundingBox::new(5.0, 5.0, 100.0, 100.0), 0.7),
            (BoundingBox::new(0.0, 0.0, 100.0, 100.0), 0.9),
        ];
        let kept = nms(dets, 0.3);
        assert_eq!(kept.len(), 1);
        assert_relative_eq!(kept[0].1, 0.9);
    }

    #[test]
    fn test_nms_keeps_separate_faces() {
        let dets = vec![
            (BoundingBox::new(0.0, 0.0, 50.0, 50.0), 0.9),
            (BoundingBox::new(200.0, 200.0, 50.0, 50.0), 0.8),
        ];
        assert_eq!(nms(dets, 0.3).len(), 2);
    }
}
