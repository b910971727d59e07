use std::fmt;

use crate::detection::domain::expressions::Expressions;
use crate::shared::bounding_box::BoundingBox;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gender {
    Female,
    Male,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Female => write!(f, "female"),
            Gender::Male => write!(f, "male"),
        }
    }
}

/// One face found in one frame.
///
/// Detections are produced fresh per frame and never correlated across
/// frames, so there is no identity field.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub score: f32,
    pub expressions: Option<Expressions>,
    pub age: Option<f32>,
    pub gender: Option<Gender>,
}

impl Detection {
    pub fn new(bbox: BoundingBox, score: f32) -> Self {
        Self {
            bbox,
            score,
            expressions: None,
            age: None,
            gender: None,
        }
    }

    pub fn with_age(mut self, age: f32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_expressions(mut self, expressions: Expressions) -> Self {
        self.expressions = Some(expressions);
        self
    }

    pub fn dominant_expression(&self) -> Option<&str> {
        self.expressions
            .as_ref()
            .and_then(|e| e.dominant())
            .map(|(name, _)| name)
    }

    /// Age rounded to the nearest whole year; negative estimates floor at 0.
    pub fn rounded_age(&self) -> Option<u32> {
        self.age
            .filter(|a| a.is_finite())
            .map(|a| a.max(0.0).round() as u32)
    }
}
