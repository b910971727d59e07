/// Canonical key order for expression scores.
///
/// Analyzers insert in this order so that ties in [`Expressions::dominant`]
/// resolve the same way for every model.
pub const CANONICAL_EXPRESSIONS: [&str; 7] = [
    "neutral",
    "happy",
    "sad",
    "angry",
    "fearful",
    "disgusted",
    "surprised",
];

/// Ordered mapping of expression name to confidence in `[0, 1]`.
///
/// Iteration follows insertion order; overwriting a key keeps its
/// original position. The key set is open: models may add names beyond
/// [`CANONICAL_EXPRESSIONS`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Expressions {
    scores: Vec<(String, f32)>,
}

impl Expressions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_scores<I, S>(scores: I) -> Self
    where
        I: IntoIterator<Item = (S, f32)>,
        S: Into<String>,
    {
        let mut expressions = Self::new();
        for (name, score) in scores {
            expressions.set(name, score);
        }
        expressions
    }

    /// Inserts or overwrites a score. Non-finite values count as 0.
    pub fn set(&mut self, name: impl Into<String>, score: f32) {
        let name = name.into();
        let score = if score.is_finite() {
            score.clamp(0.0, 1.0)
        } else {
            0.0
        };
        match self.scores.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = score,
            None => self.scores.push((name, score)),
        }
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        self.scores
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| *s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.scores.iter().map(|(n, s)| (n.as_str(), *s))
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Highest-scoring expression; on ties the first one inserted wins.
    pub fn dominant(&self) -> Option<(&str, f32)> {
        let mut best: Option<(&str, f32)> = None;
        for (name, score) in self.iter() {
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((name, score)),
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_dominant_picks_max() {
        let e = Expressions::from_scores([("happy", 0.2), ("sad", 0.7), ("neutral", 0.1)]);
        assert_eq!(e.dominant().map(|(n, _)| n), Some("sad"));
    }

    #[test]
    fn test_dominant_tie_first_seen_wins() {
        let e = Expressions::from_scores([("angry", 0.4), ("happy", 0.4), ("sad", 0.2)]);
        assert_eq!(e.dominant().map(|(n, _)| n), Some("angry"));

        let reversed = Expressions::from_scores([("happy", 0.4), ("angry", 0.4)]);
        assert_eq!(reversed.dominant().map(|(n, _)| n), Some("happy"));
    }

    #[test]
    fn test_dominant_empty_is_none() {
        assert!(Expressions::new().dominant().is_none());
    }

    #[test]
    fn test_dominant_all_zero_returns_first() {
        let e = Expressions::from_scores([("neutral", 0.0), ("happy", 0.0)]);
        assert_eq!(e.dominant(), Some(("neutral", 0.0)));
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut e = Expressions::from_scores([("neutral", 0.5), ("happy", 0.5)]);
        e.set("neutral", 0.1);
        let names: Vec<&str> = e.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["neutral", "happy"]);
        assert_relative_eq!(e.get("neutral").unwrap(), 0.1);
        assert_eq!(e.len(), 2);
    }

    #[test]
    fn test_scores_are_clamped_and_sanitised() {
        let e = Expressions::from_scores([("happy", 1.5), ("sad", -0.2), ("angry", f32::NAN)]);
        assert_relative_eq!(e.get("happy").unwrap(), 1.0);
        assert_relative_eq!(e.get("sad").unwrap(), 0.0);
        assert_relative_eq!(e.get("angry").unwrap(), 0.0);
    }

    #[test]
    fn test_open_key_set() {
        let e = Expressions::from_scores([("contempt", 0.9)]);
        assert_eq!(e.dominant().map(|(n, _)| n), Some("contempt"));
        assert!(e.get("happy").is_none());
    }

    #[test]
    fn test_canonical_order_is_fixed() {
        assert_eq!(CANONICAL_EXPRESSIONS[0], "neutral");
        assert_eq!(CANONICAL_EXPRESSIONS.len(), 7);
    }
}
