use std::collections::BTreeMap;
use std::time::Instant;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StageTiming {
    pub count: usize,
    pub total_ms: f64,
    pub max_ms: f64,
}

impl StageTiming {
    pub fn avg_ms(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_ms / self.count as f64
        }
    }
}

/// Running per-stage timings and face counts for one render loop.
///
/// Aggregates only, so a loop can run for hours without growing.
pub struct RenderStats {
    stages: BTreeMap<String, StageTiming>,
    frames_drawn: usize,
    frames_discarded: usize,
    faces: usize,
    start_time: Instant,
}

impl RenderStats {
    pub fn new() -> Self {
        Self {
            stages: BTreeMap::new(),
            frames_drawn: 0,
            frames_discarded: 0,
            faces: 0,
            start_time: Instant::now(),
        }
    }

    pub fn timing(&mut self, stage: &str, duration_ms: f64) {
        let entry = self.stages.entry(stage.to_string()).or_default();
        entry.count += 1;
        entry.total_ms += duration_ms;
        entry.max_ms = entry.max_ms.max(duration_ms);
    }

    pub fn record_drawn(&mut self, faces: usize) {
        self.frames_drawn += 1;
        self.faces += faces;
    }

    pub fn record_discarded(&mut self) {
        self.frames_discarded += 1;
    }

    pub fn timing_for(&self, stage: &str) -> Option<&StageTiming> {
        self.stages.get(stage)
    }

    pub fn frames_drawn(&self) -> usize {
        self.frames_drawn
    }

    pub fn frames_discarded(&self) -> usize {
        self.frames_discarded
    }

    /// Formatted report, or `None` if no frame was ever processed.
    pub fn summary_string(&self) -> Option<String> {
        if self.stages.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let frames = self.frames_drawn;
        let mut lines = vec![format!(
            "Render summary ({frames} frames drawn, {} discarded, {:.1}s):",
            self.frames_discarded,
            elapsed_ms / 1000.0
        )];

        for (stage, t) in &self.stages {
            lines.push(format!(
                "  {stage:8}: avg {:6.1}ms  max {:6.1}ms  total {:7.0}ms",
                t.avg_ms(),
                t.max_ms,
                t.total_ms
            ));
        }

        if frames > 0 {
            lines.push(format!(
                "  faces: avg {:.1}",
                self.faces as f64 / frames as f64
            ));
            if elapsed_ms > 0.0 {
                lines.push(format!(
                    "  Throughput: {:.1} fps",
                    frames as f64 / (elapsed_ms / 1000.0)
                ));
            }
        }

        Some(lines.join("\n"))
    }
}

impl Default for RenderStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_has_no_summary() {
        assert!(RenderStats::new().summary_string().is_none());
    }

    #[test]
    fn test_timing_aggregates() {
        let mut stats = RenderStats::new();
        stats.timing("detect", 10.0);
        stats.timing("detect", 30.0);

        let t = stats.timing_for("detect").unwrap();
        assert_eq!(t.count, 2);
        assert_relative_eq!(t.avg_ms(), 20.0);
        assert_relative_eq!(t.max_ms, 30.0);
        assert!(stats.timing_for("draw").is_none());
    }

    #[test]
    fn test_summary_mentions_stages_and_faces() {
        let mut stats = RenderStats::new();
        stats.timing("detect", 12.0);
        stats.timing("draw", 1.0);
        stats.record_drawn(2);
        stats.record_discarded();

        let summary = stats.summary_string().unwrap();
        assert!(summary.contains("1 frames drawn, 1 discarded"));
        assert!(summary.contains("detect"));
        assert!(summary.contains("draw"));
        assert!(summary.contains("faces: avg 2.0"));
    }
}
