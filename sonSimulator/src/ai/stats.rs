use serde::{Deserialize, Serialize};

/// Fitness summary of one finished generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation: usize,
    pub best: f64,
    pub mean: f64,
    pub best_overall: f64,
}

/// Running best/mean bookkeeping across generations.
#[derive(Debug, Clone, Default)]
pub struct FitnessTracker {
    best_overall: Option<f64>,
    history: Vec<GenerationRecord>,
}

impl FitnessTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn best_overall(&self) -> Option<f64> {
        self.best_overall
    }

    pub fn history(&self) -> &[GenerationRecord] {
        &self.history
    }

    /// Folds one generation's scores in. Returns `None` for an empty slice.
    pub fn record_generation(&mut self, generation: usize, scores: &[f64]) -> Option<GenerationRecord> {
        if scores.is_empty() {
            return None;
        }
        let best = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        let best_overall = self.best_overall.map_or(best, |b| b.max(best));
        self.best_overall = Some(best_overall);

        let record = GenerationRecord {
            generation,
            best,
            mean,
            best_overall,
        };
        self.history.push(record.clone());
        Some(record)
    }
}
