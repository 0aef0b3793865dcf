//! Evaluation result presented to the user

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The model's verdict, kept exactly as returned. It is never parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub verdict: String,
    pub model: String,
    pub elapsed_ms: u64,
    pub evaluated_at: DateTime<Utc>,
}

impl EvaluationResult {
    pub fn new(verdict: String, model: String, elapsed_ms: u64) -> Self {
        Self {
            verdict,
            model,
            elapsed_ms,
            evaluated_at: Utc::now(),
        }
    }
}
