use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::ExamId;

/// Score returned by the submission endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamScore {
    score: u32,
    total_questions: u32,
}

impl ExamScore {
    #[must_use]
    pub fn new(score: u32, total_questions: u32) -> Self {
        Self {
            score,
            total_questions,
        }
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    /// Whole-number percentage, clamped to 0..=100. An empty exam scores 0.
    #[must_use]
    pub fn percent(&self) -> u32 {
        if self.total_questions == 0 {
            return 0;
        }
        let pct = u64::from(self.score) * 100 / u64::from(self.total_questions);
        u32::try_from(pct.min(100)).unwrap_or(100)
    }
}

/// A completed submission, kept for the results screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamOutcome {
    pub exam_id: ExamId,
    pub score: ExamScore,
    pub submitted_at: DateTime<Utc>,
}
