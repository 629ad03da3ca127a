use std::sync::{PoisonError, RwLock};

use exam_core::model::ExamOutcome;

/// Outcomes of exams submitted during this run, for the results screen.
#[derive(Debug, Default)]
pub struct ResultsLedger {
    outcomes: RwLock<Vec<ExamOutcome>>,
}

impl ResultsLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, outcome: ExamOutcome) {
        self.outcomes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(outcome);
    }

    /// Newest first.
    #[must_use]
    pub fn list(&self) -> Vec<ExamOutcome> {
        let guard = self.outcomes.read().unwrap_or_else(PoisonError::into_inner);
        guard.iter().rev().cloned().collect()
    }

    #[must_use]
    pub fn latest(&self) -> Option<ExamOutcome> {
        self.outcomes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use exam_core::model::{ExamId, ExamScore};
    use exam_core::time::fixed_now;

    #[test]
    fn lists_newest_first() {
        let ledger = ResultsLedger::new();
        let now = fixed_now();
        ledger.record(ExamOutcome {
            exam_id: ExamId::new(1),
            score: ExamScore::new(1, 2),
            submitted_at: now,
        });
        ledger.record(ExamOutcome {
            exam_id: ExamId::new(2),
            score: ExamScore::new(2, 2),
            submitted_at: now + Duration::minutes(5),
        });

        let ids: Vec<_> = ledger.list().iter().map(|o| o.exam_id).collect();
        assert_eq!(ids, vec![ExamId::new(2), ExamId::new(1)]);
        assert_eq!(ledger.latest().map(|o| o.exam_id), Some(ExamId::new(2)));
        assert_eq!(ledger.len(), 2);
    }
}
