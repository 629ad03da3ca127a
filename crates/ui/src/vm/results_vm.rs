use exam_core::model::{ExamId, ExamOutcome};

use crate::vm::time_fmt::format_datetime;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultCardVm {
    pub exam_id: ExamId,
    pub exam_label: String,
    pub score_label: String,
    pub percent_label: String,
    pub submitted_at_str: String,
    pub passed: bool,
}

/// Share of correct answers needed for the "passed" badge.
pub const PASS_PERCENT: u32 = 50;

impl From<&ExamOutcome> for ResultCardVm {
    fn from(outcome: &ExamOutcome) -> Self {
        let percent = outcome.score.percent();
        Self {
            exam_id: outcome.exam_id,
            exam_label: format!("Exam #{}", outcome.exam_id),
            score_label: format!(
                "{} / {}",
                outcome.score.score(),
                outcome.score.total_questions()
            ),
            percent_label: format!("{percent}%"),
            submitted_at_str: format_datetime(outcome.submitted_at),
            passed: percent >= PASS_PERCENT,
        }
    }
}

#[must_use]
pub fn map_result_cards(outcomes: &[ExamOutcome]) -> Vec<ResultCardVm> {
    outcomes.iter().map(ResultCardVm::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::ExamScore;
    use exam_core::time::fixed_now;

    #[test]
    fn maps_score_and_percent() {
        let outcome = ExamOutcome {
            exam_id: ExamId::new(4),
            score: ExamScore::new(3, 5),
            submitted_at: fixed_now(),
        };
        let card = ResultCardVm::from(&outcome);
        assert_eq!(card.exam_label, "Exam #4");
        assert_eq!(card.score_label, "3 / 5");
        assert_eq!(card.percent_label, "60%");
        assert!(card.passed);
    }

    #[test]
    fn empty_exam_is_not_passed() {
        let outcome = ExamOutcome {
            exam_id: ExamId::new(1),
            score: ExamScore::new(0, 0),
            submitted_at: fixed_now(),
        };
        assert!(!ResultCardVm::from(&outcome).passed);
    }
}
