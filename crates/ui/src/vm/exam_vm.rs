use exam_core::model::{ExamSheet, QuestionId, SessionState};
use services::SessionSnapshot;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub value: String,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionCardVm {
    pub question_id: QuestionId,
    pub text: String,
    pub options: Vec<OptionVm>,
    pub position_label: String,
    pub progress_label: String,
    /// Whole percent, for the progress bar width.
    pub progress_percent: u32,
    pub answered_label: String,
    pub can_previous: bool,
    pub can_next: bool,
    pub show_submit: bool,
    pub submitting: bool,
    pub submit_label: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExamScreenVm {
    Loading,
    Failed { message: String },
    Question(QuestionCardVm),
    Submitted { score_label: String },
}

/// User actions the exam screen dispatches to the session controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExamIntent {
    Select { question_id: QuestionId, value: String },
    Next,
    Previous,
    Submit,
}

#[must_use]
pub fn map_exam_screen(snapshot: &SessionSnapshot) -> ExamScreenVm {
    match &snapshot.state {
        SessionState::Loading => ExamScreenVm::Loading,
        SessionState::Error { message } => ExamScreenVm::Failed {
            message: message.clone(),
        },
        SessionState::Ready(sheet) => ExamScreenVm::Question(map_question_card(sheet)),
        SessionState::Submitted(score) => ExamScreenVm::Submitted {
            score_label: format!("Score: {}/{}", score.score(), score.total_questions()),
        },
    }
}

fn map_question_card(sheet: &ExamSheet) -> QuestionCardVm {
    let question = sheet.current_question();
    let selected = sheet.answers().selected(question.id());
    let options = question
        .options()
        .map(|value| OptionVm {
            value: value.to_string(),
            selected: selected == Some(value),
        })
        .collect();

    let position = sheet.current_index() + 1;
    let total = sheet.total();
    let submitting = sheet.is_submitting();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let progress_percent = sheet.progress_percent().round() as u32;

    QuestionCardVm {
        question_id: question.id(),
        text: question.text().to_string(),
        options,
        position_label: format!("Question {position} of {total}"),
        progress_label: format!("Q {position}/{total}"),
        progress_percent,
        answered_label: format!(
            "{} of {total} answered",
            sheet.answers().answered_count()
        ),
        can_previous: !sheet.is_first() && !submitting,
        can_next: !sheet.is_last() && !submitting,
        show_submit: sheet.is_last(),
        submitting,
        submit_label: if submitting { "Submitting..." } else { "Submit Exam" },
    }
}
