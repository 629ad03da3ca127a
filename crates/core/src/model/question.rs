use thiserror::Error;

use crate::model::ids::QuestionId;

/// Maximum number of answer options a question can carry.
pub const MAX_OPTIONS: usize = 4;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question {id} has {count} options, at most {MAX_OPTIONS} are allowed")]
    TooManyOptions { id: QuestionId, count: usize },
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// A multiple-choice question as fetched for an exam session.
///
/// Option slots keep their original position so the rendered order matches the
/// source. Blank slots are stored as `None` and skipped by [`Question::options`].
/// The prompt is kept as sent, even when blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    text: String,
    options: [Option<String>; MAX_OPTIONS],
}

impl Question {
    /// Build a question from its prompt and up to four option slots.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::TooManyOptions` if more than four slots are supplied.
    pub fn new(
        id: QuestionId,
        text: impl Into<String>,
        options: impl IntoIterator<Item = Option<String>>,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        let mut slots: [Option<String>; MAX_OPTIONS] = Default::default();
        let mut count = 0_usize;
        for option in options {
            if count < MAX_OPTIONS {
                slots[count] = option.filter(|value| !value.trim().is_empty());
            }
            count += 1;
        }
        if count > MAX_OPTIONS {
            return Err(QuestionError::TooManyOptions { id, count });
        }

        Ok(Self {
            id,
            text,
            options: slots,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Present options in source order, blanks excluded.
    pub fn options(&self) -> impl Iterator<Item = &str> {
        self.options.iter().filter_map(|slot| slot.as_deref())
    }

    #[must_use]
    pub fn option_count(&self) -> usize {
        self.options().count()
    }

    #[must_use]
    pub fn has_option(&self, value: &str) -> bool {
        self.options().any(|option| option == value)
    }
}
