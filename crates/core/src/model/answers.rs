use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::model::ids::QuestionId;
use crate::model::question::Question;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnswerError {
    #[error("question {0} is not part of this exam")]
    UnknownQuestion(QuestionId),

    #[error("{option:?} is not an option of question {id}")]
    UnknownOption { id: QuestionId, option: String },
}

/// Selected option per question; `None` means unanswered.
///
/// The key set is fixed at construction. Serialises as a JSON object keyed by
/// the question id with `null` for unanswered entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AnswerMap(BTreeMap<QuestionId, Option<String>>);

impl AnswerMap {
    /// One unanswered entry per question.
    #[must_use]
    pub fn for_questions(questions: &[Question]) -> Self {
        Self(questions.iter().map(|q| (q.id(), None)).collect())
    }

    /// Overwrite the selection for an existing question.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError::UnknownQuestion` if `id` was not part of the fetched set.
    pub fn select(&mut self, id: QuestionId, option: impl Into<String>) -> Result<(), AnswerError> {
        let slot = self
            .0
            .get_mut(&id)
            .ok_or(AnswerError::UnknownQuestion(id))?;
        *slot = Some(option.into());
        Ok(())
    }

    #[must_use]
    pub fn selected(&self, id: QuestionId) -> Option<&str> {
        self.0.get(&id).and_then(|slot| slot.as_deref())
    }

    #[must_use]
    pub fn contains(&self, id: QuestionId) -> bool {
        self.0.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.0.values().filter(|slot| slot.is_some()).count()
    }

    #[must_use]
    pub fn unanswered_count(&self) -> usize {
        self.len() - self.answered_count()
    }

    pub fn ids(&self) -> impl Iterator<Item = QuestionId> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, Option<&str>)> {
        self.0.iter().map(|(id, slot)| (*id, slot.as_deref()))
    }
}
