//! Questions and the prompting seam.
//!
//! Units declare the answers they need as [`Question`]s; how the answers
//! are obtained is behind the [`Prompter`] trait so the interactive
//! terminal flow, canned defaults, and test doubles all plug in the same
//! way.

use anyhow::Result;
#[cfg(test)]
use mockall::automock;

use crate::answers::{Answers, AnswerValue};

/// What kind of input a question expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    /// Free-form text with a default shown to the user.
    Text { default: String },
    /// Yes/no confirmation.
    Confirm { default: bool },
}

/// A single question a unit wants answered before it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Key the answer is stored under.
    pub key: String,
    /// Human-readable prompt text.
    pub prompt: String,
    pub kind: QuestionKind,
}

impl Question {
    pub fn text(
        key: impl Into<String>,
        prompt: impl Into<String>,
        default: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            prompt: prompt.into(),
            kind: QuestionKind::Text {
                default: default.into(),
            },
        }
    }

    pub fn confirm(key: impl Into<String>, prompt: impl Into<String>, default: bool) -> Self {
        Self {
            key: key.into(),
            prompt: prompt.into(),
            kind: QuestionKind::Confirm { default },
        }
    }

    /// The answer this question falls back to when nobody is asked.
    #[must_use]
    pub fn default_answer(&self) -> AnswerValue {
        match &self.kind {
            QuestionKind::Text { default } => AnswerValue::Text(default.clone()),
            QuestionKind::Confirm { default } => AnswerValue::Flag(*default),
        }
    }
}

/// Source of answers for a batch of questions.
#[cfg_attr(test, automock)]
pub trait Prompter: Send + Sync {
    /// Obtain answers for every question in `questions`.
    fn ask(&self, questions: &[Question]) -> Result<Answers>;
}

/// Prompter that never asks and returns each question's default.
///
/// Used for non-interactive runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultsPrompter;

impl Prompter for DefaultsPrompter {
    fn ask(&self, questions: &[Question]) -> Result<Answers> {
        let mut answers = Answers::new();
        for question in questions {
            answers.insert(question.key.clone(), question.default_answer());
        }
        Ok(answers)
    }
}

/// Filter out questions already covered by `overrides`.
#[must_use]
pub fn outstanding(questions: &[Question], overrides: &Answers) -> Vec<Question> {
    questions
        .iter()
        .filter(|question| !overrides.contains(&question.key))
        .cloned()
        .collect()
}
