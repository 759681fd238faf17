//! Per-unit answer records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single typed answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Flag(bool),
    Text(String),
}

/// Answers recorded for one unit during the prompting phase.
///
/// The scheduler builds these while prompting and hands out shared
/// references afterwards, so from the configuring phase on the record is
/// effectively immutable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Answers {
    values: BTreeMap<String, AnswerValue>,
}

impl Answers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: AnswerValue) {
        self.values.insert(key.into(), value);
    }

    pub fn insert_text(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.insert(key, AnswerValue::Text(text.into()));
    }

    pub fn insert_flag(&mut self, key: impl Into<String>, flag: bool) {
        self.insert(key, AnswerValue::Flag(flag));
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.values.get(key)
    }

    /// The answer for `key` as text, if it is a text answer.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(AnswerValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// The answer for `key` as a flag, if it is a confirm answer.
    #[must_use]
    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.values.get(key) {
            Some(AnswerValue::Flag(flag)) => Some(*flag),
            _ => None,
        }
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Absorb `other`, overwriting existing keys.
    pub fn merge(&mut self, other: Answers) {
        self.values.extend(other.values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_getters() {
        let mut answers = Answers::new();
        answers.insert_text("repo_name", "widget");
        answers.insert_flag("repo_private", false);

        assert_eq!(answers.text("repo_name"), Some("widget"));
        assert_eq!(answers.flag("repo_private"), Some(false));
        assert_eq!(answers.text("repo_private"), None);
        assert_eq!(answers.flag("missing"), None);
    }

    #[test]
    fn test_merge_overwrites() {
        let mut base = Answers::new();
        base.insert_text("owner", "acme");
        base.insert_flag("private", true);

        let mut overrides = Answers::new();
        overrides.insert_flag("private", false);

        base.merge(overrides);
        assert_eq!(base.flag("private"), Some(false));
        assert_eq!(base.text("owner"), Some("acme"));
    }

    #[test]
    fn test_untagged_serde_round_trip() {
        let mut answers = Answers::new();
        answers.insert_text("owner", "acme");
        answers.insert_flag("private", false);

        let json = serde_json::to_string(&answers).unwrap();
        assert_eq!(json, r#"{"owner":"acme","private":false}"#);

        let back: Answers = serde_json::from_str(&json).unwrap();
        assert_eq!(back, answers);
    }
}
