//! Interactive terminal prompting.

use anyhow::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};
use regex::Regex;

use scaffold::answers::Answers;
use scaffold::prompt::{Prompter, Question, QuestionKind};

/// Question keys whose text answers must be valid repository names.
const NAME_KEYS: [&str; 2] = ["repo_name", "project_name"];

/// Prompter backed by dialoguer, with inline validation for name answers.
pub struct InteractivePrompter {
    theme: ColorfulTheme,
    name_pattern: Regex,
}

impl InteractivePrompter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
            name_pattern: Regex::new(r"^[A-Za-z0-9._-]+$").unwrap(),
        }
    }

    fn valid_name(&self, value: &str) -> bool {
        self.name_pattern.is_match(value)
    }
}

impl Default for InteractivePrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for InteractivePrompter {
    fn ask(&self, questions: &[Question]) -> Result<Answers> {
        let mut answers = Answers::new();

        for question in questions {
            match &question.kind {
                QuestionKind::Text { default } => {
                    let mut input =
                        Input::<String>::with_theme(&self.theme).with_prompt(&question.prompt);
                    if !default.is_empty() {
                        input = input.default(default.clone());
                    }
                    if NAME_KEYS.contains(&question.key.as_str()) {
                        let pattern = self.name_pattern.clone();
                        input = input.validate_with(move |value: &String| -> Result<(), &str> {
                            if pattern.is_match(value) {
                                Ok(())
                            } else {
                                Err("use only letters, digits, '.', '_' and '-'")
                            }
                        });
                    }
                    answers.insert_text(question.key.clone(), input.interact_text()?);
                }
                QuestionKind::Confirm { default } => {
                    let value = Confirm::with_theme(&self.theme)
                        .with_prompt(&question.prompt)
                        .default(*default)
                        .interact()?;
                    answers.insert_flag(question.key.clone(), value);
                }
            }
        }

        Ok(answers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_validation() {
        let prompter = InteractivePrompter::new();

        assert!(prompter.valid_name("widget"));
        assert!(prompter.valid_name("my-repo_v1.2"));
        assert!(prompter.valid_name(".github"));
        assert!(!prompter.valid_name(""));
        assert!(!prompter.valid_name("has space"));
        assert!(!prompter.valid_name("owner/name"));
    }
}
