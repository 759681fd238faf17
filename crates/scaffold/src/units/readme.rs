//! `README.md` generation.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::prompt::Question;
use crate::unit::{GeneratorUnit, UnitContext, UnitId};

const TEMPLATE: &str = include_str!("../templates/readme.hbs");

pub const PROJECT_NAME_KEY: &str = "project_name";
pub const PROJECT_DESCRIPTION_KEY: &str = "project_description";

/// Writes a minimal `README.md` with the project name and description.
#[derive(Debug)]
pub struct ReadmeUnit {
    default_name: String,
}

impl ReadmeUnit {
    pub fn new(default_name: impl Into<String>) -> Self {
        Self {
            default_name: default_name.into(),
        }
    }
}

#[async_trait]
impl GeneratorUnit for ReadmeUnit {
    fn id(&self) -> UnitId {
        UnitId::new("readme")
    }

    fn questions(&self) -> Vec<Question> {
        vec![
            Question::text(
                PROJECT_NAME_KEY,
                "What is the name of this project?",
                self.default_name.clone(),
            ),
            Question::text(
                PROJECT_DESCRIPTION_KEY,
                "What is the description of this project?",
                "",
            ),
        ]
    }

    async fn writing(&mut self, cx: &UnitContext<'_>) -> Result<()> {
        let name = cx
            .answers
            .text(PROJECT_NAME_KEY)
            .unwrap_or(self.default_name.as_str());
        let description = cx.answers.text(PROJECT_DESCRIPTION_KEY).unwrap_or("");

        let dest = cx.dest.join("README.md");
        cx.renderer.render_to(
            &dest,
            "readme",
            TEMPLATE,
            &json!({ "name": name, "description": description }),
        )?;
        debug!(path = %dest.display(), "Wrote README.md");
        Ok(())
    }
}
