//! `.gitignore` generation.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::unit::{GeneratorUnit, UnitContext, UnitId};

const TEMPLATE: &str = include_str!("../templates/gitignore.hbs");

/// Writes a language-neutral `.gitignore` at the destination root.
#[derive(Debug, Default)]
pub struct GitignoreUnit {
    extra: Vec<String>,
}

impl GitignoreUnit {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Extra ignore patterns appended after the standard blocks.
    #[must_use]
    pub fn with_extra(mut self, patterns: Vec<String>) -> Self {
        self.extra = patterns;
        self
    }
}

#[async_trait]
impl GeneratorUnit for GitignoreUnit {
    fn id(&self) -> UnitId {
        UnitId::new("gitignore")
    }

    async fn writing(&mut self, cx: &UnitContext<'_>) -> Result<()> {
        let dest = cx.dest.join(".gitignore");
        cx.renderer
            .render_to(&dest, "gitignore", TEMPLATE, &json!({ "extra": self.extra }))?;
        debug!(path = %dest.display(), "Wrote .gitignore");
        Ok(())
    }
}
