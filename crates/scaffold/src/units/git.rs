//! Local git repository initialization.
//!
//! Uses tokio::process::Command for async git operations.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;

use crate::unit::{GeneratorUnit, UnitContext, UnitId};

/// Initializes a git repository at the destination and records an initial
/// commit, once everything else has been written.
///
/// A destination that is already a git work tree is left untouched.
#[derive(Debug)]
pub struct GitInitUnit {
    initial_branch: String,
    commit_message: String,
}

impl GitInitUnit {
    #[must_use]
    pub fn new() -> Self {
        Self {
            initial_branch: "main".to_string(),
            commit_message: "Initial commit".to_string(),
        }
    }

    #[must_use]
    pub fn with_initial_branch(mut self, branch: impl Into<String>) -> Self {
        self.initial_branch = branch.into();
        self
    }
}

impl Default for GitInitUnit {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GeneratorUnit for GitInitUnit {
    fn id(&self) -> UnitId {
        UnitId::new("git-init")
    }

    async fn installing(&mut self, cx: &UnitContext<'_>) -> Result<()> {
        if cx.dest.join(".git").exists() {
            tracing::debug!(dest = %cx.dest.display(), "Already a git repository, skipping init");
            return Ok(());
        }

        run_git(cx.dest, &["init", "-b", &self.initial_branch]).await?;
        run_git(cx.dest, &["add", "-A"]).await?;
        run_git(cx.dest, &["commit", "-m", &self.commit_message]).await?;

        tracing::info!(dest = %cx.dest.display(), "Initialized git repository");
        Ok(())
    }
}

async fn run_git(dir: &Path, args: &[&str]) -> Result<()> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .await
        .with_context(|| format!("Failed to execute git {}", args[0]))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow::anyhow!("git {} failed: {}", args[0], stderr));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::Answers;
    use crate::render::TemplateRenderer;

    #[tokio::test]
    async fn test_skips_existing_work_tree() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();

        let renderer = TemplateRenderer::new();
        let answers = Answers::new();
        let cx = UnitContext {
            dest: dir.path(),
            renderer: &renderer,
            answers: &answers,
        };

        // No git invocation happens, so this passes even where git would
        // refuse to commit (empty tree, missing identity).
        GitInitUnit::new().installing(&cx).await.unwrap();
    }
}
