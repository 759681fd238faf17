//! The `new` command: scaffold a project and its GitHub repository.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm};

use scaffold::answers::Answers;
use scaffold::compose::{compose, Runner};
use scaffold::prompt::{DefaultsPrompter, Prompter};
use scaffold::units::github::{
    GithubOptions, REPO_DESCRIPTION_KEY, REPO_NAME_KEY, REPO_OWNER_KEY, REPO_PRIVATE_KEY,
};
use scaffold::units::readme::{PROJECT_DESCRIPTION_KEY, PROJECT_NAME_KEY};
use scaffold::units::ProjectUnit;
use scm::models::OwnerKind;
use scm::GitHubClient;

use crate::config::Presets;
use crate::prompter::InteractivePrompter;
use crate::ui;

/// Scaffold a new project and its GitHub repository
#[derive(Args)]
pub struct NewCommand {
    /// Name of the repository to create
    name: String,

    /// Destination directory (defaults to ./<name>)
    #[arg(short, long, value_name = "DIR")]
    dest: Option<PathBuf>,

    /// Repository owner (user or organization login)
    #[arg(short, long)]
    owner: Option<String>,

    /// The owner is an organization rather than a user account
    #[arg(long)]
    org: bool,

    /// Repository description
    #[arg(long)]
    description: Option<String>,

    /// Create the repository as private
    #[arg(long)]
    private: bool,

    /// Default branch to create and protect
    #[arg(short, long)]
    branch: Option<String>,

    /// Required status check context (repeatable)
    #[arg(long = "check", value_name = "CONTEXT")]
    checks: Vec<String>,

    /// GitHub API token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Skip interactive prompts (use defaults)
    #[arg(long)]
    non_interactive: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl NewCommand {
    pub async fn run(&self) -> Result<()> {
        ui::print_section("Scaffolding a new repository");

        let presets = Presets::load(self.config.as_deref())?;
        let token = self
            .token
            .clone()
            .context("a GitHub token is required; pass --token or set GITHUB_TOKEN")?;

        let owner = self.owner.clone().or_else(|| presets.owner.clone());
        let owner_kind = if self.org {
            OwnerKind::Organization
        } else {
            presets.owner_kind.unwrap_or_default()
        };
        let branch = self
            .branch
            .clone()
            .or_else(|| presets.branch.clone())
            .unwrap_or_else(|| "main".to_string());
        let checks = if self.checks.is_empty() {
            presets.required_checks.clone()
        } else {
            self.checks.clone()
        };

        let overrides = self.overrides(owner.as_deref());
        let options = GithubOptions {
            branch: branch.clone(),
            required_checks: checks.clone(),
            owner_kind,
            default_owner: owner.clone().unwrap_or_default(),
            default_name: self.name.clone(),
        };

        let dest = self
            .dest
            .clone()
            .unwrap_or_else(|| PathBuf::from(&self.name));
        std::fs::create_dir_all(&dest)
            .with_context(|| format!("failed to create destination {}", dest.display()))?;

        ui::print_info(&format!("Destination: {}", dest.display()));
        ui::print_info(&format!(
            "Owner: {}",
            owner.as_deref().unwrap_or("(will prompt)")
        ));
        ui::print_info(&format!("Default branch: {branch}"));
        if !checks.is_empty() {
            ui::print_info(&format!("Required checks: {}", checks.join(", ")));
        }
        println!();

        if !self.non_interactive && !self.yes {
            let proceed = Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt("Proceed? This will create or update resources on GitHub")
                .default(true)
                .interact()?;

            if !proceed {
                println!("{}", "Cancelled.".yellow());
                return Ok(());
            }
        }

        let client = GitHubClient::new(token)?;
        let unit = ProjectUnit::new(client, self.name.clone(), options)
            .with_gitignore_extra(presets.gitignore_extra.clone());
        let plan = compose(vec![Box::new(unit)])?;

        let prompter: Box<dyn Prompter> = if self.non_interactive {
            Box::new(DefaultsPrompter)
        } else {
            Box::new(InteractivePrompter::new())
        };

        let report = Runner::new(&dest, prompter)
            .with_overrides(overrides)
            .run(plan)
            .await?;

        println!();
        ui::print_success(&format!(
            "Scaffolded {} ({} units, {} questions asked)",
            self.name,
            report.unit_count(),
            report.questions_asked
        ));
        Ok(())
    }

    /// Answers fixed by flags and presets; the prompter fills in the rest.
    fn overrides(&self, owner: Option<&str>) -> Answers {
        let mut overrides = Answers::new();
        overrides.insert_text(REPO_NAME_KEY, self.name.clone());
        overrides.insert_text(PROJECT_NAME_KEY, self.name.clone());
        if let Some(owner) = owner {
            overrides.insert_text(REPO_OWNER_KEY, owner);
        }
        if let Some(description) = &self.description {
            overrides.insert_text(REPO_DESCRIPTION_KEY, description.clone());
            overrides.insert_text(PROJECT_DESCRIPTION_KEY, description.clone());
        }
        if self.private {
            overrides.insert_flag(REPO_PRIVATE_KEY, true);
        }
        overrides
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(name: &str) -> NewCommand {
        NewCommand {
            name: name.to_string(),
            dest: None,
            owner: None,
            org: false,
            description: None,
            private: false,
            branch: None,
            checks: Vec::new(),
            token: None,
            non_interactive: false,
            yes: false,
            config: None,
        }
    }

    #[test]
    fn test_name_always_overrides_prompts() {
        let overrides = command("widget").overrides(None);

        assert_eq!(overrides.text(REPO_NAME_KEY), Some("widget"));
        assert_eq!(overrides.text(PROJECT_NAME_KEY), Some("widget"));
        assert!(overrides.text(REPO_OWNER_KEY).is_none());
        assert!(overrides.flag(REPO_PRIVATE_KEY).is_none());
    }

    #[test]
    fn test_flags_become_overrides() {
        let mut cmd = command("widget");
        cmd.description = Some("A widget".to_string());
        cmd.private = true;

        let overrides = cmd.overrides(Some("acme"));

        assert_eq!(overrides.text(REPO_OWNER_KEY), Some("acme"));
        assert_eq!(overrides.text(REPO_DESCRIPTION_KEY), Some("A widget"));
        assert_eq!(overrides.text(PROJECT_DESCRIPTION_KEY), Some("A widget"));
        assert_eq!(overrides.flag(REPO_PRIVATE_KEY), Some(true));
    }
}
