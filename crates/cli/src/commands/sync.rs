//! The `sync` command: converge an existing repository's configuration.
//!
//! Runs the same reconciliation the scaffold performs during its writing
//! phase, but against a repository that already exists and without touching
//! any local files. description and privacy are left unmanaged so a sync
//! never clobbers what the repository owner set by hand.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm};

use scm::models::{
    BranchKey, BranchProtectionSpec, RepoKey, RepositorySpec, RequiredPullRequestReviews,
    RequiredStatusChecks, SquashMergeCommitTitle,
};
use scm::{
    reconcile_label_set, BranchProtection, GitHubClient, LabelSet, Reconciler, Repository,
};

use crate::config::Presets;
use crate::ui;

/// Converge an existing repository's GitHub configuration
#[derive(Args)]
pub struct SyncCommand {
    /// Repository to sync, as <owner>/<name>
    repo: String,

    /// The owner is an organization rather than a user account
    #[arg(long)]
    org: bool,

    /// Default branch to protect
    #[arg(short, long)]
    branch: Option<String>,

    /// Required status check context (repeatable)
    #[arg(long = "check", value_name = "CONTEXT")]
    checks: Vec<String>,

    /// GitHub API token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl SyncCommand {
    pub async fn run(&self) -> Result<()> {
        ui::print_section("Syncing repository configuration");

        let presets = Presets::load(self.config.as_deref())?;
        let token = self
            .token
            .clone()
            .context("a GitHub token is required; pass --token or set GITHUB_TOKEN")?;

        let (owner, name) = parse_repo(&self.repo)?;
        let key = if self.org {
            RepoKey::org(owner, name)
        } else {
            RepoKey::user(owner, name)
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

        ui::print_info(&format!("Repository: {key}"));
        ui::print_info(&format!("Protected branch: {branch}"));
        if !checks.is_empty() {
            ui::print_info(&format!("Required checks: {}", checks.join(", ")));
        }
        println!();

        if !self.yes {
            let proceed = Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt("Proceed? This will create or update resources on GitHub")
                .default(true)
                .interact()?;

            if !proceed {
                println!("{}", "Cancelled.".yellow());
                return Ok(());
            }
        }

        let reconciler = Reconciler::new(GitHubClient::new(token)?);
        let branch_key = BranchKey::of(&key, branch);

        ui::print_step("Reconciling repository settings");
        let applied = reconciler
            .reconcile::<Repository>(&key, &settings_spec())
            .await?;
        if applied.was_created() {
            ui::print_warning(&format!("{key} did not exist and was created"));
        }

        ui::print_step("Reconciling branch protection");
        reconciler
            .reconcile::<BranchProtection>(&branch_key, &protection_spec(checks))
            .await?;
        reconciler.enable_commit_signatures(&branch_key).await?;

        ui::print_step("Enabling vulnerability alerts");
        reconciler.enable_vulnerability_alerts(&key).await?;

        ui::print_step("Reconciling labels");
        let report = reconcile_label_set(&reconciler, &key, &LabelSet::standard()).await?;
        for group in report.failed_groups() {
            ui::print_warning(&format!("label group '{group}' failed to apply"));
        }
        if !report.is_complete() {
            bail!(
                "label groups failed to apply: {}",
                report.failed_groups().join(", ")
            );
        }

        println!();
        ui::print_success(&format!(
            "{key} converged ({} labels created, {} updated)",
            report.created(),
            report.updated()
        ));
        Ok(())
    }
}

fn parse_repo(repo: &str) -> Result<(&str, &str)> {
    repo.split_once('/')
        .filter(|(owner, name)| !owner.is_empty() && !name.is_empty())
        .with_context(|| format!("invalid repository '{repo}': expected <owner>/<name>"))
}

/// Managed repository settings for sync runs.
///
/// Merge policy matches the scaffolded defaults. Description and privacy
/// stay `None`: the API omits absent fields, so whatever is set remotely
/// survives the update.
fn settings_spec() -> RepositorySpec {
    RepositorySpec {
        description: None,
        private: None,
        has_issues: Some(true),
        allow_squash_merge: Some(true),
        allow_merge_commit: Some(false),
        allow_rebase_merge: Some(true),
        allow_auto_merge: Some(true),
        delete_branch_on_merge: Some(true),
        allow_update_branch: Some(true),
        squash_merge_commit_title: Some(SquashMergeCommitTitle::PrTitle),
    }
}

fn protection_spec(checks: Vec<String>) -> BranchProtectionSpec {
    BranchProtectionSpec {
        required_status_checks: RequiredStatusChecks {
            strict: true,
            contexts: checks,
        },
        enforce_admins: false,
        required_pull_request_reviews: RequiredPullRequestReviews {
            required_approving_review_count: 0,
        },
        restrictions: None,
        required_linear_history: true,
        allow_force_pushes: false,
        allow_deletions: false,
        required_conversation_resolution: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repo() {
        assert_eq!(parse_repo("acme/widget").unwrap(), ("acme", "widget"));

        assert!(parse_repo("widget").is_err());
        assert!(parse_repo("/widget").is_err());
        assert!(parse_repo("acme/").is_err());
    }

    #[test]
    fn test_sync_leaves_description_and_privacy_alone() {
        let payload = serde_json::to_value(settings_spec()).unwrap();
        let fields = payload.as_object().unwrap();

        assert!(!fields.contains_key("description"));
        assert!(!fields.contains_key("private"));
        assert_eq!(fields["allow_merge_commit"], false);
        assert_eq!(fields["squash_merge_commit_title"], "PR_TITLE");
    }

    #[test]
    fn test_protection_carries_checks() {
        let spec = protection_spec(vec!["ci/test".to_string()]);

        assert!(spec.required_status_checks.strict);
        assert_eq!(spec.required_status_checks.contexts, ["ci/test"]);
        assert_eq!(
            spec.required_pull_request_reviews
                .required_approving_review_count,
            0
        );
    }
}
