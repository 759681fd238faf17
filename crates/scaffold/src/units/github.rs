//! Remote GitHub resource scaffolding.
//!
//! The writing phase brings the repository, its default-branch protection,
//! vulnerability alerts, and the standard label taxonomy to their desired
//! state. Every step is a create-or-update reconcile, so re-running the
//! generator against an existing repository is safe.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tracing::info;

use scm::models::{
    BranchKey, BranchProtectionSpec, OwnerKind, RepoKey, RepositorySpec,
    RequiredPullRequestReviews, RequiredStatusChecks, SquashMergeCommitTitle,
};
use scm::{reconcile_label_set, BranchProtection, LabelSet, Reconciler, Repository, ResourceClient};

use crate::prompt::Question;
use crate::unit::{GeneratorUnit, UnitContext, UnitId};

pub const REPO_OWNER_KEY: &str = "repo_owner";
pub const REPO_NAME_KEY: &str = "repo_name";
pub const REPO_DESCRIPTION_KEY: &str = "repo_description";
pub const REPO_PRIVATE_KEY: &str = "repo_private";

/// Constructor options for [`GithubUnit`].
#[derive(Debug, Clone)]
pub struct GithubOptions {
    /// Branch the protection rules apply to.
    pub branch: String,
    /// Status check contexts that must pass before merging.
    pub required_checks: Vec<String>,
    /// Whether the owner account is a user or an organization.
    pub owner_kind: OwnerKind,
    /// Default answer for the owner question.
    pub default_owner: String,
    /// Default answer for the repository name question.
    pub default_name: String,
}

impl Default for GithubOptions {
    fn default() -> Self {
        Self {
            branch: "main".to_string(),
            required_checks: Vec::new(),
            owner_kind: OwnerKind::User,
            default_owner: String::new(),
            default_name: String::new(),
        }
    }
}

/// Reconciles the remote repository during the writing phase.
pub struct GithubUnit<C> {
    reconciler: Reconciler<C>,
    options: GithubOptions,
}

impl<C: ResourceClient> GithubUnit<C> {
    pub fn new(client: C, options: GithubOptions) -> Self {
        Self {
            reconciler: Reconciler::new(client),
            options,
        }
    }

    fn repo_key(&self, cx: &UnitContext<'_>) -> Result<RepoKey> {
        let owner = cx
            .answers
            .text(REPO_OWNER_KEY)
            .context("missing 'repo_owner' answer")?;
        let name = cx
            .answers
            .text(REPO_NAME_KEY)
            .context("missing 'repo_name' answer")?;

        Ok(RepoKey {
            owner: owner.to_string(),
            name: name.to_string(),
            owner_kind: self.options.owner_kind,
        })
    }

    /// Repository settings applied on create and update alike.
    ///
    /// Merge policy favors linear history: squash and rebase merges on,
    /// merge commits off, squash commits titled after the pull request.
    fn repository_spec(&self, cx: &UnitContext<'_>) -> RepositorySpec {
        RepositorySpec {
            description: cx.answers.text(REPO_DESCRIPTION_KEY).map(String::from),
            private: Some(cx.answers.flag(REPO_PRIVATE_KEY).unwrap_or(false)),
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

    fn protection_spec(&self) -> BranchProtectionSpec {
        BranchProtectionSpec {
            required_status_checks: RequiredStatusChecks {
                strict: true,
                contexts: self.options.required_checks.clone(),
            },
            // Solo-maintainer policy: the rules gate pull requests, not the
            // administrator, and merges need no second approver.
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
}

#[async_trait]
impl<C: ResourceClient> GeneratorUnit for GithubUnit<C> {
    fn id(&self) -> UnitId {
        UnitId::new("github")
    }

    fn questions(&self) -> Vec<Question> {
        vec![
            Question::text(
                REPO_OWNER_KEY,
                "Who owns this repository?",
                self.options.default_owner.clone(),
            ),
            Question::text(
                REPO_NAME_KEY,
                "What is the name of this new repository?",
                self.options.default_name.clone(),
            ),
            Question::text(
                REPO_DESCRIPTION_KEY,
                "What is the description of this new repository?",
                "",
            ),
            Question::confirm(REPO_PRIVATE_KEY, "Should this repository be private?", false),
        ]
    }

    async fn writing(&mut self, cx: &UnitContext<'_>) -> Result<()> {
        let repo = self.repo_key(cx)?;
        let branch = BranchKey::of(&repo, self.options.branch.clone());

        let applied = self
            .reconciler
            .reconcile::<Repository>(&repo, &self.repository_spec(cx))
            .await?;
        let created = applied.was_created();
        let state = applied.into_state();
        info!(
            repository = %repo,
            created,
            url = %state.html_url,
            "Repository reconciled"
        );

        self.reconciler
            .reconcile::<BranchProtection>(&branch, &self.protection_spec())
            .await?;
        self.reconciler.enable_commit_signatures(&branch).await?;
        self.reconciler.enable_vulnerability_alerts(&repo).await?;

        let report = reconcile_label_set(&self.reconciler, &repo, &LabelSet::standard()).await?;
        if !report.is_complete() {
            bail!(
                "label groups failed to apply: {}",
                report.failed_groups().join(", ")
            );
        }

        Ok(())
    }
}
