//! Desired-state specs and remote-state models for managed resources.
//!
//! Spec field names match the GitHub REST schema exactly: a spec serialized
//! to JSON is the request payload. Optional spec fields mean "do not manage
//! this field" and are omitted from payloads; fields that are present are
//! always sent in full, on create and update alike.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a repository owner is a user account or an organization.
///
/// Selects the create endpoint; reads and updates are owner-kind agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerKind {
    #[default]
    User,
    Organization,
}

/// Identity of a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoKey {
    /// Account or organization owning the repository.
    pub owner: String,
    /// Repository name.
    pub name: String,
    /// Kind of the owning account.
    pub owner_kind: OwnerKind,
}

impl RepoKey {
    /// Repository owned by the authenticated user.
    pub fn user(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            owner_kind: OwnerKind::User,
        }
    }

    /// Repository owned by an organization.
    pub fn org(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            owner_kind: OwnerKind::Organization,
        }
    }
}

impl fmt::Display for RepoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Identity of a branch within a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchKey {
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

impl BranchKey {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
        }
    }

    /// Branch key within an existing repository key.
    pub fn of(repo: &RepoKey, branch: impl Into<String>) -> Self {
        Self::new(repo.owner.clone(), repo.name.clone(), branch)
    }
}

impl fmt::Display for BranchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.repo, self.branch)
    }
}

/// Identity of a label within a repository. The label name is the natural
/// key; it may contain spaces and colons and is percent-encoded in API paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelKey {
    pub owner: String,
    pub repo: String,
    pub name: String,
}

impl LabelKey {
    /// Label key within an existing repository key.
    pub fn of(repo: &RepoKey, name: impl Into<String>) -> Self {
        Self {
            owner: repo.owner.clone(),
            repo: repo.name.clone(),
            name: name.into(),
        }
    }
}

impl fmt::Display for LabelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.owner, self.repo, self.name)
    }
}

/// Title source for squash-merge commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SquashMergeCommitTitle {
    /// Use the pull request title.
    PrTitle,
    /// Use the commit title for single-commit PRs, the PR title otherwise.
    CommitOrPrTitle,
}

/// Desired configuration of a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySpec {
    /// Repository description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the repository is private.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    /// Whether the issue tracker is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_issues: Option<bool>,
    /// Allow squash-merging pull requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_squash_merge: Option<bool>,
    /// Allow merge commits on pull requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_merge_commit: Option<bool>,
    /// Allow rebase-merging pull requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_rebase_merge: Option<bool>,
    /// Allow auto-merge once requirements pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_auto_merge: Option<bool>,
    /// Delete head branches after merge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_branch_on_merge: Option<bool>,
    /// Offer updating PR branches behind the base branch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_update_branch: Option<bool>,
    /// Default title for squash-merge commits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub squash_merge_commit_title: Option<SquashMergeCommitTitle>,
}

/// Remote state of a repository, as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryState {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub private: bool,
    pub html_url: String,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Required status checks on a protected branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredStatusChecks {
    /// Require branches to be up to date before merging.
    pub strict: bool,
    /// Status check contexts that must pass.
    pub contexts: Vec<String>,
}

/// Pull request review requirements on a protected branch.
///
/// A count of zero is a real value (merges allowed without approvals) and is
/// always serialized, never treated as unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredPullRequestReviews {
    pub required_approving_review_count: u32,
}

/// Push restrictions on a protected branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restrictions {
    pub users: Vec<String>,
    pub teams: Vec<String>,
}

/// Desired protection rules for a branch.
///
/// The protection endpoint is a full replace, so create and update share one
/// payload. `restrictions` is serialized even when `None`: the API requires
/// the key to be present, with `null` meaning "no push restrictions".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchProtectionSpec {
    pub required_status_checks: RequiredStatusChecks,
    /// Apply the rules to administrators too.
    pub enforce_admins: bool,
    pub required_pull_request_reviews: RequiredPullRequestReviews,
    pub restrictions: Option<Restrictions>,
    pub required_linear_history: bool,
    pub allow_force_pushes: bool,
    pub allow_deletions: bool,
    pub required_conversation_resolution: bool,
}

/// A boolean protection setting as the API reports it.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EnabledFlag {
    pub enabled: bool,
}

/// Review requirements as the API reports them.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRequirementState {
    #[serde(default)]
    pub required_approving_review_count: u32,
}

/// Remote protection state of a branch. The read shape differs from the
/// write shape: boolean settings come back wrapped in `{"enabled": ...}`.
#[derive(Debug, Clone, Deserialize)]
pub struct BranchProtectionState {
    #[serde(default)]
    pub required_status_checks: Option<RequiredStatusChecks>,
    #[serde(default)]
    pub enforce_admins: Option<EnabledFlag>,
    #[serde(default)]
    pub required_pull_request_reviews: Option<ReviewRequirementState>,
    #[serde(default)]
    pub required_linear_history: Option<EnabledFlag>,
    #[serde(default)]
    pub allow_force_pushes: Option<EnabledFlag>,
    #[serde(default)]
    pub allow_deletions: Option<EnabledFlag>,
    #[serde(default)]
    pub required_conversation_resolution: Option<EnabledFlag>,
}

/// State of the commit-signature requirement on a protected branch.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SignatureProtectionState {
    pub enabled: bool,
}

/// Desired configuration of an issue label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSpec {
    /// Label name, including any emoji shortcode prefix.
    pub name: String,
    /// Six hex digits, no leading `#`.
    pub color: String,
    pub description: String,
}

impl LabelSpec {
    pub fn new(
        name: impl Into<String>,
        color: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            description: description.into(),
        }
    }
}

/// Remote state of an issue label.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelState {
    pub id: u64,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_key_display() {
        assert_eq!(RepoKey::user("acme", "widget").to_string(), "acme/widget");
        assert_eq!(
            BranchKey::new("acme", "widget", "main").to_string(),
            "acme/widget@main"
        );
    }

    #[test]
    fn test_repository_spec_skips_unmanaged_fields() {
        let spec = RepositorySpec {
            private: Some(false),
            has_issues: Some(true),
            ..Default::default()
        };

        let json = serde_json::to_value(&spec).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["private"], false);
        assert_eq!(obj["has_issues"], true);
    }

    #[test]
    fn test_squash_title_wire_format() {
        let json = serde_json::to_value(SquashMergeCommitTitle::PrTitle).unwrap();
        assert_eq!(json, "PR_TITLE");
    }

    #[test]
    fn test_protection_spec_serializes_zero_review_count() {
        let spec = BranchProtectionSpec {
            required_status_checks: RequiredStatusChecks {
                strict: true,
                contexts: vec!["lint".to_string()],
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
        };

        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(
            json["required_pull_request_reviews"]["required_approving_review_count"],
            0
        );
        assert_eq!(json["enforce_admins"], false);
        // The restrictions key must be present with an explicit null.
        assert!(json.as_object().unwrap().contains_key("restrictions"));
        assert_eq!(json["restrictions"], serde_json::Value::Null);
    }

    #[test]
    fn test_protection_state_read_shape() {
        let json = r#"{
            "required_status_checks": {"strict": true, "contexts": ["ci/test"]},
            "enforce_admins": {"url": "https://api.github.com/...", "enabled": false},
            "required_pull_request_reviews": {"required_approving_review_count": 0},
            "required_linear_history": {"enabled": true},
            "allow_force_pushes": {"enabled": false}
        }"#;

        let state: BranchProtectionState = serde_json::from_str(json).unwrap();
        assert!(state.required_status_checks.unwrap().strict);
        assert!(!state.enforce_admins.unwrap().enabled);
        assert_eq!(
            state
                .required_pull_request_reviews
                .unwrap()
                .required_approving_review_count,
            0
        );
    }

    #[test]
    fn test_repository_state_deserialization() {
        let json = r#"{
            "id": 1296269,
            "name": "widget",
            "full_name": "acme/widget",
            "private": false,
            "html_url": "https://github.com/acme/widget",
            "default_branch": "main",
            "created_at": "2024-01-26T19:01:12Z",
            "updated_at": "2024-01-26T19:14:43Z"
        }"#;

        let state: RepositoryState = serde_json::from_str(json).unwrap();
        assert_eq!(state.full_name, "acme/widget");
        assert_eq!(state.default_branch.as_deref(), Some("main"));
        assert!(state.created_at.is_some());
    }

    #[test]
    fn test_label_state_deserialization() {
        let json = r#"{
            "id": 208045946,
            "name": ":bug: bug",
            "color": "D93F0B",
            "description": "Something isn't working.",
            "default": false
        }"#;

        let state: LabelState = serde_json::from_str(json).unwrap();
        assert_eq!(state.name, ":bug: bug");
        assert_eq!(state.color, "D93F0B");
    }
}
