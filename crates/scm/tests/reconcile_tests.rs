//! Reconciliation flow tests against a scripted in-memory client.
//!
//! The scripted client records every request so tests can assert on the
//! exact call sequence: which paths were read, whether the create or the
//! update path ran, and what payloads went over the wire.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};

use scm::labels::{reconcile_label_set, LabelSet};
use scm::models::{
    BranchKey, BranchProtectionSpec, RepoKey, RepositorySpec, RequiredPullRequestReviews,
    RequiredStatusChecks,
};
use scm::{ApiResponse, BranchProtection, Reconciler, Repository, ResourceClient, ScmError};

// ============================================================================
// Scripted client
// ============================================================================

#[derive(Debug, Clone)]
struct Call {
    method: Method,
    path: String,
    body: Option<Value>,
}

/// In-memory stand-in for the provider API.
///
/// Read paths listed in `missing` report 404 on their first GET and exist
/// afterwards, mirroring a resource that appears once created. Paths in
/// `failing` fail every request with a transient error.
#[derive(Default)]
struct ScriptedClient {
    missing: Mutex<HashSet<String>>,
    failing: HashSet<String>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedClient {
    fn new() -> Self {
        Self::default()
    }

    fn missing(self, path: &str) -> Self {
        self.missing.lock().unwrap().insert(path.to_string());
        self
    }

    fn failing(mut self, path: &str) -> Self {
        self.failing.insert(path.to_string());
        self
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, method: &Method, path: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| &c.method == method && c.path == path)
            .count()
    }

    fn count_method(&self, method: &Method) -> usize {
        self.calls().iter().filter(|c| &c.method == method).count()
    }
}

/// Minimal plausible success bodies per endpoint family.
fn canned_body(path: &str) -> Value {
    if path.contains("/required_signatures") {
        json!({"enabled": true})
    } else if path.contains("/labels") {
        json!({"id": 1, "name": "label", "color": "000000"})
    } else if path.contains("/protection") {
        json!({})
    } else {
        json!({
            "id": 1,
            "name": "widget",
            "full_name": "acme/widget",
            "private": false,
            "html_url": "https://github.com/acme/widget"
        })
    }
}

#[async_trait]
impl ResourceClient for ScriptedClient {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse, ScmError> {
        self.calls.lock().unwrap().push(Call {
            method: method.clone(),
            path: path.to_string(),
            body: body.cloned(),
        });

        if self.failing.contains(path) {
            return Err(ScmError::Transient {
                status: 500,
                message: "scripted failure".to_string(),
            });
        }

        if method == Method::GET && self.missing.lock().unwrap().remove(path) {
            return Err(ScmError::NotFound {
                resource: path.to_string(),
            });
        }

        Ok(ApiResponse {
            status: 200,
            body: canned_body(path),
        })
    }
}

fn widget_spec() -> RepositorySpec {
    RepositorySpec {
        description: Some("A widget".to_string()),
        private: Some(false),
        has_issues: Some(true),
        ..Default::default()
    }
}

// ============================================================================
// Repository create and update paths
// ============================================================================

#[tokio::test]
async fn test_missing_repository_issues_single_create() {
    let client = ScriptedClient::new().missing("/repos/acme/widget");
    let reconciler = Reconciler::new(client);

    let applied = reconciler
        .reconcile::<Repository>(&RepoKey::user("acme", "widget"), &widget_spec())
        .await
        .unwrap();

    assert!(applied.was_created());
    let client = reconciler.client();
    assert_eq!(client.count(&Method::POST, "/user/repos"), 1);
    assert_eq!(client.count_method(&Method::PATCH), 0);

    let calls = client.calls();
    assert_eq!(calls.len(), 2);
    let body = calls[1].body.as_ref().unwrap();
    assert_eq!(body["name"], "widget");
    assert_eq!(body["private"], false);
    assert_eq!(body["has_issues"], true);
}

#[tokio::test]
async fn test_existing_repository_issues_single_update() {
    let reconciler = Reconciler::new(ScriptedClient::new());

    let applied = reconciler
        .reconcile::<Repository>(&RepoKey::user("acme", "widget"), &widget_spec())
        .await
        .unwrap();

    assert!(!applied.was_created());
    let client = reconciler.client();
    assert_eq!(client.count(&Method::PATCH, "/repos/acme/widget"), 1);
    assert_eq!(client.count_method(&Method::POST), 0);

    // The spec payload is authoritative even when the remote value differs.
    let calls = client.calls();
    let body = calls[1].body.as_ref().unwrap();
    assert_eq!(body["private"], false);
}

#[tokio::test]
async fn test_second_reconcile_updates_instead_of_creating_again() {
    let client = ScriptedClient::new().missing("/repos/acme/widget");
    let reconciler = Reconciler::new(client);
    let key = RepoKey::user("acme", "widget");
    let spec = widget_spec();

    let first = reconciler.reconcile::<Repository>(&key, &spec).await.unwrap();
    let second = reconciler.reconcile::<Repository>(&key, &spec).await.unwrap();

    assert!(first.was_created());
    assert!(!second.was_created());

    let client = reconciler.client();
    assert_eq!(client.count_method(&Method::POST), 1);
    assert_eq!(client.count_method(&Method::PATCH), 1);
}

#[tokio::test]
async fn test_read_failure_aborts_before_any_write() {
    let client = ScriptedClient::new().failing("/repos/acme/widget");
    let reconciler = Reconciler::new(client);

    let err = reconciler
        .reconcile::<Repository>(&RepoKey::user("acme", "widget"), &widget_spec())
        .await
        .unwrap_err();

    assert!(err.is_transient());
    assert_eq!(reconciler.client().calls().len(), 1);
}

// ============================================================================
// Branch protection
// ============================================================================

fn protection_spec() -> BranchProtectionSpec {
    BranchProtectionSpec {
        required_status_checks: RequiredStatusChecks {
            strict: true,
            contexts: vec!["ci/lint".to_string(), "ci/test".to_string()],
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

#[tokio::test]
async fn test_unprotected_branch_gets_full_replace_put() {
    let client = ScriptedClient::new().missing("/repos/acme/widget/branches/main/protection");
    let reconciler = Reconciler::new(client);
    let key = BranchKey::new("acme", "widget", "main");

    let applied = reconciler
        .reconcile::<BranchProtection>(&key, &protection_spec())
        .await
        .unwrap();

    assert!(applied.was_created());
    let client = reconciler.client();
    assert_eq!(
        client.count(&Method::PUT, "/repos/acme/widget/branches/main/protection"),
        1
    );

    // Zero approvals and disabled admin enforcement are real values on the
    // wire, not omissions.
    let calls = client.calls();
    let body = calls[1].body.as_ref().unwrap();
    assert_eq!(
        body["required_pull_request_reviews"]["required_approving_review_count"],
        0
    );
    assert_eq!(body["enforce_admins"], false);
    assert_eq!(body["restrictions"], Value::Null);
    assert_eq!(body["required_status_checks"]["contexts"][1], "ci/test");
}

#[tokio::test]
async fn test_commit_signatures_enabled_without_fetch() {
    let reconciler = Reconciler::new(ScriptedClient::new());
    let key = BranchKey::new("acme", "widget", "main");

    let state = reconciler.enable_commit_signatures(&key).await.unwrap();

    assert!(state.enabled);
    let client = reconciler.client();
    assert_eq!(client.calls().len(), 1);
    assert_eq!(
        client.count(
            &Method::POST,
            "/repos/acme/widget/branches/main/protection/required_signatures"
        ),
        1
    );
}

#[tokio::test]
async fn test_vulnerability_alerts_single_put() {
    let reconciler = Reconciler::new(ScriptedClient::new());

    reconciler
        .enable_vulnerability_alerts(&RepoKey::user("acme", "widget"))
        .await
        .unwrap();

    let client = reconciler.client();
    assert_eq!(client.calls().len(), 1);
    assert_eq!(
        client.count(&Method::PUT, "/repos/acme/widget/vulnerability-alerts"),
        1
    );
}

// ============================================================================
// Label set
// ============================================================================

#[tokio::test]
async fn test_standard_label_set_creates_all_eleven() {
    let set = LabelSet::standard();
    let mut client = ScriptedClient::new();
    for group in &set.groups {
        for label in &group.labels {
            let encoded = urlencoding::encode(&label.name).into_owned();
            client = client.missing(&format!("/repos/acme/widget/labels/{encoded}"));
        }
    }
    let reconciler = Reconciler::new(client);

    let report = reconcile_label_set(&reconciler, &RepoKey::user("acme", "widget"), &set)
        .await
        .unwrap();

    assert!(report.is_complete());
    assert_eq!(report.created(), 11);
    assert_eq!(report.updated(), 0);

    let client = reconciler.client();
    assert_eq!(client.count(&Method::POST, "/repos/acme/widget/labels"), 11);
    // One existence probe per label, percent-encoded.
    assert_eq!(client.count_method(&Method::GET), 11);
    assert_eq!(
        client.count(&Method::GET, "/repos/acme/widget/labels/%3Afire%3A%20P0"),
        1
    );
}

#[tokio::test]
async fn test_existing_labels_are_updated_in_place() {
    let reconciler = Reconciler::new(ScriptedClient::new());
    let set = LabelSet::standard();

    let report = reconcile_label_set(&reconciler, &RepoKey::user("acme", "widget"), &set)
        .await
        .unwrap();

    assert!(report.is_complete());
    assert_eq!(report.updated(), 11);
    assert_eq!(reconciler.client().count_method(&Method::PATCH), 11);
}

#[tokio::test]
async fn test_label_group_failure_does_not_stop_later_groups() {
    // Third priority label fails; P3/P4 must be skipped but the issue-type
    // and state groups still run to completion.
    let client = ScriptedClient::new().failing("/repos/acme/widget/labels/%3Awarning%3A%20P2");
    let reconciler = Reconciler::new(client);
    let set = LabelSet::standard();

    let report = reconcile_label_set(&reconciler, &RepoKey::user("acme", "widget"), &set)
        .await
        .unwrap();

    assert!(!report.is_complete());
    assert_eq!(report.failed_groups(), ["priority"]);
    assert_eq!(report.groups[0].created + report.groups[0].updated, 2);
    assert!(report.groups[0].error.as_ref().unwrap().is_transient());
    assert_eq!(report.groups[1].created + report.groups[1].updated, 4);
    assert_eq!(report.groups[2].created + report.groups[2].updated, 2);

    let client = reconciler.client();
    assert_eq!(
        client.count(&Method::GET, "/repos/acme/widget/labels/%3Agrey_exclamation%3A%20P3"),
        0
    );
    assert_eq!(
        client.count(&Method::GET, "/repos/acme/widget/labels/%3Aicecream%3A%20P4"),
        0
    );
}
