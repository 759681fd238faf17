//! Create-or-update reconciliation of remote resources.
//!
//! Reconciliation is idempotent: fetch the resource by key, create it when
//! the provider reports it missing, otherwise overwrite it with the full
//! desired spec. There is no field diffing; the spec payload is
//! authoritative on both paths. A failed run is recovered by running again.

use std::fmt;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::client::{ApiResponse, ResourceClient};
use crate::error::ScmError;
use crate::models::{
    BranchKey, BranchProtectionSpec, BranchProtectionState, LabelKey, LabelSpec, LabelState,
    OwnerKind, RepoKey, RepositorySpec, RepositoryState, SignatureProtectionState,
};

/// A single API request produced by a [`ResourceKind`].
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

/// Wire mapping for one managed resource kind.
pub trait ResourceKind {
    /// Key identifying one resource instance.
    type Key: fmt::Display;
    /// Desired-state spec.
    type Spec: Serialize;
    /// Remote state returned by the provider.
    type State: DeserializeOwned;

    /// Kind name, for logs.
    fn kind() -> &'static str;

    /// Path the resource is fetched from.
    fn read_path(key: &Self::Key) -> String;

    /// Request that creates the resource.
    ///
    /// # Errors
    /// Returns an error if the spec cannot be serialized.
    fn create(key: &Self::Key, spec: &Self::Spec) -> Result<Request, ScmError>;

    /// Request that overwrites the resource with the full spec.
    ///
    /// # Errors
    /// Returns an error if the spec cannot be serialized.
    fn update(key: &Self::Key, spec: &Self::Spec) -> Result<Request, ScmError>;
}

/// Outcome of a reconcile call, recording which path was taken.
#[derive(Debug)]
pub enum Applied<T> {
    /// The resource did not exist and was created.
    Created(T),
    /// The resource existed and was overwritten with the spec.
    Updated(T),
}

impl<T> Applied<T> {
    pub fn was_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    /// The resulting remote state, whichever path produced it.
    pub fn into_state(self) -> T {
        match self {
            Self::Created(state) | Self::Updated(state) => state,
        }
    }
}

/// Applies desired specs to the provider through a [`ResourceClient`].
pub struct Reconciler<C> {
    client: C,
}

impl<C: ResourceClient> Reconciler<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// The underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Bring one resource to its desired state.
    ///
    /// # Errors
    /// Returns the first provider error encountered. Nothing is retried or
    /// rolled back at this layer.
    pub async fn reconcile<K: ResourceKind>(
        &self,
        key: &K::Key,
        spec: &K::Spec,
    ) -> Result<Applied<K::State>, ScmError> {
        debug!(kind = K::kind(), key = %key, "Fetching current resource state");

        match self
            .client
            .request(Method::GET, &K::read_path(key), None)
            .await
        {
            Ok(_) => {
                let request = K::update(key, spec)?;
                let response = self.execute(&request).await?;
                let state = decode::<K::State>(response)?;
                info!(kind = K::kind(), key = %key, "Resource updated");
                Ok(Applied::Updated(state))
            }
            Err(ScmError::NotFound { .. }) => {
                debug!(kind = K::kind(), key = %key, "Resource missing, creating");
                let request = K::create(key, spec)?;
                let response = self.execute(&request).await?;
                let state = decode::<K::State>(response)?;
                info!(kind = K::kind(), key = %key, "Resource created");
                Ok(Applied::Created(state))
            }
            Err(e) => Err(e),
        }
    }

    /// Require signed commits on a protected branch.
    ///
    /// Signature protection is its own sub-resource with an idempotent
    /// enable call; there is no fetch-first step.
    ///
    /// # Errors
    /// Returns an error if the API call fails.
    pub async fn enable_commit_signatures(
        &self,
        key: &BranchKey,
    ) -> Result<SignatureProtectionState, ScmError> {
        let path = format!(
            "/repos/{}/{}/branches/{}/protection/required_signatures",
            key.owner, key.repo, key.branch
        );
        let response = self.client.request(Method::POST, &path, None).await?;
        let state = decode::<SignatureProtectionState>(response)?;
        info!(branch = %key, "Commit signature requirement enabled");
        Ok(state)
    }

    /// Turn on vulnerability alerts for a repository. Enabling an already
    /// enabled repository is a no-op on the provider side.
    ///
    /// # Errors
    /// Returns an error if the API call fails.
    pub async fn enable_vulnerability_alerts(&self, key: &RepoKey) -> Result<(), ScmError> {
        let path = format!("/repos/{}/{}/vulnerability-alerts", key.owner, key.name);
        self.client.request(Method::PUT, &path, None).await?;
        info!(repository = %key, "Vulnerability alerts enabled");
        Ok(())
    }

    async fn execute(&self, request: &Request) -> Result<ApiResponse, ScmError> {
        self.client
            .request(request.method.clone(), &request.path, request.body.as_ref())
            .await
    }
}

/// Decode a response body into the expected state type.
fn decode<T: DeserializeOwned>(response: ApiResponse) -> Result<T, ScmError> {
    Ok(serde_json::from_value(response.body)?)
}

/// Repository settings resource.
pub struct Repository;

impl ResourceKind for Repository {
    type Key = RepoKey;
    type Spec = RepositorySpec;
    type State = RepositoryState;

    fn kind() -> &'static str {
        "repository"
    }

    fn read_path(key: &RepoKey) -> String {
        format!("/repos/{}/{}", key.owner, key.name)
    }

    fn create(key: &RepoKey, spec: &RepositorySpec) -> Result<Request, ScmError> {
        // The create payload carries the repository name alongside the
        // managed settings; the endpoint depends on the owner kind.
        let mut body = to_object(spec)?;
        body.insert("name".to_string(), Value::String(key.name.clone()));

        let path = match key.owner_kind {
            OwnerKind::User => "/user/repos".to_string(),
            OwnerKind::Organization => format!("/orgs/{}/repos", key.owner),
        };

        Ok(Request {
            method: Method::POST,
            path,
            body: Some(Value::Object(body)),
        })
    }

    fn update(key: &RepoKey, spec: &RepositorySpec) -> Result<Request, ScmError> {
        Ok(Request {
            method: Method::PATCH,
            path: Self::read_path(key),
            body: Some(serde_json::to_value(spec)?),
        })
    }
}

/// Branch protection resource. The provider endpoint is a full replace, so
/// create and update are the same PUT.
pub struct BranchProtection;

impl ResourceKind for BranchProtection {
    type Key = BranchKey;
    type Spec = BranchProtectionSpec;
    type State = BranchProtectionState;

    fn kind() -> &'static str {
        "branch-protection"
    }

    fn read_path(key: &BranchKey) -> String {
        format!(
            "/repos/{}/{}/branches/{}/protection",
            key.owner, key.repo, key.branch
        )
    }

    fn create(key: &BranchKey, spec: &BranchProtectionSpec) -> Result<Request, ScmError> {
        Self::update(key, spec)
    }

    fn update(key: &BranchKey, spec: &BranchProtectionSpec) -> Result<Request, ScmError> {
        Ok(Request {
            method: Method::PUT,
            path: Self::read_path(key),
            body: Some(serde_json::to_value(spec)?),
        })
    }
}

/// Issue label resource.
pub struct Label;

impl ResourceKind for Label {
    type Key = LabelKey;
    type Spec = LabelSpec;
    type State = LabelState;

    fn kind() -> &'static str {
        "label"
    }

    fn read_path(key: &LabelKey) -> String {
        format!(
            "/repos/{}/{}/labels/{}",
            key.owner,
            key.repo,
            urlencoding::encode(&key.name)
        )
    }

    fn create(key: &LabelKey, spec: &LabelSpec) -> Result<Request, ScmError> {
        Ok(Request {
            method: Method::POST,
            path: format!("/repos/{}/{}/labels", key.owner, key.repo),
            body: Some(serde_json::to_value(spec)?),
        })
    }

    fn update(key: &LabelKey, spec: &LabelSpec) -> Result<Request, ScmError> {
        // Rename-safe update: the path addresses the current name, the body
        // asserts the desired one.
        let body = serde_json::json!({
            "new_name": spec.name,
            "color": spec.color,
            "description": spec.description,
        });

        Ok(Request {
            method: Method::PATCH,
            path: Self::read_path(key),
            body: Some(body),
        })
    }
}

fn to_object(spec: &impl Serialize) -> Result<serde_json::Map<String, Value>, ScmError> {
    match serde_json::to_value(spec)? {
        Value::Object(map) => Ok(map),
        other => Err(ScmError::InvalidSpec(format!(
            "expected an object payload, got {other}"
        ))),
    }
}
