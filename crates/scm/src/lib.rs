//! GitHub resource reconciliation for scaffolded repositories.
//!
//! This crate brings remote resources (repository settings, branch
//! protection, labels, vulnerability alerts) to a declared desired state
//! with create-or-update semantics: fetch by key, create when missing,
//! otherwise overwrite with the full spec. Every operation is idempotent,
//! so a failed run is recovered by running again.
//!
//! # Example
//!
//! ```rust,ignore
//! use scm::{GitHubClient, Reconciler, Repository};
//! use scm::models::{RepoKey, RepositorySpec};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = GitHubClient::new(std::env::var("GITHUB_TOKEN")?)?;
//!     let reconciler = Reconciler::new(client);
//!
//!     let key = RepoKey::user("acme", "widget");
//!     let spec = RepositorySpec {
//!         description: Some("A widget".into()),
//!         private: Some(false),
//!         ..Default::default()
//!     };
//!
//!     let applied = reconciler.reconcile::<Repository>(&key, &spec).await?;
//!     println!("created: {}", applied.was_created());
//!     Ok(())
//! }
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod error;
pub mod labels;
pub mod models;
pub mod reconcile;

pub use client::{ApiResponse, GitHubClient, ResourceClient};
pub use error::ScmError;
pub use labels::{reconcile_label_set, LabelSet, LabelSetReport};
pub use reconcile::{Applied, BranchProtection, Label, Reconciler, Repository, ResourceKind};

// Re-export so implementors of `ResourceClient` name the same Method type.
pub use reqwest::Method;
