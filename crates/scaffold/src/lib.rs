//! Composable project generators with phased execution.
//!
//! A generator is assembled from [`unit::GeneratorUnit`]s. Units compose
//! other units by containment; [`compose::compose`] flattens the
//! composition into a deduplicated plan, and [`compose::Runner`] drives
//! every unit through the five lifecycle phases in lockstep, so a phase
//! finishes for all units before the next phase starts for any.
//!
//! # Example
//!
//! ```rust,ignore
//! use scaffold::compose::{compose, Runner};
//! use scaffold::prompt::DefaultsPrompter;
//! use scaffold::units::{GithubOptions, ProjectUnit};
//! use scm::GitHubClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = GitHubClient::new(std::env::var("GITHUB_TOKEN")?)?;
//!     let unit = ProjectUnit::new(client, "widget", GithubOptions::default());
//!
//!     let plan = compose(vec![Box::new(unit)])?;
//!     let runner = Runner::new("./widget", Box::new(DefaultsPrompter));
//!     let report = runner.run(plan).await?;
//!
//!     println!("ran {} units", report.unit_count());
//!     Ok(())
//! }
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod answers;
pub mod compose;
pub mod phase;
pub mod prompt;
pub mod render;
pub mod unit;
pub mod units;

pub use answers::{AnswerValue, Answers};
pub use compose::{compose, ComposeError, ExecutionPlan, RunReport, Runner};
pub use phase::Phase;
pub use prompt::{DefaultsPrompter, Prompter, Question, QuestionKind};
pub use render::{RenderError, TemplateRenderer};
pub use unit::{GeneratorUnit, UnitContext, UnitId, UnitRef, UnitState};
