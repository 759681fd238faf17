//! Built-in generator units.

pub mod git;
pub mod github;
pub mod gitignore;
pub mod project;
pub mod readme;

pub use git::GitInitUnit;
pub use github::{GithubOptions, GithubUnit};
pub use gitignore::GitignoreUnit;
pub use project::ProjectUnit;
pub use readme::ReadmeUnit;
