//! The full project composition root.

use scm::ResourceClient;

use crate::unit::{GeneratorUnit, UnitId, UnitRef};
use crate::units::{GitInitUnit, GithubOptions, GithubUnit, GitignoreUnit, ReadmeUnit};

/// Composes everything a new project needs: local starter files, the
/// remote repository, and an initial commit.
///
/// The unit itself has no phase behavior; it exists to pull the others in.
pub struct ProjectUnit<C> {
    client: C,
    project_name: String,
    options: GithubOptions,
    gitignore_extra: Vec<String>,
}

impl<C> ProjectUnit<C> {
    pub fn new(client: C, project_name: impl Into<String>, options: GithubOptions) -> Self {
        Self {
            client,
            project_name: project_name.into(),
            options,
            gitignore_extra: Vec::new(),
        }
    }

    /// Extra ignore patterns appended to the generated `.gitignore`.
    #[must_use]
    pub fn with_gitignore_extra(mut self, extra: Vec<String>) -> Self {
        self.gitignore_extra = extra;
        self
    }
}

impl<C: ResourceClient + Clone + 'static> GeneratorUnit for ProjectUnit<C> {
    fn id(&self) -> UnitId {
        UnitId::new("project")
    }

    fn compose(&self) -> Vec<UnitRef> {
        let mut github = self.options.clone();
        if github.default_name.is_empty() {
            github.default_name = self.project_name.clone();
        }

        vec![
            Box::new(GitignoreUnit::new().with_extra(self.gitignore_extra.clone())),
            Box::new(ReadmeUnit::new(self.project_name.clone())),
            Box::new(GithubUnit::new(self.client.clone(), github.clone())),
            Box::new(GitInitUnit::new().with_initial_branch(github.branch.clone())),
        ]
    }
}
