//! The generator unit contract.
//!
//! A unit declares an identity, the sub-units it composes, the questions it
//! wants answered, and a behavior per phase. Phase defaults are no-ops, so
//! implementations override only the phases they need. Units are plain
//! values composed by containment; there is no registry and no inheritance.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

use crate::answers::Answers;
use crate::phase::Phase;
use crate::prompt::Question;
use crate::render::TemplateRenderer;

/// Identity of a generator unit.
///
/// Units with equal ids are the same unit: flattening keeps the first
/// encounter and drops the rest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(String);

impl UnitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UnitId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Lifecycle of a unit within one run. Transitions are monotonic: a unit
/// never returns to an earlier state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitState {
    /// Flattened into the plan; no phase has run yet.
    Composed,
    /// The given phase behavior is running or has run.
    Executing(Phase),
    /// Every phase has run.
    Complete,
}

/// Per-unit view of the run handed to each phase behavior.
pub struct UnitContext<'a> {
    /// Destination directory for generated files.
    pub dest: &'a Path,
    /// Shared template renderer.
    pub renderer: &'a TemplateRenderer,
    /// This unit's answers. Empty before prompting; immutable afterwards.
    pub answers: &'a Answers,
}

/// A composable generator.
#[async_trait]
pub trait GeneratorUnit: Send {
    /// Stable identity used for dedup during flattening.
    fn id(&self) -> UnitId;

    /// Sub-units composed into the run alongside this one.
    fn compose(&self) -> Vec<UnitRef> {
        Vec::new()
    }

    /// Questions this unit wants answered during the prompting phase.
    fn questions(&self) -> Vec<Question> {
        Vec::new()
    }

    /// Early setup, before any questions are asked.
    async fn initializing(&mut self, _cx: &UnitContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Derive configuration from the recorded answers.
    async fn configuring(&mut self, _cx: &UnitContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Render files and reconcile remote resources.
    async fn writing(&mut self, _cx: &UnitContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Post-write installers.
    async fn installing(&mut self, _cx: &UnitContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// Owned, type-erased unit.
pub type UnitRef = Box<dyn GeneratorUnit>;
