//! Composition and phased execution of generator units.
//!
//! [`compose`] flattens a set of root units and everything they pull in
//! into a single [`ExecutionPlan`]; [`Runner`] then drives the plan
//! through every [`Phase`], completing each phase for all units before
//! any unit enters the next one.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{debug, info};

use crate::answers::Answers;
use crate::phase::Phase;
use crate::prompt::{outstanding, Prompter};
use crate::render::TemplateRenderer;
use crate::unit::{GeneratorUnit, UnitContext, UnitId, UnitRef, UnitState};

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("generator composition cycle: {}", path.join(" -> "))]
    Cycle { path: Vec<String> },
}

/// Flattened, deduplicated unit sequence produced by [`compose`].
pub struct ExecutionPlan {
    units: Vec<UnitRef>,
}

impl std::fmt::Debug for ExecutionPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionPlan")
            .field("units", &self.ids())
            .finish()
    }
}

impl ExecutionPlan {
    /// Unit ids in execution order.
    #[must_use]
    pub fn ids(&self) -> Vec<UnitId> {
        self.units.iter().map(|unit| unit.id()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Flatten `roots` and their compositions into an execution plan.
///
/// Traversal is depth-first preorder: each unit lands in the plan before
/// the units it composes. A unit id encountered twice keeps its first
/// position; a unit that composes itself, directly or through
/// intermediaries, is a [`ComposeError::Cycle`].
pub fn compose(roots: Vec<UnitRef>) -> Result<ExecutionPlan, ComposeError> {
    let mut units = Vec::new();
    let mut seen = HashSet::new();
    let mut path = Vec::new();

    for root in roots {
        visit(root, &mut units, &mut seen, &mut path)?;
    }

    debug!(units = units.len(), "Composed execution plan");
    Ok(ExecutionPlan { units })
}

fn visit(
    unit: UnitRef,
    plan: &mut Vec<UnitRef>,
    seen: &mut HashSet<UnitId>,
    path: &mut Vec<UnitId>,
) -> Result<(), ComposeError> {
    let id = unit.id();

    // The cycle check must run before dedup: every unit on the current
    // path is also in `seen`, and a cycle reported as a duplicate would
    // vanish silently.
    if path.contains(&id) {
        let mut cycle: Vec<String> = path.iter().map(ToString::to_string).collect();
        cycle.push(id.to_string());
        return Err(ComposeError::Cycle { path: cycle });
    }
    if !seen.insert(id.clone()) {
        return Ok(());
    }

    let children = unit.compose();
    plan.push(unit);

    path.push(id);
    for child in children {
        visit(child, plan, seen, path)?;
    }
    path.pop();

    Ok(())
}

/// Outcome of a completed run.
#[derive(Debug)]
pub struct RunReport {
    /// Units executed, in plan order.
    pub units: Vec<UnitId>,
    /// Questions actually put to the prompter.
    pub questions_asked: usize,
    pub states: HashMap<UnitId, UnitState>,
}

impl RunReport {
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }
}

/// Drives an [`ExecutionPlan`] through all phases.
///
/// Execution aborts on the first unit error; partially applied work is
/// left in place for the caller to inspect or retry.
pub struct Runner {
    prompter: Box<dyn Prompter>,
    renderer: TemplateRenderer,
    dest: PathBuf,
    overrides: Answers,
}

impl Runner {
    pub fn new(dest: impl Into<PathBuf>, prompter: Box<dyn Prompter>) -> Self {
        Self {
            prompter,
            renderer: TemplateRenderer::new(),
            dest: dest.into(),
            overrides: Answers::new(),
        }
    }

    /// Pre-supplied answers. Questions whose keys appear here are never
    /// put to the prompter.
    #[must_use]
    pub fn with_overrides(mut self, overrides: Answers) -> Self {
        self.overrides = overrides;
        self
    }

    pub async fn run(&self, mut plan: ExecutionPlan) -> Result<RunReport> {
        let ids = plan.ids();
        info!(units = ids.len(), "Starting generator run");

        let mut states: HashMap<UnitId, UnitState> = ids
            .iter()
            .cloned()
            .map(|id| (id, UnitState::Composed))
            .collect();
        let mut answers: HashMap<UnitId, Answers> = HashMap::new();
        let mut questions_asked = 0usize;

        for phase in Phase::ALL {
            debug!(%phase, "Entering phase");
            for unit in &mut plan.units {
                let id = unit.id();
                states.insert(id.clone(), UnitState::Executing(phase));

                if phase == Phase::Prompting {
                    let collected = self
                        .collect_answers(unit.as_ref(), &mut questions_asked)
                        .with_context(|| format!("unit '{id}' failed during {phase}"))?;
                    answers.insert(id, collected);
                } else {
                    let empty = Answers::new();
                    let cx = UnitContext {
                        dest: &self.dest,
                        renderer: &self.renderer,
                        answers: answers.get(&id).unwrap_or(&empty),
                    };
                    run_phase(unit.as_mut(), phase, &cx)
                        .await
                        .with_context(|| format!("unit '{id}' failed during {phase}"))?;
                }
            }
        }

        for id in &ids {
            states.insert(id.clone(), UnitState::Complete);
        }
        info!(units = ids.len(), questions_asked, "Generator run complete");

        Ok(RunReport {
            units: ids,
            questions_asked,
            states,
        })
    }

    /// Resolve a unit's questions from overrides first, prompting only
    /// for what remains.
    fn collect_answers(&self, unit: &dyn GeneratorUnit, asked: &mut usize) -> Result<Answers> {
        let questions = unit.questions();
        let mut collected = Answers::new();

        for question in &questions {
            if let Some(value) = self.overrides.get(&question.key) {
                collected.insert(question.key.clone(), value.clone());
            }
        }

        let remaining = outstanding(&questions, &self.overrides);
        if !remaining.is_empty() {
            *asked += remaining.len();
            collected.merge(self.prompter.ask(&remaining)?);
        }

        Ok(collected)
    }
}

async fn run_phase(
    unit: &mut dyn GeneratorUnit,
    phase: Phase,
    cx: &UnitContext<'_>,
) -> Result<()> {
    match phase {
        Phase::Initializing => unit.initializing(cx).await,
        // Prompting is owned by the runner, not the unit.
        Phase::Prompting => Ok(()),
        Phase::Configuring => unit.configuring(cx).await,
        Phase::Writing => unit.writing(cx).await,
        Phase::Installing => unit.installing(cx).await,
    }
}
