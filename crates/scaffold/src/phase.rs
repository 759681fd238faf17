//! The closed set of run phases.
//!
//! Every unit in a run finishes a phase before any unit starts the next
//! one, so cross-unit ordering is total: plan order within a phase, phase
//! order across the run.

use serde::{Deserialize, Serialize};

/// One phase of a scaffolding run, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Early setup before any questions are asked.
    Initializing,
    /// Questions are collected and answered; driven by the scheduler.
    Prompting,
    /// Units derive configuration from their answers.
    Configuring,
    /// Files are rendered and remote resources reconciled.
    Writing,
    /// Post-write installers run (git init, dependency installs).
    Installing,
}

impl Phase {
    /// Every phase, in execution order.
    pub const ALL: [Phase; 5] = [
        Phase::Initializing,
        Phase::Prompting,
        Phase::Configuring,
        Phase::Writing,
        Phase::Installing,
    ];

    /// The phase after this one, if any.
    #[must_use]
    pub fn next(&self) -> Option<Phase> {
        match self {
            Self::Initializing => Some(Self::Prompting),
            Self::Prompting => Some(Self::Configuring),
            Self::Configuring => Some(Self::Writing),
            Self::Writing => Some(Self::Installing),
            Self::Installing => None,
        }
    }

    /// Human-readable description for progress display.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Initializing => "Initializing units",
            Self::Prompting => "Collecting answers",
            Self::Configuring => "Configuring units",
            Self::Writing => "Writing files and remote configuration",
            Self::Installing => "Running installers",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initializing => write!(f, "initializing"),
            Self::Prompting => write!(f, "prompting"),
            Self::Configuring => write!(f, "configuring"),
            Self::Writing => write!(f, "writing"),
            Self::Installing => write!(f, "installing"),
        }
    }
}
