//! Run-level configuration and result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::outcome::IterationOutcome;

/// Immutable per-run settings, created once at run start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Instruction text sent to the agent on every iteration
    pub instruction: String,

    /// Maximum number of iterations, at least 1
    pub max_iterations: u32,

    /// Optional text whose appearance in agent output ends the run early
    pub stop_condition: Option<String>,

    /// Optional model the agent should use
    pub model: Option<String>,

    /// Skip the advisory review pass after successful iterations
    pub skip_review: bool,

    /// Keep iterating when the main invocation fails
    pub continue_on_error: bool,

    /// Split the first iteration into concurrent delegated tasks
    pub delegate: bool,

    /// Verbose reporting
    pub verbose: bool,
}

impl RunConfig {
    /// A config with the given instruction and everything else at its default
    pub fn new(instruction: impl Into<String>, max_iterations: u32) -> Self {
        Self {
            instruction: instruction.into(),
            max_iterations,
            stop_condition: None,
            model: None,
            skip_review: false,
            continue_on_error: false,
            delegate: false,
            verbose: false,
        }
    }
}

/// Controller state over the life of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    /// No iteration has started yet
    Idle,
    /// Iteration `i` is in flight (1-based)
    Running(u32),
    /// The run ended early because an outcome asked to stop
    Stopped,
    /// The run used its full iteration budget
    Exhausted,
}

/// Derived counts over a run's outcome history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: &[IterationOutcome]) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.success).count();
        Self {
            total: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
        }
    }
}

/// Everything a finished run produced, in iteration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub state: RunState,
    pub outcomes: Vec<IterationOutcome>,
    pub summary: RunSummary,
}

impl RunReport {
    /// Whether the run ended on a stop condition rather than budget exhaustion
    pub fn stopped_early(&self) -> bool {
        self.state == RunState::Stopped
    }
}
