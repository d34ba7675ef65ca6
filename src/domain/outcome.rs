//! Iteration outcome and delegation result types.

use serde::{Deserialize, Serialize};

use crate::agent::AgentInvocation;

/// One record per completed iteration.
///
/// Produced exactly once by the controller, appended to the run history,
/// and never mutated afterwards. Failures live here as data; the run loop
/// itself does not error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationOutcome {
    /// Iteration index, 1-based
    pub iteration: u32,

    /// Whether the iteration's work succeeded
    pub success: bool,

    /// Captured output text (combined text on the delegated path)
    pub output: String,

    /// Error text when the iteration failed
    pub error: Option<String>,

    /// Whether the run should end after this iteration
    pub should_stop: bool,
}

/// One planned sub-task of a delegated iteration.
///
/// The position is significant only for presenting results in the merge
/// instruction; execution order is unconstrained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegatedTask {
    /// Position in the planned list, 0-based
    pub index: usize,

    /// Self-contained task description handed to the agent
    pub description: String,
}

impl DelegatedTask {
    pub fn new(index: usize, description: impl Into<String>) -> Self {
        Self {
            index,
            description: description.into(),
        }
    }
}

/// Per-task results of one delegated batch, indexed by original task position.
#[derive(Debug, Clone, Default)]
pub struct DelegationBatchResult {
    results: Vec<AgentInvocation>,
}

impl DelegationBatchResult {
    pub fn new(results: Vec<AgentInvocation>) -> Self {
        Self { results }
    }

    /// Per-task invocations, in original task order
    pub fn results(&self) -> &[AgentInvocation] {
        &self.results
    }

    /// Every task's output, in original task order
    pub fn outputs(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.output.as_str()).collect()
    }

    /// Errors from failed tasks only, order-preserving by task index
    pub fn errors(&self) -> Vec<&str> {
        self.results.iter().filter_map(|r| r.error.as_deref()).collect()
    }

    pub fn error_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_error()).count()
    }

    /// True when no task errored
    pub fn is_clean(&self) -> bool {
        self.error_count() == 0
    }

    /// All outputs joined for the combined iteration text
    pub fn combined_output(&self) -> String {
        self.outputs().join("\n\n")
    }

    /// Newline-joined error list, or `None` when the batch is clean
    pub fn joined_errors(&self) -> Option<String> {
        let errors = self.errors();
        if errors.is_empty() { None } else { Some(errors.join("\n")) }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
