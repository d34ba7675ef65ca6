//! Run lifecycle events.
//!
//! The controller publishes these instead of writing to the console;
//! presentation subscribes on the receiving end of an unbounded channel.
//! A dropped receiver is harmless - emission is fire-and-forget.

use tokio::sync::mpsc;

use super::outcome::IterationOutcome;
use super::run::{RunConfig, RunSummary};

/// A stage of one iteration's protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Main agent invocation of a plain iteration
    Main,
    /// Advisory review pass
    Review,
    /// Planning invocation of a delegated iteration
    Planning,
    /// Concurrent execution of delegated tasks
    Execution,
    /// Merge invocation over delegated results
    Merge,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Main => "agent",
            Stage::Review => "review pass",
            Stage::Planning => "planning",
            Stage::Execution => "delegated execution",
            Stage::Merge => "merge",
        }
    }
}

/// How a stage ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Succeeded,
    Failed,
    /// Finished with an advisory problem that does not affect the outcome
    Warned,
}

/// Structured lifecycle events emitted by the controller.
#[derive(Debug, Clone)]
pub enum RunEvent {
    RunStarted {
        config: RunConfig,
    },
    IterationStarted {
        iteration: u32,
        max_iterations: u32,
    },
    StageStarted {
        iteration: u32,
        stage: Stage,
    },
    StageFinished {
        iteration: u32,
        stage: Stage,
        status: StageStatus,
        detail: Option<String>,
    },
    TasksPlanned {
        iteration: u32,
        count: usize,
    },
    IterationCompleted {
        outcome: IterationOutcome,
    },
    RunCompleted {
        summary: RunSummary,
    },
}

/// Fire-and-forget sender for run events.
#[derive(Clone, Default)]
pub struct EventSender(Option<mpsc::UnboundedSender<RunEvent>>);

impl EventSender {
    pub fn new(tx: mpsc::UnboundedSender<RunEvent>) -> Self {
        Self(Some(tx))
    }

    /// A sender that drops every event (headless runs, tests)
    pub fn disabled() -> Self {
        Self(None)
    }

    pub fn emit(&self, event: RunEvent) {
        if let Some(tx) = &self.0 {
            // A closed receiver just means nobody is presenting this run
            let _ = tx.send(event);
        }
    }
}
