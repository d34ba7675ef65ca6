//! Domain types - run configuration, iteration outcomes, and lifecycle events.

pub mod event;
pub mod outcome;
pub mod run;

pub use event::{EventSender, RunEvent, Stage, StageStatus};
pub use outcome::{DelegatedTask, DelegationBatchResult, IterationOutcome};
pub use run::{RunConfig, RunReport, RunState, RunSummary};
