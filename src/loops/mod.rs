//! The iteration control loop and its delegation logic.
//!
//! `IterationController` owns the run state machine; `planner`, `delegation`,
//! and `stop` are its leaves. Presentation stays outside - the controller
//! only emits `RunEvent`s.

pub mod controller;
pub mod delegation;
pub mod planner;
pub mod stop;

pub use controller::IterationController;
pub use stop::StopCondition;
