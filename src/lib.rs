//! Drover - drives an external coding agent through bounded iterations
//!
//! Drover runs an opaque coding agent repeatedly with the same instruction,
//! stopping early when a configured stop condition appears in the output.
//! With delegation enabled, the first iteration is split into independent
//! sub-tasks that run concurrently and are merged back into one result.

pub mod agent;
pub mod config;
pub mod domain;
pub mod error;
pub mod loops;
pub mod prompt;
pub mod report;

pub use error::{DroverError, Result};
