//! Agent client boundary - the contract with the external coding agent.
//!
//! The agent is an opaque subprocess: one instruction in, captured output
//! (and maybe an error) out. Nothing above this module knows how the agent
//! does its work.

pub mod client;
pub mod process;

pub use client::{AgentClient, AgentInvocation, MockAgentClient, RecordedInvocation};
pub use process::{AgentOptions, ProcessAgentClient};
