//! CLI definition using clap.
//!
//! Exactly one instruction source is required: an inline prompt or a prompt
//! file. Everything else has a default. Run-level validation (iterations at
//! least 1) is enforced here so the controller never sees a zero budget.

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// Drover - run a coding agent in a loop until it gets there
#[derive(Parser, Debug)]
#[command(name = "drover")]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("instruction").required(true)))]
pub struct Cli {
    /// The prompt to run on every iteration
    #[arg(short, long, group = "instruction")]
    pub prompt: Option<String>,

    /// Read the prompt from a file instead
    #[arg(short = 'f', long, group = "instruction")]
    pub prompt_file: Option<PathBuf>,

    /// Maximum number of iterations
    #[arg(short, long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_iterations: u32,

    /// Stop early when this text appears in the agent output
    #[arg(short, long)]
    pub stop: Option<String>,

    /// Working directory for the agent
    #[arg(short = 'd', long)]
    pub work_dir: Option<PathBuf>,

    /// Model the agent should use
    #[arg(long)]
    pub model: Option<String>,

    /// Skip the review pass after each successful iteration
    #[arg(long)]
    pub skip_review: bool,

    /// Keep iterating when the main invocation fails
    #[arg(long)]
    pub continue_on_error: bool,

    /// Split the first iteration into concurrent delegated tasks
    #[arg(long)]
    pub delegate: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Optional config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
