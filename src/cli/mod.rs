//! CLI module for drover - command-line interface definition.

pub mod commands;

pub use commands::Cli;
