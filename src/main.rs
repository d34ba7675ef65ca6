use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod cli;

use cli::Cli;
use drover::agent::{AgentOptions, ProcessAgentClient};
use drover::config::Config;
use drover::domain::{EventSender, RunConfig};
use drover::loops::IterationController;
use drover::prompt;
use drover::report::ConsoleReporter;

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("drover")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("drover.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

async fn run_application(cli: Cli, config: &Config) -> Result<()> {
    if cli.verbose {
        println!("{}", "Verbose mode enabled".yellow());
    }

    let instruction = prompt::load_instruction(cli.prompt.clone(), cli.prompt_file.as_deref())
        .context("Failed to load instruction")?;

    let run_config = RunConfig {
        instruction,
        max_iterations: cli.max_iterations,
        stop_condition: cli.stop.clone(),
        model: cli.model.clone(),
        skip_review: cli.skip_review,
        continue_on_error: cli.continue_on_error,
        delegate: cli.delegate,
        verbose: cli.verbose,
    };

    let work_dir = match cli.work_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to resolve working directory")?,
    };

    let options = AgentOptions {
        command: config.agent.command.clone(),
        work_dir,
        model: run_config.model.clone(),
        auto_compact: config.agent.auto_compact,
        timeout: Duration::from_millis(config.agent.timeout_ms),
        extra_args: config.agent.extra_args.clone(),
    };

    let client = Arc::new(ProcessAgentClient::new(options));

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let reporter = ConsoleReporter::new(cli.verbose);
    let reporter_handle = tokio::spawn(reporter.drain(rx));

    let controller = IterationController::with_events(client, run_config, EventSender::new(tx));
    let report = controller.run().await;

    // The controller dropped its sender; let the reporter flush the tail
    reporter_handle.await.ok();

    info!(
        "run ended in state {:?} after {} iteration(s)",
        report.state,
        report.outcomes.len()
    );

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("Starting with config from: {:?}", cli.config);

    run_application(cli, &config).await.context("Run failed")?;

    Ok(())
}
