//! Console rendering of run events.
//!
//! Everything a user sees during a run is produced here, from the event
//! stream the controller emits. The control loop never touches the console.

use colored::*;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::domain::{RunConfig, RunEvent, RunSummary, Stage, StageStatus};

const SEPARATOR_WIDTH: usize = 60;

/// Renders run events to stdout with colored text.
pub struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Drain the event channel until the controller drops its sender.
    pub async fn drain(self, mut rx: UnboundedReceiver<RunEvent>) {
        while let Some(event) = rx.recv().await {
            self.render(&event);
        }
    }

    pub fn render(&self, event: &RunEvent) {
        match event {
            RunEvent::RunStarted { config } => self.print_banner(config),
            RunEvent::IterationStarted {
                iteration,
                max_iterations,
            } => {
                println!("\n{}", "═".repeat(SEPARATOR_WIDTH).blue().bold());
                println!("{}", format!("Iteration {}/{}", iteration, max_iterations).yellow().bold());
                println!("{}\n", "═".repeat(SEPARATOR_WIDTH).blue().bold());
            }
            RunEvent::StageStarted { stage, .. } => {
                println!("{}", format!("Running {}...", stage.label()).cyan());
            }
            RunEvent::StageFinished { stage, status, detail, .. } => {
                self.print_stage_result(*stage, *status, detail.as_deref());
            }
            RunEvent::TasksPlanned { count, .. } => {
                println!("{}", format!("Identified {} parallel task(s)", count).cyan());
            }
            RunEvent::IterationCompleted { outcome } => {
                if outcome.should_stop {
                    if outcome.success {
                        println!(
                            "\n{}\n{}",
                            "Stop condition met!".green().bold(),
                            format!("Stopped at iteration {}", outcome.iteration).white()
                        );
                    } else {
                        println!(
                            "\n{}\n{}",
                            "Stopping: iteration failed".red().bold(),
                            format!("Stopped at iteration {}", outcome.iteration).white()
                        );
                    }
                } else {
                    println!("\n{}\n", "─".repeat(SEPARATOR_WIDTH).dimmed());
                }
            }
            RunEvent::RunCompleted { summary } => self.print_summary(summary),
        }
    }

    fn print_banner(&self, config: &RunConfig) {
        println!("{}", "═".repeat(SEPARATOR_WIDTH).magenta().bold());
        println!("{}", "Drover".magenta().bold());
        println!(
            "{} {}",
            "Prompt:".cyan(),
            preview(&config.instruction, 100).white()
        );
        println!("{} {}", "Max Iterations:".cyan(), config.max_iterations.to_string().white());

        if let Some(model) = &config.model {
            println!("{} {}", "Model:".cyan(), model.white());
        }
        if let Some(stop) = &config.stop_condition {
            println!("{} {}", "Stop Condition:".cyan(), stop.white());
        }
        if config.skip_review {
            println!("{} {}", "Review Pass:".cyan(), "Disabled".white());
        }
        if config.continue_on_error {
            println!("{} {}", "Continue on Error:".cyan(), "Yes".white());
        }
        if config.delegate {
            println!("{} {}", "Delegation:".cyan(), "Enabled".white());
        }
        println!("{}", "═".repeat(SEPARATOR_WIDTH).magenta().bold());
    }

    fn print_stage_result(&self, stage: Stage, status: StageStatus, detail: Option<&str>) {
        match status {
            StageStatus::Succeeded => {
                println!("{}", format!("{} completed", capitalize(stage.label())).green());
            }
            StageStatus::Failed => {
                println!("{}", format!("{} failed", capitalize(stage.label())).red());
                if let Some(detail) = detail {
                    println!("{}", format!("  {}", detail).red().dimmed());
                }
            }
            StageStatus::Warned => {
                println!(
                    "{}",
                    format!("{} encountered issues (continuing anyway)", capitalize(stage.label())).yellow()
                );
                if self.verbose
                    && let Some(detail) = detail
                {
                    println!("{}", format!("  {}", detail).yellow().dimmed());
                }
            }
        }
    }

    fn print_summary(&self, summary: &RunSummary) {
        println!("\n{}", "═".repeat(SEPARATOR_WIDTH).cyan().bold());
        println!("{}", "Summary".cyan().bold());
        println!("{} {}", "Total Iterations:".white(), summary.total);
        println!("{} {}", "Successful:".green(), summary.succeeded);
        println!("{} {}", "Failed:".red(), summary.failed);
        println!("{}", "═".repeat(SEPARATOR_WIDTH).cyan().bold());
    }
}

/// First `max` characters of `text`, with an ellipsis when truncated.
fn preview(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
