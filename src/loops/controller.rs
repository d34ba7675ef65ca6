//! The iteration controller - owns the run state machine.
//!
//! Drives the agent through at most `max_iterations` iterations, choosing
//! between the plain path (one main invocation plus an advisory review pass)
//! and, for iteration 1 only, the delegated path (plan, fan out, merge).
//! Failures are recorded as outcome data; `run` never errors.

use std::sync::Arc;

use chrono::Utc;

use crate::agent::AgentClient;
use crate::domain::{
    EventSender, IterationOutcome, RunConfig, RunEvent, RunReport, RunState, RunSummary, Stage, StageStatus,
};
use crate::prompt;

use super::delegation;
use super::planner;
use super::stop::StopCondition;

/// Runs one bounded iteration loop against an agent client.
///
/// Iterations are strictly sequential: iteration `i + 1` never starts before
/// iteration `i`'s outcome, including all of its delegated sub-tasks, is
/// fully resolved. Only work inside a delegated iteration runs concurrently.
pub struct IterationController {
    client: Arc<dyn AgentClient>,
    config: RunConfig,
    stop: StopCondition,
    events: EventSender,
}

impl IterationController {
    pub fn new(client: Arc<dyn AgentClient>, config: RunConfig) -> Self {
        Self::with_events(client, config, EventSender::disabled())
    }

    pub fn with_events(client: Arc<dyn AgentClient>, config: RunConfig, events: EventSender) -> Self {
        let stop = StopCondition::new(config.stop_condition.clone());
        Self {
            client,
            config,
            stop,
            events,
        }
    }

    /// Run the loop to completion and report every iteration's outcome.
    ///
    /// Transitions: `Idle -> Running(i) -> { Stopped, Exhausted }`. The loop
    /// ends early only when an outcome asks to stop; otherwise it uses the
    /// full iteration budget and ends `Exhausted`.
    pub async fn run(self) -> RunReport {
        let started_at = Utc::now();
        self.events.emit(RunEvent::RunStarted {
            config: self.config.clone(),
        });

        let mut outcomes: Vec<IterationOutcome> = Vec::new();
        let mut state = RunState::Idle;

        for iteration in 1..=self.config.max_iterations {
            state = RunState::Running(iteration);
            self.events.emit(RunEvent::IterationStarted {
                iteration,
                max_iterations: self.config.max_iterations,
            });
            log::info!("iteration {}/{} starting", iteration, self.config.max_iterations);

            // Delegation is a one-shot kick-off strategy, not a per-iteration mode
            let outcome = if self.config.delegate && iteration == 1 {
                self.run_delegated_iteration(iteration).await
            } else {
                self.run_plain_iteration(iteration).await
            };

            let should_stop = outcome.should_stop;
            self.events.emit(RunEvent::IterationCompleted {
                outcome: outcome.clone(),
            });
            outcomes.push(outcome);

            if should_stop {
                state = RunState::Stopped;
                break;
            }
        }

        if state != RunState::Stopped {
            state = RunState::Exhausted;
        }

        let summary = RunSummary::from_outcomes(&outcomes);
        log::info!(
            "run finished: {} iterations, {} succeeded, {} failed",
            summary.total,
            summary.succeeded,
            summary.failed
        );
        self.events.emit(RunEvent::RunCompleted { summary });

        RunReport {
            started_at,
            finished_at: Utc::now(),
            state,
            outcomes,
            summary,
        }
    }

    /// One plain iteration: main invocation, optional review pass, stop check.
    ///
    /// The stop condition is evaluated against the main call's output only;
    /// review output is excluded.
    async fn run_plain_iteration(&self, iteration: u32) -> IterationOutcome {
        self.events.emit(RunEvent::StageStarted {
            iteration,
            stage: Stage::Main,
        });

        let main = self.client.invoke(&self.config.instruction).await;

        if let Some(error) = main.error {
            self.events.emit(RunEvent::StageFinished {
                iteration,
                stage: Stage::Main,
                status: StageStatus::Failed,
                detail: Some(error.clone()),
            });
            log::warn!("iteration {iteration} main invocation failed: {error}");

            return IterationOutcome {
                iteration,
                success: false,
                output: main.output,
                error: Some(error),
                should_stop: !self.config.continue_on_error,
            };
        }

        self.events.emit(RunEvent::StageFinished {
            iteration,
            stage: Stage::Main,
            status: StageStatus::Succeeded,
            detail: None,
        });

        if !self.config.skip_review {
            self.run_review_pass(iteration).await;
        }

        let should_stop = self.stop.matches(&main.output);

        IterationOutcome {
            iteration,
            success: true,
            output: main.output,
            error: None,
            should_stop,
        }
    }

    /// One delegated iteration: plan, parse, fan out, merge, aggregate.
    ///
    /// A planning failure is fatal for the run. Task failures are collected
    /// per task; the merge and review stages are advisory. The stop condition
    /// is evaluated against the full combined text, unlike the plain path.
    async fn run_delegated_iteration(&self, iteration: u32) -> IterationOutcome {
        self.events.emit(RunEvent::StageStarted {
            iteration,
            stage: Stage::Planning,
        });

        let planning = self.client.invoke(&prompt::planning_instruction(&self.config.instruction)).await;

        if let Some(error) = planning.error {
            self.events.emit(RunEvent::StageFinished {
                iteration,
                stage: Stage::Planning,
                status: StageStatus::Failed,
                detail: Some(error.clone()),
            });
            log::warn!("delegation planning failed: {error}");

            return IterationOutcome {
                iteration,
                success: false,
                output: planning.output,
                error: Some(error),
                should_stop: true,
            };
        }

        self.events.emit(RunEvent::StageFinished {
            iteration,
            stage: Stage::Planning,
            status: StageStatus::Succeeded,
            detail: None,
        });

        let tasks = planner::plan_tasks(&planning.output, &self.config.instruction);
        self.events.emit(RunEvent::TasksPlanned {
            iteration,
            count: tasks.len(),
        });
        log::info!("delegating {} tasks", tasks.len());

        self.events.emit(RunEvent::StageStarted {
            iteration,
            stage: Stage::Execution,
        });
        let batch = delegation::run_tasks(Arc::clone(&self.client), &tasks).await;
        self.events.emit(RunEvent::StageFinished {
            iteration,
            stage: Stage::Execution,
            status: if batch.is_clean() {
                StageStatus::Succeeded
            } else {
                StageStatus::Warned
            },
            detail: (!batch.is_clean()).then(|| format!("{} of {} tasks failed", batch.error_count(), batch.len())),
        });

        self.events.emit(RunEvent::StageStarted {
            iteration,
            stage: Stage::Merge,
        });
        let merge = delegation::merge(self.client.as_ref(), &tasks, &batch).await;
        match &merge.error {
            Some(error) => {
                log::warn!("merge completed with issues: {error}");
                self.events.emit(RunEvent::StageFinished {
                    iteration,
                    stage: Stage::Merge,
                    status: StageStatus::Warned,
                    detail: Some(error.clone()),
                });
            }
            None => self.events.emit(RunEvent::StageFinished {
                iteration,
                stage: Stage::Merge,
                status: StageStatus::Succeeded,
                detail: None,
            }),
        }

        if !self.config.skip_review {
            self.run_review_pass(iteration).await;
        }

        let output = format!(
            "Planning:\n{}\n\nExecution:\n{}\n\nMerge:\n{}",
            planning.output,
            batch.combined_output(),
            merge.output
        );
        let error = batch.joined_errors();
        let success = error.is_none();
        let should_stop = self.stop.matches(&output);

        IterationOutcome {
            iteration,
            success,
            output,
            error,
            should_stop,
        }
    }

    /// Advisory review pass. Errors are reported and dropped - they never
    /// change an iteration's outcome.
    async fn run_review_pass(&self, iteration: u32) {
        self.events.emit(RunEvent::StageStarted {
            iteration,
            stage: Stage::Review,
        });

        let review = self.client.invoke(prompt::REVIEW_INSTRUCTION).await;

        match review.error {
            Some(error) => {
                log::warn!("review pass encountered issues (continuing): {error}");
                self.events.emit(RunEvent::StageFinished {
                    iteration,
                    stage: Stage::Review,
                    status: StageStatus::Warned,
                    detail: Some(error),
                });
            }
            None => self.events.emit(RunEvent::StageFinished {
                iteration,
                stage: Stage::Review,
                status: StageStatus::Succeeded,
                detail: None,
            }),
        }
    }
}
