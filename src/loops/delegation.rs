//! Concurrent execution of delegated tasks and result merging.
//!
//! Fan-out/fan-in: one spawned task per delegated sub-task, joined with a
//! wait-all barrier. No cancellation - a failed task never aborts its
//! siblings - and no shared mutable state between tasks.

use std::sync::Arc;

use futures::future::join_all;

use crate::agent::{AgentClient, AgentInvocation};
use crate::domain::{DelegatedTask, DelegationBatchResult};
use crate::prompt;

/// Model tier forced on every delegated sub-task.
///
/// Delegated sub-agents run unsupervised until merge, so they always get the
/// highest-capability tier regardless of the run's configured model. This is
/// the single call site where the override is applied.
pub const DELEGATED_TASK_MODEL: &str = "opus";

/// Run every task concurrently and collect results in original task order.
///
/// A panicked task is absorbed as that task's error entry; the batch always
/// resolves with one result per task.
pub async fn run_tasks(client: Arc<dyn AgentClient>, tasks: &[DelegatedTask]) -> DelegationBatchResult {
    tracing::debug!(task_count = tasks.len(), "launching delegated tasks");

    let handles: Vec<_> = tasks
        .iter()
        .map(|task| {
            let client = Arc::clone(&client);
            let description = task.description.clone();
            tokio::spawn(async move { client.invoke_with_model(&description, Some(DELEGATED_TASK_MODEL)).await })
        })
        .collect();

    // join_all preserves handle order, so results line up with task indices
    // no matter which task finishes first
    let results = join_all(handles)
        .await
        .into_iter()
        .map(|joined| match joined {
            Ok(invocation) => invocation,
            Err(e) => AgentInvocation::failure(String::new(), format!("delegated task panicked: {e}")),
        })
        .collect();

    let batch = DelegationBatchResult::new(results);
    if !batch.is_clean() {
        tracing::warn!(
            failed = batch.error_count(),
            total = batch.len(),
            "delegated batch completed with errors"
        );
    }
    batch
}

/// Ask the agent for one cohesive synthesis of the batch results.
///
/// Exactly one invocation with the run-configured model, returned unchanged;
/// no retry.
pub async fn merge(client: &dyn AgentClient, tasks: &[DelegatedTask], batch: &DelegationBatchResult) -> AgentInvocation {
    let instruction = prompt::merge_instruction(tasks, &batch.outputs());
    client.invoke(&instruction).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::MockAgentClient;
    use async_trait::async_trait;
    use std::time::Duration;

    fn tasks(descriptions: &[&str]) -> Vec<DelegatedTask> {
        descriptions
            .iter()
            .enumerate()
            .map(|(i, d)| DelegatedTask::new(i, *d))
            .collect()
    }

    /// Client whose first task is slow, to exercise out-of-order completion.
    struct SlowFirstClient;

    #[async_trait]
    impl AgentClient for SlowFirstClient {
        async fn invoke_with_model(&self, instruction: &str, _model: Option<&str>) -> AgentInvocation {
            if instruction == "alpha" {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            AgentInvocation::success(format!("done: {instruction}"))
        }
    }

    #[tokio::test]
    async fn test_results_in_task_order_despite_completion_order() {
        let client: Arc<dyn AgentClient> = Arc::new(SlowFirstClient);
        let tasks = tasks(&["alpha", "beta", "gamma"]);

        let batch = run_tasks(client, &tasks).await;

        assert_eq!(batch.outputs(), vec!["done: alpha", "done: beta", "done: gamma"]);
    }

    #[tokio::test]
    async fn test_middle_failure_does_not_cancel_siblings() {
        let client = Arc::new(MockAgentClient::with_responder(|instruction, _| {
            if instruction == "second" {
                AgentInvocation::failure("", "second task failed")
            } else {
                AgentInvocation::success(format!("ok: {instruction}"))
            }
        }));
        let tasks = tasks(&["first", "second", "third"]);

        let batch = run_tasks(client.clone(), &tasks).await;

        assert_eq!(batch.len(), 3);
        assert_eq!(batch.outputs(), vec!["ok: first", "", "ok: third"]);
        assert_eq!(batch.errors(), vec!["second task failed"]);
        assert!(!batch.is_clean());
        // every task ran to completion
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_every_task_forces_the_delegation_tier() {
        let client = Arc::new(MockAgentClient::with_responder(|_, _| AgentInvocation::success("ok")));
        let tasks = tasks(&["a", "b"]);

        run_tasks(client.clone(), &tasks).await;

        let calls = client.calls();
        assert_eq!(calls.len(), 2);
        for call in calls {
            assert_eq!(call.model_override.as_deref(), Some(DELEGATED_TASK_MODEL));
        }
    }

    #[tokio::test]
    async fn test_empty_task_list_resolves_to_empty_batch() {
        let client = Arc::new(MockAgentClient::new(vec![]));
        let batch = run_tasks(client.clone(), &[]).await;

        assert!(batch.is_empty());
        assert!(batch.is_clean());
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_merge_is_one_invocation_with_run_model() {
        let client = MockAgentClient::new(vec![AgentInvocation::success("merged summary")]);
        let tasks = tasks(&["Add tests", "Fix bug"]);
        let batch = DelegationBatchResult::new(vec![
            AgentInvocation::success("tests added"),
            AgentInvocation::success("bug fixed"),
        ]);

        let result = merge(&client, &tasks, &batch).await;

        assert_eq!(result.output, "merged summary");
        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        // the merge uses the run-configured model, not the delegation tier
        assert_eq!(calls[0].model_override, None);
        assert!(calls[0].instruction.contains("Task 1: Add tests"));
        assert!(calls[0].instruction.contains("bug fixed"));
    }

    #[tokio::test]
    async fn test_merge_error_returned_unchanged() {
        let client = MockAgentClient::new(vec![AgentInvocation::failure("partial", "merge broke")]);
        let tasks = tasks(&["only"]);
        let batch = DelegationBatchResult::new(vec![AgentInvocation::success("done")]);

        let result = merge(&client, &tasks, &batch).await;

        assert_eq!(result.output, "partial");
        assert_eq!(result.error.as_deref(), Some("merge broke"));
        // no retry
        assert_eq!(client.call_count(), 1);
    }
}
