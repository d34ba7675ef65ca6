//! Core agent client trait and invocation types.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

/// Result of one agent invocation.
///
/// The boundary never fails at the Rust level: an abnormal termination of
/// the agent process is surfaced as a non-empty `error`, with whatever
/// output was captured before it still present in `output`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentInvocation {
    /// Captured standard output, possibly partial on failure
    pub output: String,

    /// Error text when the invocation failed
    pub error: Option<String>,
}

impl AgentInvocation {
    /// A successful invocation with the given output
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            error: None,
        }
    }

    /// A failed invocation, keeping any output captured before the failure
    pub fn failure(output: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            error: Some(error.into()),
        }
    }

    /// Whether the invocation carried an error
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Stateless agent client - each invocation is an independent unit of work.
#[async_trait]
pub trait AgentClient: Send + Sync {
    /// Run one instruction with the client's configured model.
    async fn invoke(&self, instruction: &str) -> AgentInvocation {
        self.invoke_with_model(instruction, None).await
    }

    /// Run one instruction, optionally overriding the configured model.
    ///
    /// The override exists so the delegation boundary can force a specific
    /// tier for unsupervised sub-tasks; regular call sites pass `None`.
    async fn invoke_with_model(&self, instruction: &str, model_override: Option<&str>) -> AgentInvocation;
}

/// One call observed by [`MockAgentClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedInvocation {
    pub instruction: String,
    pub model_override: Option<String>,
}

type Responder = dyn Fn(&str, Option<&str>) -> AgentInvocation + Send + Sync;

/// Scripted agent client for tests.
///
/// Either replays a fixed script of responses in call order, or answers
/// through a responder closure keyed on the instruction text (useful when
/// concurrent calls make arrival order nondeterministic). An exhausted
/// script yields empty successful invocations.
pub struct MockAgentClient {
    script: Mutex<VecDeque<AgentInvocation>>,
    responder: Option<Box<Responder>>,
    calls: Mutex<Vec<RecordedInvocation>>,
}

impl MockAgentClient {
    /// Create a mock that replays `script` in call order
    pub fn new(script: Vec<AgentInvocation>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            responder: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that answers every call through `responder`
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&str, Option<&str>) -> AgentInvocation + Send + Sync + 'static,
    {
        Self {
            script: Mutex::new(VecDeque::new()),
            responder: Some(Box::new(responder)),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// All invocations observed so far, in arrival order
    pub fn calls(&self) -> Vec<RecordedInvocation> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of invocations observed so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl AgentClient for MockAgentClient {
    async fn invoke_with_model(&self, instruction: &str, model_override: Option<&str>) -> AgentInvocation {
        self.calls.lock().unwrap().push(RecordedInvocation {
            instruction: instruction.to_string(),
            model_override: model_override.map(str::to_string),
        });

        if let Some(responder) = &self.responder {
            return responder(instruction, model_override);
        }

        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| AgentInvocation::success(String::new()))
    }
}
