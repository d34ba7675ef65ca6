//! Subprocess-backed agent client.
//!
//! Spawns the configured agent binary once per invocation, passes the
//! instruction on the command line, and captures stdout/stderr until the
//! process exits. A non-zero exit, a spawn failure, or a timeout all come
//! back as an error string on the invocation, never as a Rust error.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::client::{AgentClient, AgentInvocation};

/// Options for spawning the external agent process.
#[derive(Debug, Clone)]
pub struct AgentOptions {
    /// Agent binary to execute
    pub command: String,

    /// Working directory the agent operates in
    pub work_dir: PathBuf,

    /// Model passed to the agent when set
    pub model: Option<String>,

    /// Whether the agent may auto-compact its context
    pub auto_compact: bool,

    /// Wall-clock limit for one invocation
    pub timeout: Duration,

    /// Extra arguments appended verbatim to every invocation
    pub extra_args: Vec<String>,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            command: "claude".to_string(),
            work_dir: PathBuf::from("."),
            model: None,
            auto_compact: false,
            timeout: Duration::from_millis(300_000),
            extra_args: Vec::new(),
        }
    }
}

/// Agent client that runs each instruction as one subprocess invocation.
pub struct ProcessAgentClient {
    options: AgentOptions,
}

impl ProcessAgentClient {
    pub fn new(options: AgentOptions) -> Self {
        Self { options }
    }

    fn build_command(&self, instruction: &str, model_override: Option<&str>) -> Command {
        let mut cmd = Command::new(&self.options.command);
        cmd.arg("-m").arg(instruction);

        if !self.options.auto_compact {
            cmd.arg("--no-auto-compact");
        }

        let model = model_override.or(self.options.model.as_deref());
        if let Some(model) = model {
            cmd.arg("--model").arg(model);
        }

        cmd.args(&self.options.extra_args);
        cmd.current_dir(&self.options.work_dir);
        cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
        cmd
    }
}

#[async_trait]
impl AgentClient for ProcessAgentClient {
    async fn invoke_with_model(&self, instruction: &str, model_override: Option<&str>) -> AgentInvocation {
        let mut cmd = self.build_command(instruction, model_override);

        log::debug!(
            "invoking agent {} in {} ({} chars)",
            self.options.command,
            self.options.work_dir.display(),
            instruction.len()
        );

        let result = tokio::time::timeout(self.options.timeout, cmd.output()).await;

        let output = match result {
            Err(_) => {
                return AgentInvocation::failure(
                    String::new(),
                    format!("agent timed out after {}ms", self.options.timeout.as_millis()),
                );
            }
            Ok(Err(e)) => {
                return AgentInvocation::failure(
                    String::new(),
                    format!("failed to spawn agent {}: {}", self.options.command, e),
                );
            }
            Ok(Ok(output)) => output,
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

        if output.status.success() {
            log::debug!("agent invocation completed ({} bytes)", stdout.len());
            return AgentInvocation::success(stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let error = if stderr.trim().is_empty() {
            format!("agent exited with code {}", output.status.code().unwrap_or(-1))
        } else {
            stderr.trim_end().to_string()
        };

        log::warn!("agent invocation failed: {error}");
        AgentInvocation::failure(stdout, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    fn write_fake_agent(dir: &std::path::Path, body: &str) -> PathBuf {
        let path = dir.join("fake-agent.sh");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn options_for(script: &std::path::Path, work_dir: &std::path::Path) -> AgentOptions {
        AgentOptions {
            command: script.to_string_lossy().into_owned(),
            work_dir: work_dir.to_path_buf(),
            timeout: Duration::from_secs(5),
            ..AgentOptions::default()
        }
    }

    #[tokio::test]
    async fn test_successful_invocation_captures_stdout() {
        let dir = tempdir().unwrap();
        let script = write_fake_agent(dir.path(), "echo 'agent output'");
        let client = ProcessAgentClient::new(options_for(&script, dir.path()));

        let inv = client.invoke("do something").await;

        assert!(!inv.is_error());
        assert!(inv.output.contains("agent output"));
    }

    #[tokio::test]
    async fn test_nonzero_exit_surfaces_stderr() {
        let dir = tempdir().unwrap();
        let script = write_fake_agent(dir.path(), "echo 'partial'\necho 'it broke' >&2\nexit 3");
        let client = ProcessAgentClient::new(options_for(&script, dir.path()));

        let inv = client.invoke("do something").await;

        assert!(inv.is_error());
        assert!(inv.error.as_deref().unwrap().contains("it broke"));
        // stdout captured before the failure is still returned
        assert!(inv.output.contains("partial"));
    }

    #[tokio::test]
    async fn test_nonzero_exit_without_stderr_reports_code() {
        let dir = tempdir().unwrap();
        let script = write_fake_agent(dir.path(), "exit 7");
        let client = ProcessAgentClient::new(options_for(&script, dir.path()));

        let inv = client.invoke("do something").await;

        assert!(inv.error.as_deref().unwrap().contains("code 7"));
    }

    #[tokio::test]
    async fn test_spawn_failure_is_an_invocation_error() {
        let dir = tempdir().unwrap();
        let options = AgentOptions {
            command: "/nonexistent/agent-binary".to_string(),
            work_dir: dir.path().to_path_buf(),
            ..AgentOptions::default()
        };
        let client = ProcessAgentClient::new(options);

        let inv = client.invoke("do something").await;

        assert!(inv.is_error());
        assert!(inv.error.as_deref().unwrap().contains("failed to spawn"));
    }

    #[tokio::test]
    async fn test_timeout_is_an_invocation_error() {
        let dir = tempdir().unwrap();
        let script = write_fake_agent(dir.path(), "sleep 10");
        let mut options = options_for(&script, dir.path());
        options.timeout = Duration::from_millis(100);
        let client = ProcessAgentClient::new(options);

        let inv = client.invoke("do something").await;

        assert!(inv.is_error());
        assert!(inv.error.as_deref().unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_runs_in_configured_work_dir() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("marker.txt"), "found").unwrap();
        let script = write_fake_agent(dir.path(), "cat marker.txt");
        let client = ProcessAgentClient::new(options_for(&script, dir.path()));

        let inv = client.invoke("do something").await;

        assert!(inv.output.contains("found"));
    }

    #[tokio::test]
    async fn test_instruction_and_flags_are_passed() {
        let dir = tempdir().unwrap();
        // Echo all arguments so the test can observe the argv contract
        let script = write_fake_agent(dir.path(), "echo \"$@\"");
        let mut options = options_for(&script, dir.path());
        options.model = Some("sonnet".to_string());
        let client = ProcessAgentClient::new(options);

        let inv = client.invoke_with_model("fix the bug", Some("opus")).await;

        assert!(inv.output.contains("-m fix the bug"));
        assert!(inv.output.contains("--no-auto-compact"));
        // per-call override wins over the configured model
        assert!(inv.output.contains("--model opus"));
        assert!(!inv.output.contains("sonnet"));
    }

    #[tokio::test]
    async fn test_configured_model_used_without_override() {
        let dir = tempdir().unwrap();
        let script = write_fake_agent(dir.path(), "echo \"$@\"");
        let mut options = options_for(&script, dir.path());
        options.model = Some("sonnet".to_string());
        let client = ProcessAgentClient::new(options);

        let inv = client.invoke("fix the bug").await;

        assert!(inv.output.contains("--model sonnet"));
    }

    #[tokio::test]
    async fn test_auto_compact_suppresses_flag() {
        let dir = tempdir().unwrap();
        let script = write_fake_agent(dir.path(), "echo \"$@\"");
        let mut options = options_for(&script, dir.path());
        options.auto_compact = true;
        let client = ProcessAgentClient::new(options);

        let inv = client.invoke("go").await;

        assert!(!inv.output.contains("--no-auto-compact"));
    }

    #[tokio::test]
    async fn test_extra_args_appended() {
        let dir = tempdir().unwrap();
        let script = write_fake_agent(dir.path(), "echo \"$@\"");
        let mut options = options_for(&script, dir.path());
        options.extra_args = vec!["--plugin".to_string(), "reviewer".to_string()];
        let client = ProcessAgentClient::new(options);

        let inv = client.invoke("go").await;

        assert!(inv.output.contains("--plugin reviewer"));
    }
}
