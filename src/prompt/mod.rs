//! Instruction loading and the fixed instruction texts.
//!
//! The run instruction comes from the CLI, either inline or from a file.
//! The planning directive, the merge synthesis instruction, and the review
//! instruction are fixed texts owned here so the control loop stays free of
//! prompt wording.

use std::fs;
use std::path::Path;

use crate::domain::DelegatedTask;
use crate::error::{DroverError, Result};

/// Fixed instruction for the advisory review pass.
pub const REVIEW_INSTRUCTION: &str = "Review the code you just changed and simplify it where appropriate. \
     Apply small, behavior-preserving simplifications directly and leave everything else alone.";

/// Resolve the run instruction from inline text or a file.
pub fn load_instruction(inline: Option<String>, file: Option<&Path>) -> Result<String> {
    let text = match (inline, file) {
        (Some(text), None) => text,
        (None, Some(path)) => fs::read_to_string(path)
            .map_err(|e| DroverError::Instruction(format!("failed to read {}: {}", path.display(), e)))?,
        (Some(_), Some(_)) => {
            return Err(DroverError::Instruction(
                "provide either an inline prompt or a prompt file, not both".to_string(),
            ));
        }
        (None, None) => {
            return Err(DroverError::Instruction(
                "no prompt given: use --prompt or --prompt-file".to_string(),
            ));
        }
    };

    if text.trim().is_empty() {
        return Err(DroverError::Instruction("prompt is empty".to_string()));
    }

    Ok(text)
}

/// Build the planning instruction for a delegated iteration.
///
/// Augments the run instruction with the fixed directive asking for 2-4
/// independent sub-tasks as a bracketed list of strings.
pub fn planning_instruction(instruction: &str) -> String {
    format!(
        "{instruction}\n\n\
         IMPORTANT: Break this work into 2-4 independent tasks that can run at the same time.\n\
         For each task, provide a clear, self-contained description with its goals and acceptance criteria.\n\n\
         Format your response as a JSON array of task description strings:\n\
         [\"First task description\", \"Second task description\"]\n\n\
         Every task must be executable on its own, without the others."
    )
}

/// Build the merge instruction presenting each task next to its result.
pub fn merge_instruction(tasks: &[DelegatedTask], outputs: &[&str]) -> String {
    let body = tasks
        .iter()
        .map(|task| {
            let output = outputs.get(task.index).copied().unwrap_or("");
            format!("Task {}: {}\n\nResult:\n{}", task.index + 1, task.description, output)
        })
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");

    format!(
        "The following tasks were executed concurrently:\n\n{body}\n\n\
         Review all results and produce a cohesive summary of what was accomplished."
    )
}
