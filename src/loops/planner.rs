//! Task-list extraction from planning output.
//!
//! The planner's output is free-form text that should contain a bracketed
//! JSON array of task strings somewhere inside it. Extraction is best-effort
//! scraping with one explicit fallback: any miss degrades to a single task
//! carrying the original instruction verbatim.

use crate::domain::DelegatedTask;

/// Resolve the delegated task list from the planning output.
///
/// Falls back to `[instruction]` when no bracketed list is found or the
/// bracketed text does not parse as a JSON array of strings. An empty
/// parsed array is a successful parse and stays empty.
pub fn plan_tasks(planning_output: &str, instruction: &str) -> Vec<DelegatedTask> {
    let descriptions = match extract_task_list(planning_output) {
        Some(tasks) => tasks,
        None => {
            log::warn!("could not parse a task list from planning output, falling back to a single task");
            vec![instruction.to_string()]
        }
    };

    descriptions
        .into_iter()
        .enumerate()
        .map(|(index, description)| DelegatedTask::new(index, description))
        .collect()
}

/// Extract the first bracketed list-looking substring and parse it.
///
/// Spans from the first `[` to the last `]`, mirroring a greedy match, so a
/// JSON array containing bracketed text inside its strings still parses.
fn extract_task_list(output: &str) -> Option<Vec<String>> {
    let start = output.find('[')?;
    let end = output.rfind(']')?;
    if end < start {
        return None;
    }
    serde_json::from_str::<Vec<String>>(&output[start..=end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_list_with_surrounding_text() {
        let output = r#"Here are tasks: ["Add tests", "Fix bug"] done"#;
        let tasks = plan_tasks(output, "original instruction");

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].description, "Add tests");
        assert_eq!(tasks[0].index, 0);
        assert_eq!(tasks[1].description, "Fix bug");
        assert_eq!(tasks[1].index, 1);
    }

    #[test]
    fn test_unparsable_output_falls_back_to_instruction() {
        let tasks = plan_tasks("no list here", "original instruction");

        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].description, "original instruction");
        assert_eq!(tasks[0].index, 0);
    }

    #[test]
    fn test_malformed_json_falls_back() {
        let tasks = plan_tasks(r#"almost: ["one", "two"#, "fallback");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].description, "fallback");
    }

    #[test]
    fn test_non_string_array_falls_back() {
        let tasks = plan_tasks("[1, 2, 3]", "fallback");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].description, "fallback");
    }

    #[test]
    fn test_greedy_span_tolerates_brackets_inside_strings() {
        let output = r#"plan: ["refactor [core]", "update docs"]"#;
        let tasks = plan_tasks(output, "fallback");

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].description, "refactor [core]");
    }

    #[test]
    fn test_multiline_array() {
        let output = "Tasks:\n[\n  \"First task\",\n  \"Second task\",\n  \"Third task\"\n]\nEnd.";
        let tasks = plan_tasks(output, "fallback");
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[2].description, "Third task");
    }

    #[test]
    fn test_empty_array_is_a_successful_parse() {
        let tasks = plan_tasks("the plan is: []", "fallback");
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_closing_bracket_before_opening_falls_back() {
        let tasks = plan_tasks("] oops [", "fallback");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].description, "fallback");
    }

    #[test]
    fn test_extract_task_list_plain() {
        let tasks = extract_task_list(r#"["a", "b"]"#).unwrap();
        assert_eq!(tasks, vec!["a", "b"]);
    }
}
