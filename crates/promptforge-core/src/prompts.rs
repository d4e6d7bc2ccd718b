//! Instruction texts sent to the model at each pipeline stage.
//!
//! Centralized so tests can assert on what the gateway was actually asked,
//! and so wording changes stay out of the control flow.

use crate::types::{Complexity, SubtaskResult};

/// System instruction for per-subtask code generation: code only, no prose.
pub const SUBTASK_SYSTEM_PROMPT: &str =
    "You are an expert Python developer. You will always write responses in valid Python code. \
     Do not include any explanations, comments, or additional text. Provide only the Python code. \
     Ensure that the code is self-contained and executable.";

/// System instruction for the combination stage.
pub const COMBINE_SYSTEM_PROMPT: &str =
    "You are an expert at synthesizing Python code into coherent, executable scripts. \
     Do not include any explanations or comments. Provide only the Python code. \
     Ensure that the final script is free of syntax errors and is ready to be executed. \
     If there are any issues with the combined script, provide detailed error messages \
     to assist in debugging.";

/// User instruction for the combination stage, embedding the full ordered
/// subtask result sequence. Serialization must not fail for these plain
/// string structs, but the error is propagated rather than papered over.
pub fn combination_prompt(
    original_prompt: &str,
    subtask_results: &[SubtaskResult],
    complexity: Complexity,
) -> serde_json::Result<String> {
    let serialized = serde_json::to_string_pretty(subtask_results)?;
    Ok(format!(
        "Original prompt: {original_prompt}\n\n\
         Combine the following subtask results into a coherent Python script:\n\
         {serialized}\n\n\
         Ensure that the combined script is well-structured, adheres to Python best practices, \
         and meets the specified complexity level of {complexity}."
    ))
}

/// Repair prompt embedding the full failing source and the full captured
/// error text. The suggestion it elicits is returned to the caller for
/// display, never applied automatically.
pub fn repair_prompt(code: &str, error_output: &str) -> String {
    format!(
        "The following Python script encountered an error during execution:\n\n\
         ```python\n\
         {code}\n\
         ```\n\n\
         Error Output:\n\
         ```\n\
         {error_output}\n\
         ```\n\n\
         Please analyze the error and provide suggestions to fix the script."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combination_prompt_embeds_results_in_order() {
        let results = vec![
            SubtaskResult {
                task: "first".into(),
                result: "a = 1".into(),
            },
            SubtaskResult {
                task: "second".into(),
                result: "b = 2".into(),
            },
        ];
        let prompt = combination_prompt("build it", &results, Complexity::new(2)).unwrap();

        assert!(prompt.contains("Original prompt: build it"));
        assert!(prompt.contains("complexity level of 2/5"));
        let first = prompt.find("first").unwrap();
        let second = prompt.find("second").unwrap();
        assert!(first < second);
    }

    #[test]
    fn repair_prompt_embeds_code_and_error_verbatim() {
        let prompt = repair_prompt("raise ValueError('x')", "Traceback: ValueError: x");
        assert!(prompt.contains("raise ValueError('x')"));
        assert!(prompt.contains("Traceback: ValueError: x"));
    }
}
