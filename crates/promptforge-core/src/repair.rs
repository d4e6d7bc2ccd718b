//! Repair-suggestion stage.
//!
//! When an executed script produced error-stream content, exactly one more
//! gateway call turns the failing source plus its captured error into a
//! human-readable fix proposal. The proposal is returned for display - there
//! is no automatic retry or patch application.

use promptforge_llm::ChatGateway;

use crate::error::Result;
use crate::prompts;

/// Asks the gateway for a fix suggestion for a failed script run.
pub async fn suggest_repair(
    gateway: &dyn ChatGateway,
    code: &str,
    error_output: &str,
) -> Result<String> {
    tracing::debug!("requesting repair suggestion for failing script");
    let prompt = prompts::repair_prompt(code, error_output);
    // The analysis call carries no system instruction, matching the free-form
    // nature of the expected answer.
    Ok(gateway.generate(&prompt, "").await?)
}
