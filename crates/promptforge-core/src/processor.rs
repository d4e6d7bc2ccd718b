//! Decomposition/combination pipeline.
//!
//! One `process` call walks: cache check, decompose, fan-out subtask
//! generation behind an ordered barrier, combine, cache insert. Execution
//! and repair are separate opt-in stages (see [`synthesis`](crate::synthesis)
//! and [`repair`](crate::repair)) driven by the caller.

use std::sync::Arc;

use chrono::Utc;
use promptforge_llm::ChatGateway;

use crate::cache::ResultCache;
use crate::error::Result;
use crate::prompts;
use crate::types::{Complexity, ProcessingResult, SubtaskResult};

pub struct PromptProcessor {
    gateway: Arc<dyn ChatGateway>,
    cache: Arc<ResultCache>,
}

impl std::fmt::Debug for PromptProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptProcessor")
            .field("cached_results", &self.cache.len())
            .finish()
    }
}

impl PromptProcessor {
    pub fn new(gateway: Arc<dyn ChatGateway>) -> Self {
        Self::with_cache(gateway, Arc::new(ResultCache::new()))
    }

    /// Builds a processor around an externally owned cache, so callers and
    /// tests can observe or pre-seed it.
    pub fn with_cache(gateway: Arc<dyn ChatGateway>, cache: Arc<ResultCache>) -> Self {
        Self { gateway, cache }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Decomposes the prompt, generates code per subtask, and combines the
    /// results into one script.
    ///
    /// A cache hit short-circuits and returns the frozen snapshot of the
    /// original call, its `processing_time` included. Decomposition never
    /// fails (it degrades to the whole prompt as a single subtask); a
    /// gateway failure during subtask generation or combination fails the
    /// whole call with no partial result and no cache write.
    pub async fn process(
        &self,
        prompt: &str,
        complexity: Complexity,
    ) -> Result<Arc<ProcessingResult>> {
        tracing::debug!(
            "processing prompt (complexity {complexity}): {:.100}...",
            prompt.replace('\n', " ")
        );

        if let Some(cached) = self.cache.get(prompt, complexity) {
            tracing::debug!("cache hit");
            return Ok(cached);
        }

        let start = Utc::now();

        let subtasks = self.gateway.decompose(prompt, complexity.level()).await;

        let subtask_results = self.generate_subtasks(&subtasks).await?;

        tracing::debug!("combining {} subtask results", subtask_results.len());
        let combination = prompts::combination_prompt(prompt, &subtask_results, complexity)?;
        let final_result = self
            .gateway
            .generate(&combination, prompts::COMBINE_SYSTEM_PROMPT)
            .await?;

        let result = Arc::new(ProcessingResult {
            original_prompt: prompt.to_string(),
            complexity_level: complexity,
            processing_time: format_elapsed(Utc::now() - start),
            subtask_results,
            final_result,
        });

        self.cache.insert(prompt, complexity, Arc::clone(&result));
        Ok(result)
    }

    /// Fan-out/fan-in stage: one gateway call per subtask, dispatched
    /// concurrently, collected behind an ordered barrier so the result
    /// sequence matches subtask-submission order regardless of completion
    /// order. Any single failure fails the stage.
    async fn generate_subtasks(&self, subtasks: &[String]) -> Result<Vec<SubtaskResult>> {
        let total = subtasks.len();
        let generations = subtasks.iter().enumerate().map(|(i, subtask)| async move {
            tracing::debug!("processing subtask {}/{}: {:.100}...", i + 1, total, subtask);
            let result = self
                .gateway
                .generate(subtask, prompts::SUBTASK_SYSTEM_PROMPT)
                .await?;
            Ok(SubtaskResult {
                task: subtask.clone(),
                result,
            })
        });

        futures::future::try_join_all(generations).await
    }
}

/// Formats elapsed wall-clock time as a short duration string, e.g. `1.042s`.
fn format_elapsed(elapsed: chrono::Duration) -> String {
    let millis = elapsed.num_milliseconds().max(0);
    format!("{}.{:03}s", millis / 1000, millis % 1000)
}
