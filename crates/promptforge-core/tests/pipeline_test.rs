//! Pipeline behavior tests against a scripted gateway fake.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use promptforge_core::{
    suggest_repair, Complexity, ExecutionOutcome, PromptProcessor, ResultCache,
};
use promptforge_llm::{ChatGateway, GenerationError};

/// Routes on the stage-specific system instruction and records every call.
struct FakeGateway {
    /// Raw reply to decomposition requests (pre-sanitizer).
    decomposition: String,
    /// Reply to the combination request.
    combined: String,
    /// Per-subtask artificial latency, keyed by subtask text.
    subtask_delays: HashMap<String, Duration>,
    fail_subtasks: bool,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeGateway {
    fn new(decomposition: &str) -> Self {
        Self {
            decomposition: decomposition.to_string(),
            combined: "print('combined')".to_string(),
            subtask_delays: HashMap::new(),
            fail_subtasks: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn calls_with_system(&self, needle: &str) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter(|(system, _)| system.contains(needle))
            .map(|(_, user)| user.clone())
            .collect()
    }
}

#[async_trait]
impl ChatGateway for FakeGateway {
    async fn generate(
        &self,
        user_prompt: &str,
        system_prompt: &str,
    ) -> Result<String, GenerationError> {
        self.calls
            .lock()
            .push((system_prompt.to_string(), user_prompt.to_string()));

        if system_prompt.contains("decomposition expert") {
            return Ok(self.decomposition.clone());
        }
        if system_prompt.contains("expert Python developer") {
            if self.fail_subtasks {
                return Err(GenerationError::EmptyCompletion);
            }
            if let Some(delay) = self.subtask_delays.get(user_prompt) {
                tokio::time::sleep(*delay).await;
            }
            return Ok(format!("# code for {user_prompt}"));
        }
        if system_prompt.contains("synthesizing") {
            return Ok(self.combined.clone());
        }
        // Repair requests carry no system instruction.
        Ok("check the undefined variable on line 2".to_string())
    }
}

#[tokio::test]
async fn cache_hit_returns_frozen_snapshot_without_new_calls() {
    let gateway = Arc::new(FakeGateway::new(r#"["step one", "step two"]"#));
    let processor = PromptProcessor::new(gateway.clone());

    let first = processor.process("build it", Complexity::new(2)).await.unwrap();
    // decompose + 2 subtasks + combine
    assert_eq!(gateway.call_count(), 4);

    let second = processor.process("build it", Complexity::new(2)).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.processing_time, first.processing_time);
    assert_eq!(gateway.call_count(), 4, "cache hit must not touch the gateway");
}

#[tokio::test]
async fn cache_keys_on_complexity_too() {
    let gateway = Arc::new(FakeGateway::new(r#"["only step"]"#));
    let processor = PromptProcessor::new(gateway.clone());

    processor.process("p", Complexity::new(1)).await.unwrap();
    processor.process("p", Complexity::new(2)).await.unwrap();

    assert_eq!(processor.cache().len(), 2);
}

#[tokio::test]
async fn subtask_results_preserve_submission_order_under_skewed_completion() {
    let mut gateway = FakeGateway::new(r#"["slow task", "medium task", "fast task"]"#);
    gateway
        .subtask_delays
        .insert("slow task".into(), Duration::from_millis(250));
    gateway
        .subtask_delays
        .insert("medium task".into(), Duration::from_millis(100));
    let processor = PromptProcessor::new(Arc::new(gateway));

    let result = processor.process("ordered work", Complexity::new(3)).await.unwrap();

    let tasks: Vec<&str> = result
        .subtask_results
        .iter()
        .map(|r| r.task.as_str())
        .collect();
    assert_eq!(tasks, vec!["slow task", "medium task", "fast task"]);
    for pair in &result.subtask_results {
        assert_eq!(pair.result, format!("# code for {}", pair.task));
    }
}

#[tokio::test]
async fn malformed_decomposition_degrades_to_whole_prompt() {
    let gateway = Arc::new(FakeGateway::new("Sure! Here are the steps: 1) foo"));
    let processor = PromptProcessor::new(gateway);

    let result = processor.process("just do it", Complexity::new(4)).await.unwrap();

    assert_eq!(result.subtask_results.len(), 1);
    assert_eq!(result.subtask_results[0].task, "just do it");
}

#[tokio::test]
async fn subtask_generation_failure_fails_the_whole_call() {
    let mut gateway = FakeGateway::new(r#"["a", "b"]"#);
    gateway.fail_subtasks = true;
    let cache = Arc::new(ResultCache::new());
    let processor = PromptProcessor::with_cache(Arc::new(gateway), cache.clone());

    let outcome = processor.process("p", Complexity::new(2)).await;

    assert!(outcome.is_err());
    assert!(cache.is_empty(), "failed calls must not be cached");
}

#[tokio::test]
async fn combination_request_embeds_prompt_and_ordered_results() {
    let gateway = Arc::new(FakeGateway::new(r#"["parse args", "emit output"]"#));
    let processor = PromptProcessor::new(gateway.clone());

    let result = processor.process("write a cli", Complexity::new(2)).await.unwrap();
    assert_eq!(result.final_result, "print('combined')");

    let combine_calls = gateway.calls_with_system("synthesizing");
    assert_eq!(combine_calls.len(), 1);
    let request = &combine_calls[0];
    assert!(request.contains("Original prompt: write a cli"));
    let first = request.find("parse args").unwrap();
    let second = request.find("emit output").unwrap();
    assert!(first < second, "combination must see results in subtask order");
}

#[tokio::test]
async fn repair_issues_exactly_one_call_embedding_code_and_stderr() {
    let gateway = FakeGateway::new("[]");
    let code = "raise RuntimeError('boom')";
    let stderr = "Traceback (most recent call last):\nRuntimeError: boom";

    let suggestion = suggest_repair(&gateway, code, stderr).await.unwrap();

    assert!(!suggestion.is_empty());
    let calls = gateway.calls.lock();
    assert_eq!(calls.len(), 1);
    let (system, user) = &calls[0];
    assert!(system.is_empty());
    assert!(user.contains(code));
    assert!(user.contains(stderr));
}

#[tokio::test]
async fn processing_result_serializes_with_stable_field_names() {
    let gateway = Arc::new(FakeGateway::new(r#"["only"]"#));
    let processor = PromptProcessor::new(gateway);

    let result = processor.process("p", Complexity::new(1)).await.unwrap();
    let json = serde_json::to_value(&*result).unwrap();

    assert_eq!(json["original_prompt"], "p");
    assert_eq!(json["complexity_level"], 1);
    assert!(json["processing_time"].as_str().unwrap().ends_with('s'));
    assert_eq!(json["subtask_results"][0]["task"], "only");
    assert_eq!(json["final_result"], "print('combined')");
}

#[tokio::test]
async fn execution_outcome_serializes_tagged() {
    let outcome = ExecutionOutcome::ValidationFailed {
        error: "syntax error at line 1, column 12".into(),
    };
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["outcome"], "validation_failed");
}
