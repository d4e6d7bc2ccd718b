//! End-to-end synthesis and execution scenarios.
//!
//! These run real Python subprocesses and are skipped when no `python3` is
//! on the PATH.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use promptforge_core::{
    suggest_repair, CodeSynthesizer, Complexity, ExecutionOutcome, PromptProcessor,
};
use promptforge_llm::{ChatGateway, GenerationError};
use promptforge_sandbox::ScriptRunner;

fn python3_available() -> bool {
    std::process::Command::new("python3")
        .arg("--version")
        .output()
        .is_ok()
}

/// Happy-path fake: one subtask, combination yields a one-line greeting.
struct GreetingGateway {
    calls: Mutex<Vec<String>>,
}

#[async_trait]
impl ChatGateway for GreetingGateway {
    async fn generate(
        &self,
        _user_prompt: &str,
        system_prompt: &str,
    ) -> Result<String, GenerationError> {
        self.calls.lock().push(system_prompt.to_string());
        if system_prompt.contains("decomposition expert") {
            Ok(r#"["print a greeting"]"#.to_string())
        } else if system_prompt.contains("expert Python developer") {
            Ok("print('hello world')".to_string())
        } else {
            Ok("print('hello world')".to_string())
        }
    }
}

#[tokio::test]
async fn greeting_prompt_executes_cleanly_with_no_repair_call() {
    if !python3_available() {
        eprintln!("skipping: python3 not available");
        return;
    }

    let gateway = Arc::new(GreetingGateway {
        calls: Mutex::new(Vec::new()),
    });
    let processor = PromptProcessor::new(gateway.clone());
    let result = processor
        .process("print hello world", Complexity::new(1))
        .await
        .unwrap();
    assert_eq!(result.subtask_results.len(), 1);

    let dir = tempfile::tempdir().unwrap();
    let synthesizer = CodeSynthesizer::new(dir.path().join("ws")).unwrap();
    let runner = ScriptRunner::new();

    let outcome = synthesizer
        .synthesize_and_run(&result.final_result, "output.py", &runner)
        .await
        .unwrap();

    match &outcome {
        ExecutionOutcome::Succeeded { stdout } => assert!(stdout.contains("hello world")),
        other => panic!("expected clean success, got {other:?}"),
    }
    assert!(outcome.stderr_content().is_none(), "no repair should trigger");

    // Exactly decompose + subtask + combine went out - nothing more.
    assert_eq!(gateway.calls.lock().len(), 3);
}

#[tokio::test]
async fn failing_script_surfaces_stderr_and_yields_one_repair_call() {
    if !python3_available() {
        eprintln!("skipping: python3 not available");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let synthesizer = CodeSynthesizer::new(dir.path().join("ws")).unwrap();
    let runner = ScriptRunner::new();
    let code = "raise RuntimeError('boom')";

    let outcome = synthesizer
        .synthesize_and_run(code, "output.py", &runner)
        .await
        .unwrap();

    let stderr = outcome
        .stderr_content()
        .expect("runtime error must surface as stderr content");
    assert!(stderr.contains("RuntimeError"));

    let gateway = GreetingGateway {
        calls: Mutex::new(Vec::new()),
    };
    let suggestion = suggest_repair(&gateway, code, stderr).await.unwrap();
    assert!(!suggestion.is_empty());
    assert_eq!(gateway.calls.lock().len(), 1);
}

#[tokio::test]
async fn long_running_script_times_out() {
    if !python3_available() {
        eprintln!("skipping: python3 not available");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let synthesizer = CodeSynthesizer::new(dir.path().join("ws")).unwrap();
    let runner = ScriptRunner::new().with_timeout(Duration::from_millis(500));

    let outcome = synthesizer
        .synthesize_and_run("import time\ntime.sleep(10)\n", "slow.py", &runner)
        .await
        .unwrap();

    assert_eq!(outcome, ExecutionOutcome::TimedOut);
}
