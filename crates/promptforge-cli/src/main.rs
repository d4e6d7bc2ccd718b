//! Promptforge CLI - decompose a prompt, generate code per subtask, combine
//! the results, and optionally execute the final script.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use colored::Colorize;

use promptforge_core::{
    suggest_repair, AppConfig, CodeSynthesizer, Complexity, ExecutionOutcome, PromptProcessor,
    ProcessingResult,
};
use promptforge_llm::{ChatGateway, OpenAiClient};
use promptforge_sandbox::ScriptRunner;

/// Promptforge - LLM prompt decomposition and code synthesis pipeline
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input prompt to process
    #[arg(short, long)]
    prompt: String,

    /// Complexity level (1-5)
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=5))]
    complexity: u8,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Workspace directory for generated artifacts
    #[arg(long, value_name = "DIR")]
    workspace: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Final combined script plus summary stats
    Text,
    /// Full processing result as JSON
    Json,
    /// Validate, execute and (on failure) suggest repairs
    Code,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {e}", "Error:".red());
            std::process::exit(1);
        }
    };
    if let Some(workspace) = cli.workspace.clone() {
        config = config.with_workspace_dir(workspace);
    }

    let complexity = Complexity::new(cli.complexity as i64);
    let client = OpenAiClient::new(&config.api_key)
        .with_model(&config.llm.model_name)
        .with_temperature(config.llm.temperature)
        .with_max_tokens(config.llm.max_tokens)
        .with_top_p(config.llm.top_p);
    let gateway: Arc<dyn ChatGateway> = Arc::new(client);
    let processor = PromptProcessor::new(Arc::clone(&gateway));

    println!(
        "{}",
        format!("Processing prompt with complexity {complexity}...").cyan()
    );

    let result = match processor.process(&cli.prompt, complexity).await {
        Ok(result) => result,
        Err(e) => {
            eprintln!("{} {e}", "Error:".red());
            std::process::exit(1);
        }
    };

    match cli.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&*result)?),
        OutputFormat::Text => print_text(&result),
        OutputFormat::Code => run_code(&result, &config, gateway.as_ref()).await?,
    }

    Ok(())
}

fn print_text(result: &ProcessingResult) {
    println!();
    println!("{}", "Final Result:".cyan());
    println!("{}", result.final_result);
    println!();
    println!("{}", "Processing Details:".yellow());
    println!("Time taken: {}", result.processing_time);
    println!("Subtasks processed: {}", result.subtask_results.len());
}

/// The `code` output path: synthesize, execute, and on error-stream content
/// ask the gateway for one repair suggestion.
async fn run_code(
    result: &ProcessingResult,
    config: &AppConfig,
    gateway: &dyn ChatGateway,
) -> anyhow::Result<()> {
    let synthesizer = CodeSynthesizer::new(&config.workspace_dir)?;
    let runner = ScriptRunner::new().with_interpreter(&config.interpreter);

    let outcome = synthesizer
        .synthesize_and_run(&result.final_result, "output.py", &runner)
        .await?;

    match outcome {
        ExecutionOutcome::Succeeded { stdout } => {
            println!("{}", "Code executed successfully. Output:".green());
            println!("{stdout}");
        }
        ExecutionOutcome::SucceededWithStderr { stdout, stderr } => {
            println!("{}", "Code execution failed. Error output:".red());
            if !stdout.is_empty() {
                println!("STDOUT:\n{stdout}");
            }
            println!("STDERR:\n{stderr}");

            match suggest_repair(gateway, &result.final_result, &stderr).await {
                Ok(suggestion) => {
                    println!("{}", "Repair suggestions:".yellow());
                    println!("{suggestion}");
                }
                Err(e) => eprintln!("{} could not get repair suggestion: {e}", "Error:".red()),
            }
        }
        ExecutionOutcome::TimedOut => {
            println!(
                "{}",
                format!("Execution timed out after {:?}.", runner.timeout()).red()
            );
        }
        ExecutionOutcome::LaunchFailed { error } => {
            println!("{} {error}", "Failed to launch generated script:".red());
        }
        ExecutionOutcome::ValidationFailed { error } => {
            println!("{} {error}", "Failed to generate and execute code:".red());
        }
    }

    Ok(())
}
