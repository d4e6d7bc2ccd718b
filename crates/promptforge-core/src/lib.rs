//! Promptforge Core - the decompose/generate/combine/execute/repair engine.
//!
//! # Architecture
//!
//! A [`PromptProcessor`] drives the pipeline for one prompt:
//!
//! 1. **Cache check** - exact match on (prompt, complexity) returns the
//!    frozen snapshot of the original call ([`cache`]).
//! 2. **Decompose** - the gateway splits the prompt into ordered subtasks;
//!    malformed model output degrades to the whole prompt as one subtask.
//! 3. **Subtask fan-out** - one code-only generation per subtask, collected
//!    behind an ordered barrier ([`processor`]).
//! 4. **Combine** - one final gateway call synthesizes the ordered results
//!    into a single script.
//! 5. **Execute / repair** (opt-in) - [`synthesis`] validates the script
//!    against the Python grammar, persists it, runs it in the sandbox, and
//!    [`repair`] turns error-stream content into a fix suggestion.
//!
//! The model itself stays opaque behind `promptforge_llm::ChatGateway`;
//! subprocess supervision lives in `promptforge_sandbox`.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms, missing_debug_implementations)]

pub mod cache;
pub mod config;
pub mod error;
pub mod processor;
pub mod prompts;
pub mod repair;
pub mod synthesis;
pub mod types;

pub use cache::ResultCache;
pub use config::{AppConfig, LlmConfig};
pub use error::{ProcessError, Result};
pub use processor::PromptProcessor;
pub use repair::suggest_repair;
pub use synthesis::{CodeSynthesizer, ExecutionOutcome};
pub use types::{Complexity, ProcessingResult, SubtaskResult};
