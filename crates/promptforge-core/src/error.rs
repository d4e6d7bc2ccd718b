//! Error types for the Promptforge core engine.
//!
//! We use `thiserror` for ergonomic error definitions with automatic
//! Display/Error implementations. Note what is *not* here: decomposition
//! parse failures (recovered inside the gateway's `decompose`) and
//! validation/execution failures (returned as [`ExecutionOutcome`] data,
//! never raised).
//!
//! [`ExecutionOutcome`]: crate::synthesis::ExecutionOutcome

use promptforge_llm::GenerationError;
use thiserror::Error;

/// Result type alias for core pipeline operations
pub type Result<T> = std::result::Result<T, ProcessError>;

/// Main error type for pipeline operations
#[derive(Error, Debug)]
pub enum ProcessError {
    /// A gateway call failed during subtask generation or combination.
    /// These propagate as a whole-call failure - no partial results.
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// IO errors (workspace directory, artifact writes)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The syntax validator itself could not be set up
    #[error("parser error: {0}")]
    Parser(String),

    /// Missing or invalid startup configuration
    #[error("configuration error: {0}")]
    Config(String),
}
