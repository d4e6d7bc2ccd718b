//! Error types for the LLM gateway

use thiserror::Error;

/// Failure of a single `generate` call against the backing model service.
///
/// A decomposition parse failure is *not* represented here: `decompose`
/// recovers it internally and degrades to the one-item fallback.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model API error ({status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("model returned no completion choices")]
    EmptyCompletion,
}

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, GenerationError>;
