//! Promptforge LLM gateway - the single outbound boundary to the backing model.
//!
//! Everything above this crate talks to the model through [`ChatGateway`]:
//! one system prompt, one user prompt, one text response. No retries, no
//! streaming. The [`decompose`](ChatGateway::decompose) convenience layers
//! JSON extraction and a never-failing fallback on top of `generate`.

pub mod client;
pub mod error;
pub mod sanitize;

pub use client::{ChatGateway, OpenAiClient};
pub use error::GenerationError;
pub use sanitize::sanitize_payload;
