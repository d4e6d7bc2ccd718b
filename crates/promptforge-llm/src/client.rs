//! OpenAI-compatible chat-completions client and the [`ChatGateway`] trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, Result};
use crate::sanitize::sanitize_payload;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// The single outbound capability of the system: one request, one response.
///
/// `generate` is fallible and unretried. `decompose` is a convenience built
/// on top of it that never fails: any gateway or parse failure degrades to
/// treating the whole prompt as the single subtask.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Sends one system + user prompt pair and returns the raw response text.
    async fn generate(&self, user_prompt: &str, system_prompt: &str) -> Result<String>;

    /// Breaks a prompt into an ordered list of subtasks.
    ///
    /// The complexity level (1-5) is embedded as a sizing hint; the model is
    /// asked for a strict JSON array of strings. Malformed output, a
    /// non-array, an empty array, or a failed `generate` call all yield
    /// `vec![prompt]` - the returned list is never empty.
    async fn decompose(&self, prompt: &str, complexity: u8) -> Vec<String> {
        let system_prompt = "You are a prompt decomposition expert. \
            Break down the given prompt into smaller, manageable sub-tasks. \
            Return the sub-tasks as a JSON array of strings. \
            Consider the complexity level provided and adjust the granularity accordingly. \
            Format your response as a plain JSON array without markdown formatting.";

        // Iteration count hint is the identity mapping over complexity.
        let decomposition_prompt = format!(
            "Complexity Level: {complexity}/5\n\
             Original Prompt: {prompt}\n\n\
             Break this prompt into {complexity} sub-tasks.\n\
             Return only a JSON array of strings representing the sub-tasks.\n\
             Example format: [\"task1\", \"task2\", \"task3\"]"
        );

        let response = match self.generate(&decomposition_prompt, system_prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("decomposition call failed, falling back to single subtask: {e}");
                return vec![prompt.to_string()];
            }
        };

        let cleaned = sanitize_payload(&response);
        match serde_json::from_str::<Vec<String>>(&cleaned) {
            Ok(subtasks) if !subtasks.is_empty() => {
                tracing::debug!("decomposed prompt into {} subtasks", subtasks.len());
                subtasks
            }
            Ok(_) => {
                tracing::warn!("decomposition returned an empty array, using single subtask");
                vec![prompt.to_string()]
            }
            Err(e) => {
                tracing::warn!("could not parse decomposition response ({e}), using single subtask");
                vec![prompt.to_string()]
            }
        }
    }
}

/// Chat-completions client for any OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    api_key: String,
    base_url: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
    top_p: f64,
    http_client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            top_p: 1.0,
            http_client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = top_p;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    async fn request_completion(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
            top_p: Some(self.top_p),
        };

        let response = self
            .http_client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(GenerationError::EmptyCompletion)
    }
}

#[async_trait]
impl ChatGateway for OpenAiClient {
    async fn generate(&self, user_prompt: &str, system_prompt: &str) -> Result<String> {
        tracing::debug!(
            "generating response for prompt: {:.100}...",
            user_prompt.replace('\n', " ")
        );
        self.request_completion(system_prompt, user_prompt).await
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}
