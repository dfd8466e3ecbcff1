//! # Gemini API client
//!
//! Thin client for Google Gemini's `generateContent` endpoint, plus the
//! assembly of the customer-service prompt from a [`ConversationContext`].
//!
//! Reply generation deliberately never fails: API errors and empty
//! responses degrade to fixed apology strings so a model outage can not
//! take down the webhook pipeline. Provides token masking for safe logging.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use context_cache::ConversationContext;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Timeout applied to every Gemini API call.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// History turns rendered into the prompt.
const PROMPT_HISTORY_WINDOW: usize = 3;

/// System prompt used when the config provides none.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful customer service assistant for a business. \
You should be polite, professional, and helpful. Keep your responses concise but informative. \
If you don't know something, be honest about it and offer to help in other ways.";

/// Reply used when the model answers with no text.
pub const EMPTY_RESPONSE_FALLBACK: &str = "I apologize, but I'm having trouble generating a response right now. \
Please try again or contact our support team.";

/// Reply used when the API call itself fails.
pub const ERROR_FALLBACK: &str = "I apologize, but I'm experiencing technical difficulties. \
Please try again later or contact our support team directly.";

/// Masks an API key/token for safe logging: shows first 7 chars + "***" + last 4 chars.
/// If length <= 11, returns "***" to avoid leaking any part of the key.
pub fn mask_token(token: &str) -> String {
    let len = token.len();
    if len <= 11 {
        "***".to_string()
    } else {
        format!("{}***{}", &token[..7], &token[len - 4..])
    }
}

/// AI-response capability: turn one customer message plus its context into a
/// reply. Infallible by contract; implementations fall back to canned text.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    async fn generate(&self, message: &str, context: &ConversationContext) -> String;
}

/// Gemini chat client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    system_prompt: String,
}

impl GeminiClient {
    /// Builds a client for the given key and model (e.g.
    /// `models/gemini-2.5-flash`; the `models/` prefix is optional).
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url: GEMINI_API_BASE.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: 1000,
            temperature: 0.7,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Points the client at a different API base (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    fn model_path(&self) -> String {
        if self.model.starts_with("models/") {
            self.model.clone()
        } else {
            format!("models/{}", self.model)
        }
    }

    /// Generates a reply for one customer message. Never fails: API errors
    /// and empty completions turn into fixed apology replies.
    pub async fn generate_reply(&self, message: &str, context: &ConversationContext) -> String {
        let prompt = self.build_prompt(message, context);

        match self.request_completion(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!(
                    conversation_id = context.conversation_id,
                    "Gemini returned empty response"
                );
                EMPTY_RESPONSE_FALLBACK.to_string()
            }
            Err(error) => {
                error!(
                    conversation_id = context.conversation_id,
                    %error,
                    "error generating Gemini response"
                );
                ERROR_FALLBACK.to_string()
            }
        }
    }

    /// Builds the complete prompt: system instructions, customer identity,
    /// recent history, derived signals, then the current message.
    fn build_prompt(&self, message: &str, context: &ConversationContext) -> String {
        let mut parts: Vec<String> = vec![self.system_prompt.clone()];

        if !context.customer_name.is_empty() {
            parts.push(format!("Customer name: {}", context.customer_name));
        }
        if !context.customer_email.is_empty() {
            parts.push(format!("Customer email: {}", context.customer_email));
        }

        if !context.conversation_history.is_empty() {
            parts.push("Recent conversation history:".to_string());
            let history = &context.conversation_history;
            let start = history.len().saturating_sub(PROMPT_HISTORY_WINDOW);
            for turn in &history[start..] {
                let speaker = if turn.is_incoming() { "Customer" } else { "Agent" };
                parts.push(format!("{}: {}", speaker, turn.content));
            }
        }

        if !context.recent_topics.is_empty() {
            parts.push(format!("Recent topics: {}", context.recent_topics.join(", ")));
        }
        if context.interaction_level.is_some() {
            parts.push("The customer is highly engaged in this conversation.".to_string());
        }

        parts.push(format!("Customer message: {}", message));
        parts.push("Your response:".to_string());

        parts.join("\n\n")
    }

    async fn request_completion(&self, prompt: &str) -> anyhow::Result<String> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model_path());
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![TextPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.max_tokens,
                temperature: self.temperature,
            },
        };

        info!(
            model = %self.model,
            api_key = %mask_token(&self.api_key),
            prompt_len = prompt.len(),
            "Gemini generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Gemini API error: status {}", status.as_u16());
        }

        let body: GenerateContentResponse = response.json().await?;
        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();
        Ok(text)
    }
}

#[async_trait]
impl ReplyGenerator for GeminiClient {
    async fn generate(&self, message: &str, context: &ConversationContext) -> String {
        self.generate_reply(message, context).await
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}
