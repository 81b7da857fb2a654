/// Inference client — the single point of entry for hosted model calls.
///
/// All generation goes through the [`ChatModel`] trait; [`HfChatClient`] is
/// the production implementation against the Hugging Face chat-completions
/// router. There is no retry and no local fallback: every failure comes back
/// to the caller as an [`InferenceError`].
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_API_BASE: &str = "https://router.huggingface.co/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    #[error("authentication rejected (status {status}): {message}")]
    Auth { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("remote error (status {status}): {message}")]
    Remote { status: u16, message: String },
}

/// Sampling controls sent with every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodingParams {
    pub temperature: f64,
    pub max_new_tokens: u32,
    pub top_k: u32,
}

impl Default for DecodingParams {
    fn default() -> Self {
        Self {
            temperature: 0.6,
            max_new_tokens: 4096,
            top_k: 50,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InferenceRequest<'a> {
    pub model_id: &'a str,
    pub credential: &'a str,
    pub system: &'a str,
    pub user: &'a str,
    pub params: DecodingParams,
}

/// A hosted chat model. Carried in `AppState` as `Arc<dyn ChatModel>`.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn invoke(&self, request: &InferenceRequest<'_>) -> Result<String, InferenceError>;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
    max_tokens: u32,
    top_k: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiErrorBody {
    Plain(String),
    Detailed { message: String },
}

/// Chat-completions client for the Hugging Face inference router.
#[derive(Clone)]
pub struct HfChatClient {
    client: Client,
    endpoint: String,
}

impl HfChatClient {
    pub fn new(api_base: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", api_base.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl ChatModel for HfChatClient {
    async fn invoke(&self, request: &InferenceRequest<'_>) -> Result<String, InferenceError> {
        let body = ChatCompletionRequest {
            model: request.model_id,
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.system,
                },
                ChatMessage {
                    role: "user",
                    content: request.user,
                },
            ],
            temperature: request.params.temperature,
            max_tokens: request.params.max_new_tokens,
            top_k: request.params.top_k,
            stream: false,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(request.credential)
            .json(&body)
            .send()
            .await
            .map_err(|e| InferenceError::Network(error_chain(&e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| InferenceError::Network(error_chain(&e)))?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(InferenceError::Auth {
                status: status.as_u16(),
                message: api_error_message(text),
            });
        }

        if !status.is_success() {
            return Err(InferenceError::Remote {
                status: status.as_u16(),
                message: api_error_message(text),
            });
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_str(&text).map_err(|e| InferenceError::Remote {
                status: status.as_u16(),
                message: format!("invalid response body: {e}"),
            })?;

        let reply = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| InferenceError::Remote {
                status: status.as_u16(),
                message: "response contained no generated text".to_string(),
            })?;

        debug!(
            "Chat completion succeeded: model={}, reply_chars={}",
            request.model_id,
            reply.chars().count()
        );

        Ok(reply)
    }
}

/// Unwraps `{"error": "..."}` / `{"error": {"message": "..."}}` bodies,
/// falling back to the raw body.
fn api_error_message(body: String) -> String {
    match serde_json::from_str::<ApiError>(&body) {
        Ok(ApiError {
            error: ApiErrorBody::Plain(message),
        })
        | Ok(ApiError {
            error: ApiErrorBody::Detailed { message },
        }) => message,
        Err(_) => body,
    }
}

/// Formats an error with its full source chain; reqwest's top-level message
/// alone rarely names the actual cause.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
