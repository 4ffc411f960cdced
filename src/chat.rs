//! Chat companion
//!
//! A [`ChatSession`] keeps the conversation log and asks a
//! [`CompletionClient`] for each reply. Any failure of the client is logged
//! and replaced by the configured fallback message, so `send` never fails.

use crate::config::ChatConfig;
use crate::error::ChatError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

/// Companion message posted when the user presses SOS
pub const SOS_MESSAGE: &str = "מפעיל קשר חירום עם גורם מקצועי. אנחנו כאן בשבילך.";

/// Produces one companion reply for one user message
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_text: &str) -> Result<String, ChatError>;
}

/// Client for an OpenAI-compatible chat completions endpoint
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: &ChatConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ReplyMessage>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, system_prompt: &str, user_text: &str) -> Result<String, ChatError> {
        let api_key = self.api_key.as_deref().ok_or(ChatError::MissingCredential)?;

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_text },
            ],
        });

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(ChatError::EmptyReply);
        }
        Ok(content)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Companion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub text: String,
    pub speaker: Speaker,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(text: impl Into<String>, speaker: Speaker, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            speaker,
            timestamp,
        }
    }
}

pub struct ChatSession<C> {
    client: C,
    system_prompt: String,
    fallback_message: String,
    messages: Vec<ChatMessage>,
}

impl<C: CompletionClient> ChatSession<C> {
    /// Start a conversation that opens with the configured greeting
    pub fn new(client: C, config: &ChatConfig, now: DateTime<Utc>) -> Self {
        Self {
            client,
            system_prompt: config.system_prompt.clone(),
            fallback_message: config.fallback_message.clone(),
            messages: vec![ChatMessage::new(config.greeting.clone(), Speaker::Companion, now)],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Post a user message and wait for the companion's reply.
    ///
    /// Blank input is ignored and returns `None`. Otherwise the reply (or the
    /// fallback) is appended and returned.
    pub async fn send(&mut self, text: &str, now: DateTime<Utc>) -> Option<&ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.messages.push(ChatMessage::new(text, Speaker::User, now));

        let reply = match self.client.complete(&self.system_prompt, text).await {
            Ok(reply) => {
                debug!(chars = reply.chars().count(), "companion replied");
                reply
            }
            Err(err) => {
                warn!(error = %err, "chat completion failed, using fallback reply");
                self.fallback_message.clone()
            }
        };

        self.messages.push(ChatMessage::new(reply, Speaker::Companion, now));
        self.messages.last()
    }

    /// Post the emergency-contact notice
    pub fn sos(&mut self, now: DateTime<Utc>) -> &ChatMessage {
        warn!("SOS requested from chat");
        self.messages.push(ChatMessage::new(SOS_MESSAGE, Speaker::Companion, now));
        &self.messages[self.messages.len() - 1]
    }
}
