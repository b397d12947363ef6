use crate::config::AppConfig;
use crate::error::{Result, WellbeingError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: content.to_string(),
            name: None,
        }
    }

    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
            name: None,
        }
    }
}

/// Anything that can turn a message list into one completion.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String>;
}

/// The provider credential. Lives only for one submission.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    /// `None` when the entered key is blank.
    pub fn parse(raw: String) -> Option<Self> {
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw.trim().to_string()))
        }
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAIClient {
    client: Client,
    api_key: ApiKey,
    model: String,
    api_url: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAIClient {
    pub fn new(api_key: ApiKey, config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            api_url: config.api_url.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    async fn send(&self, messages: Vec<ChatMessage>, temperature: f32, max_tokens: u32) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature,
            max_tokens: Some(max_tokens),
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(self.api_key.expose())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(WellbeingError::Api { status, body });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        extract_content(completion)
    }

    /// One tiny completion to confirm the key is accepted.
    pub async fn validate_api_key(&self) -> Result<bool> {
        match self.send(vec![ChatMessage::user("Say 'ok'")], 0.0, 5).await {
            Ok(_) => Ok(true),
            Err(WellbeingError::Api { status: 401, .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl ChatBackend for OpenAIClient {
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String> {
        self.send(messages, self.temperature, self.max_tokens).await
    }
}

fn extract_content(completion: ChatCompletionResponse) -> Result<String> {
    completion
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content.unwrap_or_default())
        .ok_or(WellbeingError::EmptyCompletion)
}
