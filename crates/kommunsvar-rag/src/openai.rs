// OpenAI API client: embeddings (text-embedding-3-small) and chat
// completions (gpt-4o-mini). Both surfaces are behind traits so the
// engine can be exercised with test doubles.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const EMBEDDING_MODEL: &str = "text-embedding-3-small";
const CHAT_MODEL: &str = "gpt-4o-mini";
const CHAT_TEMPERATURE: f32 = 0.5;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum OpenAiError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    ApiError(String),

    #[error("Missing API key")]
    MissingApiKey,
}

/// A role-tagged message for the chat-completion call.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system", content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user", content: content.into() }
    }
}

/// One embedded text plus the token count the provider billed for it.
#[derive(Debug, Clone)]
pub struct Embedding {
    pub vector: Vec<f32>,
    pub tokens: u32,
}

/// A batch of embeddings, in input order.
#[derive(Debug, Clone)]
pub struct EmbeddingBatch {
    pub vectors: Vec<Vec<f32>>,
    pub tokens: u32,
}

/// Generated answer plus prompt/completion token usage.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding, OpenAiError>;
    async fn embed_batch(&self, texts: &[String]) -> Result<EmbeddingBatch, OpenAiError>;
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Completion, OpenAiError>;
}

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    embedding_model: String,
    chat_model: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a, T: Serialize> {
    model: &'a str,
    input: T,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
    usage: EmbeddingUsage,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Deserialize)]
struct EmbeddingUsage {
    total_tokens: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: ChatUsage,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

impl OpenAiClient {
    const BASE_URL: &'static str = "https://api.openai.com/v1";

    pub fn new(api_key: impl Into<String>) -> Result<Self, OpenAiError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            embedding_model: EMBEDDING_MODEL.to_string(),
            chat_model: CHAT_MODEL.to_string(),
        })
    }

    /// Create from env OPENAI_API_KEY
    pub fn from_env() -> Result<Self, OpenAiError> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| OpenAiError::MissingApiKey)?;
        Self::new(api_key)
    }

    pub fn chat_model(&self) -> &str {
        &self.chat_model
    }

    async fn post_json<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, OpenAiError> {
        let response = self
            .client
            .post(format!("{}{}", Self::BASE_URL, path))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(OpenAiError::ApiError(error_text));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl EmbeddingClient for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Embedding, OpenAiError> {
        let request = EmbeddingRequest {
            model: &self.embedding_model,
            input: text,
        };
        let result: EmbeddingResponse = self.post_json("/embeddings", &request).await?;
        let vector = result
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| OpenAiError::ApiError("No embedding returned".to_string()))?;
        Ok(Embedding {
            vector,
            tokens: result.usage.total_tokens,
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<EmbeddingBatch, OpenAiError> {
        if texts.is_empty() {
            return Ok(EmbeddingBatch { vectors: Vec::new(), tokens: 0 });
        }
        let request = EmbeddingRequest {
            model: &self.embedding_model,
            input: texts,
        };
        let result: EmbeddingResponse = self.post_json("/embeddings", &request).await?;

        // The API may reorder; index restores input order.
        let mut data = result.data;
        data.sort_by_key(|d| d.index);
        if data.len() != texts.len() {
            return Err(OpenAiError::ApiError(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                data.len()
            )));
        }
        Ok(EmbeddingBatch {
            vectors: data.into_iter().map(|d| d.embedding).collect(),
            tokens: result.usage.total_tokens,
        })
    }
}

#[async_trait]
impl ChatClient for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Completion, OpenAiError> {
        let request = ChatRequest {
            model: &self.chat_model,
            temperature: CHAT_TEMPERATURE,
            messages,
        };
        let result: ChatResponse = self.post_json("/chat/completions", &request).await?;
        let text = result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| OpenAiError::ApiError("No response".to_string()))?;
        Ok(Completion {
            text,
            prompt_tokens: result.usage.prompt_tokens,
            completion_tokens: result.usage.completion_tokens,
        })
    }
}
