use std::env;
use std::time::Duration;

use async_trait::async_trait;
use pgvector::Vector;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::embedding_provider::{EmbeddingProvider, ProviderError};
use crate::application::ports::response_generator::{Prompt, ResponseGenerator};

pub const EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const EMBEDDING_DIMENSION: usize = 1536;
pub const CHAT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub embedding_model: String,
    pub chat_model: String,
    // f64 so the serialized JSON carries the literal value exactly.
    pub temperature: f64,
    pub max_tokens: u32,
    pub max_retries: u32,
    pub timeout_secs: u64,
    pub backoff_factor: f64,
}

impl OpenAiConfig {
    pub fn from_env() -> Result<Self, String> {
        let api_key = env::var("OPENAI_API_KEY").map_err(|_| "OPENAI_API_KEY not set")?;
        let base_url = env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        Ok(Self {
            api_key,
            base_url,
            embedding_model: EMBEDDING_MODEL.to_string(),
            chat_model: CHAT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            max_retries: 3,
            timeout_secs: 30,
            backoff_factor: 1.5,
        })
    }
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// OpenAI-backed provider for both embeddings and chat completions.
pub struct OpenAiClient {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Failure(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, ProviderError> {
        let config = OpenAiConfig::from_env().map_err(ProviderError::Failure)?;
        Self::new(config)
    }

    async fn post_with_retry<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, ProviderError>
    where
        Req: Serialize,
        Resp: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{}", self.config.base_url, path);
        let mut attempts = 0;
        let mut last_error = None;

        loop {
            attempts += 1;

            match self.execute::<Req, Resp>(&url, body).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    last_error = Some(e);
                    if attempts > self.config.max_retries {
                        break;
                    }
                    let backoff = Duration::from_millis(
                        (self.config.backoff_factor.powi(attempts as i32 - 1) * 1000.0) as u64,
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| ProviderError::Failure("max retries exceeded".to_string())))
    }

    async fn execute<Req, Resp>(&self, url: &str, body: &Req) -> Result<Resp, ProviderError>
    where
        Req: Serialize,
        Resp: for<'de> Deserialize<'de>,
    {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(self.config.timeout_secs)
                } else {
                    ProviderError::Failure(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ProviderError::Failure(format!(
                "HTTP {}: {}",
                status, detail
            )));
        }

        response
            .json::<Resp>()
            .await
            .map_err(|e| ProviderError::Failure(format!("bad response body: {}", e)))
    }

    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>, ProviderError> {
        let request = EmbeddingsRequest {
            model: &self.config.embedding_model,
            input: texts,
        };
        let mut response: EmbeddingsResponse =
            self.post_with_retry("/embeddings", &request).await?;

        // The API documents data as input-ordered, the index field makes it
        // explicit.
        response.data.sort_by_key(|d| d.index);
        if response.data.len() != texts.len() {
            return Err(ProviderError::Failure(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                response.data.len()
            )));
        }

        response
            .data
            .into_iter()
            .map(|d| {
                if d.embedding.len() != EMBEDDING_DIMENSION {
                    return Err(ProviderError::DimensionMismatch {
                        expected: EMBEDDING_DIMENSION,
                        actual: d.embedding.len(),
                    });
                }
                Ok(Vector::from(d.embedding))
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vector, ProviderError> {
        let mut vectors = self.embed_texts(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| ProviderError::Failure("empty embedding response".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vector>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.embed_texts(texts).await
    }

    fn dimension(&self) -> usize {
        EMBEDDING_DIMENSION
    }

    fn model_info(&self) -> (String, Option<String>) {
        (self.config.embedding_model.clone(), None)
    }
}

#[async_trait]
impl ResponseGenerator for OpenAiClient {
    async fn generate(&self, prompt: &Prompt) -> Result<String, ProviderError> {
        let messages = prompt
            .to_messages()
            .into_iter()
            .map(|m| ChatMessage {
                role: m.role,
                content: m.content,
            })
            .collect();
        let request = ChatRequest {
            model: &self.config.chat_model,
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response: ChatResponse = self.post_with_retry("/chat/completions", &request).await?;
        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::Failure("no completion choices returned".to_string()))
    }
}
