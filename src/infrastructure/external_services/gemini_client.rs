use std::env;
use std::time::Duration;

use async_trait::async_trait;
use pgvector::Vector;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::embedding_provider::{EmbeddingProvider, ProviderError};
use crate::application::ports::response_generator::{Prompt, ResponseGenerator};

pub const GENERATION_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_retries: u32,
    pub timeout_secs: u64,
    pub backoff_factor: f64,
}

impl GeminiConfig {
    pub fn from_env() -> Result<Self, String> {
        let api_key = env::var("GEMINI_API_KEY").map_err(|_| "GEMINI_API_KEY not set")?;
        let base_url = env::var("GEMINI_BASE_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".to_string());

        Ok(Self {
            api_key,
            base_url,
            model: GENERATION_MODEL.to_string(),
            max_retries: 3,
            timeout_secs: 30,
            backoff_factor: 1.5,
        })
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

/// Gemini-backed response generator. Generation only: the embedding side of
/// the provider trait reports `CapabilityUnavailable`, and the container
/// refuses to wire this client as the embedder at startup.
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Failure(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, ProviderError> {
        let config = GeminiConfig::from_env().map_err(ProviderError::Failure)?;
        Self::new(config)
    }

    async fn generate_content(&self, text: String) -> Result<String, ProviderError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.base_url, self.config.model, self.config.api_key
        );
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text }],
            }],
        };

        let mut attempts = 0;
        let mut last_error = None;
        loop {
            attempts += 1;
            match self.execute(&url, &request).await {
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

    async fn execute(&self, url: &str, request: &GenerateRequest) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(url)
            .json(request)
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

        let parsed = response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| ProviderError::Failure(format!("bad response body: {}", e)))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| ProviderError::Failure("no candidates returned".to_string()))
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiClient {
    async fn embed(&self, _text: &str) -> Result<Vector, ProviderError> {
        Err(ProviderError::CapabilityUnavailable(
            "Gemini backend does not provide embeddings".to_string(),
        ))
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vector>, ProviderError> {
        Err(ProviderError::CapabilityUnavailable(
            "Gemini backend does not provide embeddings".to_string(),
        ))
    }

    fn dimension(&self) -> usize {
        0
    }

    fn model_info(&self) -> (String, Option<String>) {
        (self.config.model.clone(), None)
    }

    fn supports_embedding(&self) -> bool {
        false
    }
}

#[async_trait]
impl ResponseGenerator for GeminiClient {
    async fn generate(&self, prompt: &Prompt) -> Result<String, ProviderError> {
        // Gemini takes a single text part, so the prompt is flattened into
        // its single-string form.
        self.generate_content(prompt.render()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_shape() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "rendered prompt".to_string(),
                }],
            }],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "rendered prompt");
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"an answer"}]}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.candidates[0].content.parts[0].text, "an answer");
    }
}
