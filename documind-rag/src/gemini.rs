//! Gemini embedding and generation providers over the REST API.
//!
//! This module is only available when the `gemini` feature is enabled.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::Generator;

/// Base URL of the Gemini generative language API.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Default generation model.
const DEFAULT_GENERATION_MODEL: &str = "gemini-2.5-flash";

/// Default embedding model and its native dimensionality.
const DEFAULT_EMBEDDING_MODEL: &str = "gemini-embedding-001";
const DEFAULT_EMBEDDING_DIMENSIONS: usize = 3072;

/// A [`Generator`] backed by the Gemini `generateContent` endpoint.
///
/// # Example
///
/// ```rust,ignore
/// use documind_rag::gemini::GeminiGenerator;
///
/// let generator = GeminiGenerator::from_env()?;
/// let text = generator.generate("Say hello").await?;
/// ```
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiGenerator {
    /// Create a new generator with the given API key and the default
    /// `gemini-2.5-flash` model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::GenerationError {
                provider: "Gemini".into(),
                message: "API key must not be empty".into(),
            });
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_GENERATION_MODEL.into(),
        })
    }

    /// Create a new generator using the `GOOGLE_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GOOGLE_API_KEY").map_err(|_| RagError::GenerationError {
            provider: "Gemini".into(),
            message: "GOOGLE_API_KEY environment variable not set".into(),
        })?;
        Self::new(api_key)
    }

    /// Set the model name (e.g. `gemini-2.5-pro`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl Generator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(provider = "Gemini", model = %self.model, prompt_len = prompt.len(), "generating");

        let url = format!("{GEMINI_API_BASE}/{}:generateContent", self.model);
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "Gemini", error = %e, "generation request failed");
                RagError::GenerationError { provider: "Gemini".into(), message: format!("{e}") }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!(provider = "Gemini", %status, "generation request rejected");
            return Err(RagError::GenerationError {
                provider: "Gemini".into(),
                message: format!("HTTP {status}: {detail}"),
            });
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            RagError::GenerationError {
                provider: "Gemini".into(),
                message: format!("malformed response: {e}"),
            }
        })?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| RagError::GenerationError {
                provider: "Gemini".into(),
                message: "response contained no candidates".into(),
            })?;

        Ok(text.trim().to_string())
    }
}

/// An [`EmbeddingProvider`] backed by the Gemini embedding API.
///
/// Uses `embedContent` for single texts and `batchEmbedContents` for
/// batches, preserving input order.
pub struct GeminiEmbedding {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dimensions: usize,
    output_dimensionality: Option<usize>,
}

impl GeminiEmbedding {
    /// Create a new provider with the given API key and the default
    /// `gemini-embedding-001` model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::EmbeddingError {
                provider: "Gemini".into(),
                message: "API key must not be empty".into(),
            });
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_EMBEDDING_MODEL.into(),
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
            output_dimensionality: None,
        })
    }

    /// Create a new provider using the `GOOGLE_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GOOGLE_API_KEY").map_err(|_| RagError::EmbeddingError {
            provider: "Gemini".into(),
            message: "GOOGLE_API_KEY environment variable not set".into(),
        })?;
        Self::new(api_key)
    }

    /// Set the output dimensionality (truncates the embedding vector).
    /// This also updates [`dimensions()`](EmbeddingProvider::dimensions).
    pub fn with_output_dimensionality(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self.output_dimensionality = Some(dims);
        self
    }

    fn embed_request(&self, text: &str) -> serde_json::Value {
        let mut request = json!({
            "model": format!("models/{}", self.model),
            "content": { "parts": [{ "text": text }] }
        });
        if let Some(dims) = self.output_dimensionality {
            request["outputDimensionality"] = json!(dims);
        }
        request
    }

    async fn post(&self, url: &str, body: serde_json::Value) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "Gemini", error = %e, "embedding request failed");
                RagError::EmbeddingError { provider: "Gemini".into(), message: format!("{e}") }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!(provider = "Gemini", %status, "embedding request rejected");
            return Err(RagError::EmbeddingError {
                provider: "Gemini".into(),
                message: format!("HTTP {status}: {detail}"),
            });
        }
        Ok(response)
    }
}

#[derive(Deserialize)]
struct EmbedContentResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct BatchEmbedContentsResponse {
    #[serde(default)]
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "Gemini", text_len = text.len(), "embedding single text");

        let url = format!("{GEMINI_API_BASE}/{}:embedContent", self.model);
        let response = self.post(&url, self.embed_request(text)).await?;

        let parsed: EmbedContentResponse = response.json().await.map_err(|e| {
            RagError::EmbeddingError {
                provider: "Gemini".into(),
                message: format!("malformed response: {e}"),
            }
        })?;
        Ok(parsed.embedding.values)
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(provider = "Gemini", batch_size = texts.len(), "embedding batch");

        let url = format!("{GEMINI_API_BASE}/{}:batchEmbedContents", self.model);
        let requests: Vec<serde_json::Value> =
            texts.iter().map(|text| self.embed_request(text)).collect();
        let response = self.post(&url, json!({ "requests": requests })).await?;

        let parsed: BatchEmbedContentsResponse = response.json().await.map_err(|e| {
            RagError::EmbeddingError {
                provider: "Gemini".into(),
                message: format!("malformed response: {e}"),
            }
        })?;

        if parsed.embeddings.len() != texts.len() {
            return Err(RagError::EmbeddingError {
                provider: "Gemini".into(),
                message: format!(
                    "batch returned {} embeddings for {} inputs",
                    parsed.embeddings.len(),
                    texts.len()
                ),
            });
        }
        Ok(parsed.embeddings.into_iter().map(|e| e.values).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
