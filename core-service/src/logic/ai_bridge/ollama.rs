//! Ollama Client - blocking HTTP adapter for generation + embeddings
//!
//! POST {base}/api/generate {model, prompt, stream:false} → {response}
//! POST {base}/api/embed    {model, input:[..]}           → {embeddings}

use std::time::Duration;

use ndarray::Array2;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{Embedder, EmbeddingError, GenerationError, TextGenerator};
use crate::logic::config::ServiceConfig;

#[derive(Clone)]
pub struct OllamaClient {
    base_url: String,
    generation_model: String,
    embed_model: String,
    embed_dimension: usize,
    timeout: Duration,
    http: Client,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Transport-level failure with the body (if any) already read
enum PostError {
    Transport(reqwest::Error),
    Status(u16, String),
    Decode(String),
}

impl OllamaClient {
    pub fn new(
        base_url: impl Into<String>,
        generation_model: impl Into<String>,
        embed_model: impl Into<String>,
        embed_dimension: usize,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| GenerationError::Transport(err.to_string()))?;
        Ok(Self {
            base_url: trim_trailing_slash(base_url.into()),
            generation_model: generation_model.into(),
            embed_model: embed_model.into(),
            embed_dimension,
            timeout,
            http,
        })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self, GenerationError> {
        Self::new(
            config.ollama_url.clone(),
            config.generation_model.clone(),
            config.embed_model.clone(),
            config.embed_dimension,
            config.generation_timeout,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post_json<T, R>(&self, path: &str, body: &T) -> Result<R, PostError>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .map_err(PostError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(PostError::Status(status.as_u16(), truncate(&body, 500)));
        }

        response.json::<R>().map_err(|err| PostError::Decode(err.to_string()))
    }
}

impl TextGenerator for OllamaClient {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = GenerateRequest {
            model: &self.generation_model,
            prompt,
            stream: false,
        };

        log::debug!("Generation request to {} ({} chars)", self.base_url, prompt.len());

        match self.post_json::<_, GenerateResponse>("api/generate", &request) {
            Ok(body) => Ok(body.response),
            Err(PostError::Transport(err)) if err.is_timeout() => Err(GenerationError::Timeout(self.timeout)),
            Err(PostError::Transport(err)) => Err(GenerationError::Transport(err.to_string())),
            Err(PostError::Status(status, body)) => Err(GenerationError::Status { status, body }),
            Err(PostError::Decode(msg)) => Err(GenerationError::Decode(msg)),
        }
    }
}

impl Embedder for OllamaClient {
    fn dimension(&self) -> usize {
        self.embed_dimension
    }

    fn embed(&self, texts: &[String]) -> Result<Array2<f32>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Array2::zeros((0, self.embed_dimension)));
        }

        let request = EmbedRequest {
            model: &self.embed_model,
            input: texts,
        };

        let body: EmbedResponse = match self.post_json("api/embed", &request) {
            Ok(body) => body,
            Err(PostError::Transport(err)) => return Err(EmbeddingError::Transport(err.to_string())),
            Err(PostError::Status(status, _)) => return Err(EmbeddingError::Status(status)),
            Err(PostError::Decode(msg)) => return Err(EmbeddingError::Decode(msg)),
        };

        rows_to_matrix(body.embeddings, texts.len(), self.embed_dimension)
    }
}

fn rows_to_matrix(rows: Vec<Vec<f32>>, expected_rows: usize, dimension: usize) -> Result<Array2<f32>, EmbeddingError> {
    if rows.len() != expected_rows {
        return Err(EmbeddingError::Decode(format!(
            "expected {} embeddings, got {}",
            expected_rows,
            rows.len()
        )));
    }
    if let Some(bad) = rows.iter().find(|r| r.len() != dimension) {
        return Err(EmbeddingError::Shape {
            expected: dimension,
            actual: bad.len(),
        });
    }

    let flat: Vec<f32> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((expected_rows, dimension), flat)
        .map_err(|err| EmbeddingError::Decode(err.to_string()))
}

fn trim_trailing_slash(mut base: String) -> String {
    while base.ends_with('/') {
        base.pop();
    }
    base
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
