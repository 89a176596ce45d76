// src/services/ai_client.rs

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::common::error::AppError;

/// Fronteira com o modelo de linguagem. Devolve o texto bruto, que deve
/// ser um JSON no formato de `response_schema`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, response_schema: Value) -> Result<String, AppError>;
}

// Só os campos que usamos da resposta do generateContent
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Cliente HTTP da API Gemini (`models/{model}:generateContent`).
#[derive(Clone)]
pub struct GeminiClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    http_client: Client,
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: Option<String>, model: &str, http_client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
            http_client,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str, response_schema: Value) -> Result<String, AppError> {
        let api_key = self.api_key
            .as_deref()
            .ok_or_else(|| AppError::AiRequestFailed("AI_API_KEY não configurada".into()))?;

        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema,
            }
        });

        let response = self.http_client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::AiRequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::AiRequestFailed(format!("{}: {}", status, error_text)));
        }

        let parsed = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| AppError::AiInvalidOutput(e.to_string()))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
            .ok_or_else(|| AppError::AiInvalidOutput("resposta sem texto".into()))
    }
}
