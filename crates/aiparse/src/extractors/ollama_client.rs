use crate::error::{AiParseError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "qwen2.5vl:7b";

#[derive(Debug, Clone, Serialize)]
pub struct OllamaGenerateRequest {
    pub model: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub stream: bool,
    /// `"json"` or a JSON schema the output must satisfy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<OllamaOptions>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct OllamaGenerateResponse {
    pub model: String,
    pub response: String,
    pub done: bool,
    pub total_duration: Option<i64>,
    pub eval_duration: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct OllamaModel {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct OllamaModelsResponse {
    pub models: Vec<OllamaModel>,
}

/// Client for the Ollama generate API
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    default_options: OllamaOptions,
}

impl OllamaClient {
    /// Create a new Ollama client
    ///
    /// # Arguments
    /// * `base_url` - Base URL of Ollama API (e.g., "http://localhost:11434")
    /// * `model` - Vision model name (e.g., "qwen2.5vl:7b")
    /// * `timeout` - Upper bound for a single generation
    pub fn new(base_url: String, model: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        // Scores are read, not written, so keep sampling tight
        let default_options = OllamaOptions {
            temperature: Some(0.0),
            top_p: Some(0.9),
            top_k: Some(20),
            num_predict: Some(512),
        };

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            default_options,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate JSON constrained by `format` from a single image
    pub async fn generate_json_from_image(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        image_base64: String,
        format: serde_json::Value,
    ) -> Result<String> {
        let request = OllamaGenerateRequest {
            model: self.model.clone(),
            prompt: user_prompt.to_string(),
            system: Some(system_prompt.to_string()),
            stream: false,
            format: Some(format),
            images: Some(vec![image_base64]),
            options: Some(self.default_options.clone()),
        };

        tracing::info!(
            "Sending request to Ollama (model: {}, prompt length: {} chars)",
            self.model,
            user_prompt.len()
        );

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AiParseError::ModelError(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let ollama_response: OllamaGenerateResponse = response.json().await?;

        if let (Some(total), Some(eval)) = (
            ollama_response.total_duration,
            ollama_response.eval_duration,
        ) {
            tracing::info!(
                "Ollama generation complete: {:.2}s total, {:.2}s eval, {} chars output",
                total as f64 / 1_000_000_000.0,
                eval as f64 / 1_000_000_000.0,
                ollama_response.response.len()
            );
        }

        Ok(ollama_response.response)
    }

    /// List available models
    pub async fn list_models(&self) -> Result<Vec<OllamaModel>> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await?;

        let models_response: OllamaModelsResponse = response.json().await?;
        Ok(models_response.models)
    }

    /// Verify the configured model is available
    pub async fn verify_model(&self) -> Result<bool> {
        let models = self.list_models().await?;
        Ok(models.iter().any(|m| m.name.starts_with(&self.model)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_client() -> OllamaClient {
        OllamaClient::new(
            DEFAULT_OLLAMA_URL.to_string(),
            DEFAULT_MODEL.to_string(),
            Duration::from_secs(120),
        )
        .unwrap()
    }

    #[test]
    fn test_request_carries_schema_and_image() {
        let request = OllamaGenerateRequest {
            model: "m".to_string(),
            prompt: "p".to_string(),
            system: None,
            stream: false,
            format: Some(serde_json::json!({"type": "object"})),
            images: Some(vec!["aGk=".to_string()]),
            options: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["format"]["type"], "object");
        assert_eq!(json["images"][0], "aGk=");
        assert!(json.get("system").is_none());
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = OllamaClient::new(
            "http://ollama:11434/".to_string(),
            DEFAULT_MODEL.to_string(),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(client.base_url, "http://ollama:11434");
    }

    #[tokio::test]
    #[ignore] // Only run when Ollama is running
    async fn test_model_available() {
        assert!(local_client().verify_model().await.unwrap());
    }
}
