//! HTTP adapter for generateContent-style completion endpoints.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::InferenceError;

use super::InferenceClient;

/// Calls a hosted completion API over JSON. The endpoint is expected to
/// accept a `contents` array of user parts and answer with
/// `candidates[0].content.parts[0].text`.
pub struct HttpInferenceClient {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpInferenceClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    fn request_body(prompt: &str) -> Value {
        json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": prompt }]
                }
            ]
        })
    }

    fn extract_text(body: &Value) -> Option<String> {
        body.get("candidates")?
            .get(0)?
            .get("content")?
            .get("parts")?
            .get(0)?
            .get("text")?
            .as_str()
            .map(str::to_owned)
    }
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    async fn invoke(&self, prompt: &str) -> Result<String, InferenceError> {
        let url = format!("{}?key={}", self.endpoint, self.api_key);
        let response = self
            .client
            .post(&url)
            .json(&Self::request_body(prompt))
            .send()
            .await
            .map_err(|e| InferenceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, %body, "inference endpoint returned an error");
            return Err(InferenceError::Transport(format!("status {}", status)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| InferenceError::Malformed(e.to_string()))?;

        Self::extract_text(&body)
            .ok_or_else(|| InferenceError::Malformed("no candidate text in response".to_string()))
    }
}
