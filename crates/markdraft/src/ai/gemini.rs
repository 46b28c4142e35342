use super::{style_prompt, text_prompt, Generator};
use crate::config::MarkdraftConfig;
use crate::error::{MarkdraftError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const API_KEY_HEADER: &str = "x-goog-api-key";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// [`Generator`] backed by the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    temperature: f32,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, config: &MarkdraftConfig) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(MarkdraftError::Generation("no API key configured".to_string()));
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(format!("markdraft/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| MarkdraftError::Generation(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            temperature: config.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    async fn complete(&self, prompt: String) -> Result<String> {
        let body = GenerateContentRequest::new(prompt, self.temperature);
        debug!(model = %self.model, "sending generateContent request");

        let response = self
            .client
            .post(self.url())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| MarkdraftError::Generation(format!("request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(%status, "generation request rejected");
            return Err(MarkdraftError::Generation(error_message(status.as_u16(), &detail)));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| MarkdraftError::Generation(format!("unreadable response: {err}")))?;
        extract_text(parsed)
    }
}

#[async_trait]
impl Generator for GeminiClient {
    async fn generate_text(&self, prompt: &str, context: &str) -> Result<String> {
        self.complete(text_prompt(prompt, context)).await
    }

    async fn generate_style_properties(
        &self,
        prompt: &str,
        element_description: &str,
    ) -> Result<String> {
        self.complete(style_prompt(prompt, element_description)).await
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    fn new(text: String, temperature: f32) -> Self {
        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part { text }],
            }],
            generation_config: GenerationConfig {
                temperature,
                top_p: 0.95,
                top_k: 40,
                max_output_tokens: 8192,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

fn extract_text(response: GenerateContentResponse) -> Result<String> {
    response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| MarkdraftError::Generation("response contained no text".to_string()))
}

fn error_message(status: u16, body: &str) -> String {
    let detail = serde_json::from_str::<ErrorWrapper>(body)
        .ok()
        .and_then(|wrapper| wrapper.error.message)
        .unwrap_or_else(|| body.trim().to_string());
    if detail.is_empty() {
        format!("service returned status {status}")
    } else {
        format!("service returned status {status}: {detail}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body_shape() {
        let body = GenerateContentRequest::new("Hello".to_string(), 0.7);
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "Hello");
        assert_eq!(value["generation_config"]["top_k"], 40);
        assert_eq!(value["generation_config"]["max_output_tokens"], 8192);
    }

    #[test]
    fn extracts_first_candidate_text() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "first" }], "role": "model" } },
                { "content": { "parts": [{ "text": "second" }] } }
            ]
        }))
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), "first");
    }

    #[test]
    fn missing_text_is_a_generation_error() {
        let response: GenerateContentResponse =
            serde_json::from_value(json!({ "candidates": [] })).unwrap();
        assert!(matches!(
            extract_text(response),
            Err(MarkdraftError::Generation(_))
        ));

        let blocked: GenerateContentResponse =
            serde_json::from_value(json!({ "promptFeedback": { "blockReason": "SAFETY" } }))
                .unwrap();
        assert!(extract_text(blocked).is_err());
    }

    #[test]
    fn error_body_message_is_surfaced() {
        let body = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(
            error_message(400, body),
            "service returned status 400: API key not valid"
        );
        assert_eq!(error_message(503, ""), "service returned status 503");
    }

    #[test]
    fn blank_key_is_rejected() {
        let config = MarkdraftConfig::default();
        assert!(GeminiClient::new("  ", &config).is_err());

        let client = GeminiClient::new("key", &config).unwrap();
        assert_eq!(client.model(), "gemini-2.0-flash");
        assert_eq!(
            client.url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }
}
