//! LLM Client
//!
//! Chat-completion client for the hosted model that turns order text into
//! invoice JSON. One request per order, no retries.

use async_trait::async_trait;
use dreamhaven_utils::{build_invoice_prompt, CoercionDefaults, InvoiceError, InvoiceResult, LlmConfig, SYSTEM_PROMPT};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Source of raw invoice JSON text for one order.
#[async_trait]
pub trait InvoiceExtractor: Send + Sync {
    async fn extract(&self, order_details: &str) -> InvoiceResult<String>;
}

/// OpenAI-compatible chat-completion client
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    pricing: CoercionDefaults,
}

impl LlmClient {
    pub fn new(config: &LlmConfig) -> InvoiceResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| InvoiceError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            pricing: CoercionDefaults::default(),
        })
    }

    /// Tax rate and shipping quoted in the invoice prompt.
    pub fn with_pricing(mut self, pricing: CoercionDefaults) -> Self {
        self.pricing = pricing;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one system + user exchange and return the trimmed reply text.
    pub async fn complete(&self, system: &str, prompt: &str) -> InvoiceResult<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        debug!(model = %self.model, prompt_chars = prompt.len(), "Calling chat completion API");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, "Chat completion API returned an error");
            return Err(InvoiceError::external_service(
                "LLM API",
                format!("{}: {}", status, error_text),
            ));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| InvoiceError::external_service("LLM API", format!("Unreadable response: {}", e)))?;

        let content = result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(InvoiceError::external_service("LLM API", "No response content"));
        }

        Ok(content)
    }
}

#[async_trait]
impl InvoiceExtractor for LlmClient {
    async fn extract(&self, order_details: &str) -> InvoiceResult<String> {
        self.complete(SYSTEM_PROMPT, &build_invoice_prompt(order_details, self.pricing)).await
    }
}

/// Chat completion request
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn config_for(server: &MockServer) -> LlmConfig {
        LlmConfig {
            api_url: server.url("/v1"),
            api_key: "sk-test".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 800,
            temperature: 0.1,
            timeout_seconds: 5,
        }
    }

    #[tokio::test]
    async fn test_extract_sends_prompt_and_returns_content() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/chat/completions")
                    .header("authorization", "Bearer sk-test")
                    .body_contains("gpt-3.5-turbo")
                    .body_contains("Queen mattress");
                then.status(200).json_body(json!({
                    "choices": [{"message": {"role": "assistant", "content": "  {\"bill_to\": \"x\"}\n"}}]
                }));
            })
            .await;

        let client = LlmClient::new(&config_for(&server)).unwrap();
        let content = client.extract("Name: Jane\nQueen mattress").await.unwrap();

        mock.assert_async().await;
        assert_eq!(content, "{\"bill_to\": \"x\"}");
    }

    #[tokio::test]
    async fn test_error_status_is_external_service_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(401).body("invalid api key");
            })
            .await;

        let client = LlmClient::new(&config_for(&server)).unwrap();
        let err = client.extract("Name: Jane").await.unwrap_err();

        assert_eq!(err.error_code(), "EXTERNAL_SERVICE_ERROR");
        assert!(err.to_string().contains("invalid api key"));
    }

    #[tokio::test]
    async fn test_empty_choices_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(200).json_body(json!({"choices": []}));
            })
            .await;

        let client = LlmClient::new(&config_for(&server)).unwrap();
        assert!(client.extract("Name: Jane").await.is_err());
    }

    #[tokio::test]
    async fn test_prompt_quotes_configured_tax_rate() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/chat/completions")
                    .body_contains("Tax (7%)");
                then.status(200).json_body(json!({
                    "choices": [{"message": {"role": "assistant", "content": "{}"}}]
                }));
            })
            .await;

        let pricing = CoercionDefaults {
            tax_rate: 0.07,
            shipping: 69.0,
        };
        let client = LlmClient::new(&config_for(&server)).unwrap().with_pricing(pricing);
        client.extract("Name: Jane\nSofa").await.unwrap();

        mock.assert_async().await;
    }
}
