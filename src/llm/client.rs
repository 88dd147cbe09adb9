use anyhow::{Context, Result, anyhow};
use async_openai::{Client, config::OpenAIConfig, error::OpenAIError};
use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use super::response::request_single_text_response;
use super::secrets::{API_KEY_ENV, ApiKeySource, get_api_key_from_sources};
use crate::config::Settings;

/// Unstructured reply text from the model for one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelReply {
    pub raw_text: String,
}

#[derive(Debug, Error)]
pub enum LlmError {
    /// Transport, quota or API error reported by the model service.
    #[error("model request failed: {0}")]
    Request(#[from] OpenAIError),

    #[error("model returned an empty response")]
    EmptyResponse,
}

#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<ModelReply, LlmError>;
}

/// Gemini through its OpenAI-compatible endpoint.
pub struct GeminiClient {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl GeminiClient {
    pub fn new(api_key: &str, settings: &Settings) -> Self {
        Self {
            client: initialize_client(api_key, &settings.base_url),
            model: settings.model.clone(),
            temperature: settings.temperature,
        }
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<ModelReply, LlmError> {
        info!(model = %self.model, prompt_len = prompt.len(), "calling model");
        match request_single_text_response(&self.client, &self.model, self.temperature, prompt)
            .await
        {
            Ok(raw_text) => {
                info!(reply_len = raw_text.len(), "model replied");
                Ok(ModelReply { raw_text })
            }
            Err(err) => {
                warn!(error = %err, "model call failed");
                Err(err)
            }
        }
    }
}

/// Resolves the credential or fails; the caller must stop before any UI starts.
pub fn require_api_key() -> Result<String> {
    let lookup = get_api_key_from_sources()?;
    lookup.api_key.ok_or_else(|| {
        anyhow!(
            "🚨 {} is missing! Set it in your environment or a .env file, or run `tutor llm --set <KEY>`.",
            API_KEY_ENV
        )
    })
}

pub async fn test_configured_api_key(settings: &Settings) -> Result<ApiKeySource> {
    let lookup = get_api_key_from_sources()?;
    let (Some(key), Some(source)) = (lookup.api_key, lookup.source) else {
        return Err(anyhow!(
            "No API key configured. Set {} or run `tutor llm --set <KEY>`.",
            API_KEY_ENV
        ));
    };
    let client = initialize_client(&key, &settings.base_url);
    healthcheck_client(&client).await?;
    Ok(source)
}

fn initialize_client(api_key: &str, base_url: &str) -> Client<OpenAIConfig> {
    let config = OpenAIConfig::new()
        .with_api_base(base_url)
        .with_api_key(api_key);
    Client::with_config(config)
}

async fn healthcheck_client(client: &Client<OpenAIConfig>) -> Result<()> {
    client
        .models()
        .list()
        .await
        .context("Failed to validate API key with the model service")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_from_settings() {
        let settings = Settings::default();
        let client = GeminiClient::new("test-key", &settings);
        assert_eq!(client.model, settings.model);
        assert!((client.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn client_is_object_safe() {
        let settings = Settings::default();
        let client: Box<dyn ModelClient> = Box::new(GeminiClient::new("test-key", &settings));
        drop(client);
    }

    mod http {
        use httpmock::prelude::*;
        use serde_json::json;

        use super::*;

        const COMPLETIONS_PATH: &str = "/v1beta/openai/chat/completions";

        fn client(server: &MockServer) -> GeminiClient {
            let settings = Settings {
                base_url: server.url("/v1beta/openai"),
                ..Settings::default()
            };
            GeminiClient::new("test-key", &settings)
        }

        fn completion(content: &str) -> serde_json::Value {
            json!({
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "created": 1_700_000_000,
                "model": "gemini-2.0-flash",
                "choices": [{
                    "index": 0,
                    "message": { "role": "assistant", "content": content },
                    "finish_reason": "stop"
                }]
            })
        }

        #[tokio::test]
        async fn reply_text_is_trimmed() {
            let server = MockServer::start_async().await;
            let chat = server
                .mock_async(|when, then| {
                    when.method(POST).path(COMPLETIONS_PATH);
                    then.status(200)
                        .json_body(completion("\n### 3. *Definition*:\nof high quality  \n"));
                })
                .await;

            let reply = client(&server).complete("prompt").await.unwrap();

            chat.assert_async().await;
            assert_eq!(reply.raw_text, "### 3. *Definition*:\nof high quality");
        }

        #[tokio::test]
        async fn blank_reply_is_empty_response() {
            let server = MockServer::start_async().await;
            server
                .mock_async(|when, then| {
                    when.method(POST).path(COMPLETIONS_PATH);
                    then.status(200).json_body(completion("   "));
                })
                .await;

            let err = client(&server).complete("prompt").await.unwrap_err();
            assert!(matches!(err, LlmError::EmptyResponse));
        }

        #[tokio::test]
        async fn service_error_is_a_request_error() {
            let server = MockServer::start_async().await;
            let chat = server
                .mock_async(|when, then| {
                    when.method(POST).path(COMPLETIONS_PATH);
                    then.status(400).json_body(json!({
                        "error": {
                            "message": "API key not valid. Please pass a valid API key.",
                            "type": "invalid_request_error",
                            "param": null,
                            "code": null
                        }
                    }));
                })
                .await;

            let err = client(&server).complete("prompt").await.unwrap_err();

            chat.assert_calls_async(1).await;
            assert!(matches!(err, LlmError::Request(_)));
        }
    }

    #[test]
    fn empty_response_message() {
        assert_eq!(
            LlmError::EmptyResponse.to_string(),
            "model returned an empty response"
        );
    }
}
