use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error};

use crate::config::ChatConfig;
use crate::error::{Error, Result};
use crate::types::Turn;

/// Sampling temperature sent with every completion request.
pub const TEMPERATURE: f32 = 0.5;

/// Output-length cap sent with every completion request.
pub const MAX_TOKENS: u32 = 700;

/// Trait for completion API implementations.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send the prompt and return the first completion's text.
    ///
    /// `Ok(None)` means the API answered successfully but the response held
    /// no usable text.
    async fn complete(&self, messages: &[Turn]) -> Result<Option<String>>;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Turn],
    temperature: f32,
    max_tokens: u32,
}

/// Non-streaming client for OpenAI-compatible `/chat/completions`.
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    model: String,
    url: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: String, url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            url,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, messages: &[Turn]) -> Result<Option<String>> {
        let body = CompletionRequest {
            model: &self.model,
            messages,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        debug!(model = %self.model, messages = messages.len(), "sending completion request");

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            error!(%status, body = %text, "completion API error");
            return Err(Error::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        let data: serde_json::Value = response.json().await?;
        Ok(first_choice_text(&data))
    }
}

/// Text of `choices[0].message.content`, if present and non-empty.
pub fn first_choice_text(data: &serde_json::Value) -> Option<String> {
    data.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .filter(|text| !text.is_empty())
        .map(String::from)
}

/// Create a provider from config. `None` when no API key is configured.
pub fn from_config(config: &ChatConfig) -> Option<OpenAiProvider> {
    let api_key = config.api_key.clone()?;
    Some(OpenAiProvider::new(
        api_key,
        config.model().to_string(),
        config.completions_url(),
    ))
}

#[cfg(test)]
mod tests {
    use super::first_choice_text;
    use serde_json::json;

    #[test]
    fn reads_first_choice_content() {
        let data = json!({
            "choices": [
                {"message": {"role": "assistant", "content": "first"}},
                {"message": {"role": "assistant", "content": "second"}}
            ]
        });
        assert_eq!(first_choice_text(&data).as_deref(), Some("first"));
    }

    #[test]
    fn missing_or_empty_content_is_none() {
        assert_eq!(first_choice_text(&json!({})), None);
        assert_eq!(first_choice_text(&json!({"choices": []})), None);
        assert_eq!(
            first_choice_text(&json!({"choices": [{"message": {"content": null}}]})),
            None
        );
        assert_eq!(
            first_choice_text(&json!({"choices": [{"message": {"content": ""}}]})),
            None
        );
    }
}
