//! OpenAI-compatible `/chat/completions` client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, instrument, warn};

use hearth_common::ChatConfig;

use super::{ChatError, ChatTurn, LanguageModel};

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub struct HttpLanguageModel {
    client: reqwest::Client,
    config: ChatConfig,
}

impl HttpLanguageModel {
    pub fn new(config: ChatConfig) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChatError::Upstream(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }
}

#[async_trait]
impl LanguageModel for HttpLanguageModel {
    fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    #[instrument(skip(self, turns), fields(model = %self.config.model, turns = turns.len()))]
    async fn complete(&self, turns: &[ChatTurn]) -> Result<String, ChatError> {
        let api_key = self.config.api_key.as_deref().ok_or(ChatError::NotConfigured)?;

        let body = CompletionRequest {
            model: &self.config.model,
            messages: turns,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Chat upstream request failed");
                ChatError::Upstream(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Chat upstream returned an error");
            return Err(ChatError::from_upstream_status(status.as_u16(), &text));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Upstream(format!("invalid completion body: {e}")))?;

        let reply = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ChatError::Upstream("completion had no content".to_string()))?;

        info!(reply_len = reply.len(), "Chat completion received");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatRole;

    fn config(api_key: Option<&str>) -> ChatConfig {
        ChatConfig {
            api_key: api_key.map(String::from),
            base_url: "http://llm.test/v1".to_string(),
            model: "small".to_string(),
            max_tokens: 500,
            temperature: 0.7,
            timeout_secs: 5,
        }
    }

    #[test]
    fn request_body_shape() {
        let turns = [ChatTurn::new(ChatRole::User, "hi")];
        let body = CompletionRequest {
            model: "small",
            messages: &turns,
            max_tokens: 500,
            temperature: 0.7,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_tokens"], 500);
    }

    #[test]
    fn configured_only_with_key() {
        let model = HttpLanguageModel::new(config(None)).unwrap();
        assert!(!model.is_configured());
        assert_eq!(model.endpoint(), "http://llm.test/v1/chat/completions");
        assert!(HttpLanguageModel::new(config(Some("k"))).unwrap().is_configured());
    }

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        let model = HttpLanguageModel::new(config(None)).unwrap();
        let err = model
            .complete(&[ChatTurn::new(ChatRole::User, "hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::NotConfigured));
    }
}
