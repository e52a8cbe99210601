//! Anthropic messages client implementing the `Assistant` port.

use serde::Deserialize;

use luxhub_app::ports::{Assistant, AssistantContext, ProposedBatch};
use luxhub_domain::error::LuxhubError;

use crate::config::AssistantConfig;
use crate::error::AssistantError;
use crate::prompt;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

/// Assistant backed by the Anthropic messages API.
pub struct AnthropicAssistant {
    http: reqwest::Client,
    config: AssistantConfig,
}

impl AnthropicAssistant {
    /// Build a client with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::Http`] when the underlying client cannot
    /// be constructed.
    pub fn new(config: AssistantConfig) -> Result<Self, AssistantError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(AssistantError::Http)?;
        Ok(Self { http, config })
    }

    async fn complete(&self, system: &str, request: &str) -> Result<String, AssistantError> {
        let body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "system": system,
            "messages": [{"role": "user", "content": request}],
        });

        let response = self
            .http
            .post(format!("{}/v1/messages", self.config.base_url))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(AssistantError::Http)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::Status { status, body });
        }

        let decoded: MessagesResponse = response.json().await.map_err(AssistantError::Http)?;
        let text = decoded
            .content
            .into_iter()
            .map(|block| block.text)
            .find(|text| !text.is_empty())
            .ok_or(AssistantError::EmptyCompletion)?;
        Ok(text)
    }
}

/// Strip the markdown code fences some models wrap JSON in.
fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

fn parse_batch(text: &str) -> Result<ProposedBatch, AssistantError> {
    let cleaned = strip_code_fences(text);
    serde_json::from_str(cleaned).map_err(|source| AssistantError::Parse {
        raw: cleaned.to_string(),
        source,
    })
}

impl Assistant for AnthropicAssistant {
    #[tracing::instrument(skip_all, fields(model = %self.config.model))]
    async fn propose(
        &self,
        request: &str,
        context: &AssistantContext,
    ) -> Result<ProposedBatch, LuxhubError> {
        let system = prompt::build_system_prompt(&self.config.system_prompt, context);
        let text = self.complete(&system, request).await?;
        let batch = parse_batch(&text)?;
        tracing::debug!(actions = batch.actions.len(), "assistant proposed batch");
        Ok(batch)
    }
}
