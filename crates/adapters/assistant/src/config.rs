//! Assistant configuration.

use serde::Deserialize;

/// Model ids the gateway accepts in configuration.
pub const KNOWN_MODELS: &[&str] = &[
    "claude-haiku-4-5-20251001",
    "claude-sonnet-4-5-20250929",
    "claude-opus-4-5-20251101",
];

/// Default model: fastest and cheapest of the known set.
pub const DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";

/// Configuration for the Anthropic messages client.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// API base URL.
    pub base_url: String,
    /// API key.
    pub api_key: String,
    /// Model id; must be one of [`KNOWN_MODELS`].
    pub model: String,
    /// Completion token cap.
    pub max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// System prompt override; empty means the built-in default.
    pub system_prompt: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.anthropic.com".to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1000,
            timeout_secs: 30,
            system_prompt: String::new(),
        }
    }
}

impl AssistantConfig {
    /// Whether the configured model is in the known list.
    #[must_use]
    pub fn model_is_known(&self) -> bool {
        KNOWN_MODELS.contains(&self.model.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_known_model() {
        let config = AssistantConfig::default();
        assert!(config.model_is_known());
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn should_reject_unknown_model() {
        let config = AssistantConfig {
            model: "claude-2".to_string(),
            ..AssistantConfig::default()
        };
        assert!(!config.model_is_known());
    }

    #[test]
    fn should_deserialize_from_toml() {
        let toml = r#"
            api_key = "sk-ant-test"
            model = "claude-sonnet-4-5-20250929"
            max_tokens = 800
        "#;
        let config: AssistantConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.api_key, "sk-ant-test");
        assert_eq!(config.model, "claude-sonnet-4-5-20250929");
        assert_eq!(config.max_tokens, 800);
        assert_eq!(config.timeout_secs, 30);
    }
}
