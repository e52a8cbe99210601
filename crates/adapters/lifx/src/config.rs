//! LIFX cloud configuration.

use serde::Deserialize;

/// Configuration for the LIFX cloud client.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LifxConfig {
    /// API base URL.
    pub base_url: String,
    /// Bearer token for the LIFX account.
    pub token: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Transition duration applied when a state change does not specify one.
    pub default_duration_secs: f64,
    /// Requests per quota window, used until the first response reports
    /// the real remaining budget.
    pub rate_limit_max: u32,
}

impl Default for LifxConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.lifx.com/v1".to_string(),
            token: String::new(),
            timeout_secs: 10,
            default_duration_secs: 1.0,
            rate_limit_max: 120,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_have_sensible_defaults() {
        let config = LifxConfig::default();
        assert_eq!(config.base_url, "https://api.lifx.com/v1");
        assert_eq!(config.timeout_secs, 10);
        assert!((config.default_duration_secs - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.rate_limit_max, 120);
    }

    #[test]
    fn should_deserialize_from_toml() {
        let toml = r#"
            base_url = "https://lifx.test/v1"
            token = "c0ffee"
            timeout_secs = 5
            default_duration_secs = 0.5
            rate_limit_max = 60
        "#;
        let config: LifxConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.base_url, "https://lifx.test/v1");
        assert_eq!(config.token, "c0ffee");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.rate_limit_max, 60);
    }

    #[test]
    fn should_use_defaults_for_missing_fields() {
        let config: LifxConfig = toml::from_str(r#"token = "c0ffee""#).unwrap();
        assert_eq!(config.token, "c0ffee");
        assert_eq!(config.base_url, "https://api.lifx.com/v1");
    }
}
