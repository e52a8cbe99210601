//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `luxhub.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values; secrets (the LIFX token and the Anthropic
//! key) are usually supplied that way.

use serde::Deserialize;

use luxhub_adapter_assistant::AssistantConfig;
use luxhub_adapter_lifx::LifxConfig;
use luxhub_app::activation::ActivationConfig;
use luxhub_app::executor::ExecutorConfig;
use luxhub_domain::matcher::Tolerances;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// LIFX cloud settings.
    pub lifx: LifxConfig,
    /// Language-model settings.
    pub assistant: AssistantConfig,
    /// Scene matcher tolerances and activation threshold.
    pub matcher: Tolerances,
    /// Activation tracker settings.
    pub activation: ActivationSection,
    /// Command executor settings.
    pub executor: ExecutorSection,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Activation tracker + poll loop configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ActivationSection {
    /// Seconds an activation may sit unconfirmed before failing open.
    pub timeout_secs: u64,
    /// Whether several scenes may show active at once.
    pub overlapping_active: bool,
    /// Seconds between directory polls.
    pub poll_interval_secs: u64,
}

/// Command executor configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ExecutorSection {
    /// Milliseconds between per-zone sub-commands.
    pub zone_delay_ms: u64,
}

impl Config {
    /// Load configuration from `luxhub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or a
    /// value fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("luxhub.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("LUXHUB_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("LUXHUB_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("LUXHUB_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Ok(val) = std::env::var("LUXHUB_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("LUXHUB_LIFX_TOKEN") {
            self.lifx.token = val;
        }
        if let Ok(val) = std::env::var("LUXHUB_ANTHROPIC_API_KEY") {
            self.assistant.api_key = val;
        }
        if let Ok(val) = std::env::var("LUXHUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if !(0.0..=1.0).contains(&self.matcher.threshold) || self.matcher.threshold == 0.0 {
            return Err(ConfigError::Validation(
                "matcher.threshold must be within (0, 1]".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.matcher.brightness) {
            return Err(ConfigError::Validation(
                "matcher.brightness must be within [0, 1]".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.matcher.saturation) {
            return Err(ConfigError::Validation(
                "matcher.saturation must be within [0, 1]".to_string(),
            ));
        }
        if !(0.0..=180.0).contains(&self.matcher.hue_degrees) {
            return Err(ConfigError::Validation(
                "matcher.hue_degrees must be within [0, 180]".to_string(),
            ));
        }
        if !self.assistant.model_is_known() {
            return Err(ConfigError::Validation(format!(
                "unknown assistant.model {:?}",
                self.assistant.model
            )));
        }
        if self.activation.poll_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "activation.poll_interval_secs must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Tracker settings for the application layer.
    #[must_use]
    pub fn activation_config(&self) -> ActivationConfig {
        ActivationConfig {
            timeout_secs: self.activation.timeout_secs,
            overlapping_active: self.activation.overlapping_active,
        }
    }

    /// Executor settings for the application layer.
    #[must_use]
    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            zone_delay_ms: self.executor.zone_delay_ms,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:luxhub.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "luxhubd=info,luxhub=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for ActivationSection {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            overlapping_active: false,
            poll_interval_secs: 2,
        }
    }
}

impl Default for ExecutorSection {
    fn default() -> Self {
        Self { zone_delay_ms: 300 }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.url, "sqlite:luxhub.db?mode=rwc");
        assert_eq!(config.activation.timeout_secs, 15);
        assert!(!config.activation.overlapping_active);
        assert_eq!(config.executor.zone_delay_ms, 300);
        assert!((config.matcher.threshold - 0.70).abs() < f64::EPSILON);
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = r#"
            [server]
            host = '127.0.0.1'
            port = 9090

            [database]
            url = 'sqlite:test.db'

            [logging]
            filter = 'debug'

            [lifx]
            token = 'c0ffee'
            rate_limit_max = 60

            [assistant]
            api_key = 'sk-ant-test'
            model = 'claude-sonnet-4-5-20250929'

            [matcher]
            brightness = 0.1
            hue_degrees = 15.0
            threshold = 0.8

            [activation]
            timeout_secs = 30
            overlapping_active = true
            poll_interval_secs = 5

            [executor]
            zone_delay_ms = 150
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.lifx.token, "c0ffee");
        assert_eq!(config.lifx.rate_limit_max, 60);
        assert!((config.matcher.threshold - 0.8).abs() < f64::EPSILON);
        assert!(config.activation.overlapping_active);
        assert_eq!(config.activation.poll_interval_secs, 5);
        assert_eq!(config.executor.zone_delay_ms, 150);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_out_of_range_threshold() {
        let mut config = Config::default();
        config.matcher.threshold = 1.5;
        assert!(config.validate().is_err());
        config.matcher.threshold = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_unknown_assistant_model() {
        let mut config = Config::default();
        config.assistant.model = "gpt-4".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_poll_interval() {
        let mut config = Config::default();
        config.activation.poll_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_format_bind_addr() {
        let config = Config::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn should_map_into_app_layer_configs() {
        let config = Config::default();
        let activation = config.activation_config();
        assert_eq!(activation.timeout_secs, 15);
        let executor = config.executor_config();
        assert_eq!(executor.zone_delay_ms, 300);
    }
}
