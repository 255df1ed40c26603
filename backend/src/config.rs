use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::services::language::LanguageCode;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub inference: InferenceConfig,
    pub search: SearchConfig,
    pub language: LanguageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on request bodies, uploads included (default: 10 MiB)
    pub max_body_bytes: usize,
    /// Requests handled at once before new ones wait (default: 8)
    pub max_concurrent_requests: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub base_url: String,
    pub text_model: String,
    pub vision_model: String,
    #[serde(deserialize_with = "deserialize_duration_secs")]
    pub text_timeout_secs: u64,
    #[serde(deserialize_with = "deserialize_duration_secs")]
    pub vision_timeout_secs: u64,
    #[serde(deserialize_with = "deserialize_duration_secs")]
    pub health_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub num_results: usize,
    #[serde(deserialize_with = "deserialize_duration_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    /// Language used when detection has nothing to go on
    pub default: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Config {
    /// Load configuration with environment variable override support
    ///
    /// Loading order:
    /// 1. Load `.env` (if any) into the process environment
    /// 2. Load from the given path, or the first config.toml found
    /// 3. Override with environment variables (prefixed with APP_)
    /// 4. Validate the final configuration
    pub fn load(path: Option<&str>) -> Result<Self, anyhow::Error> {
        if let Ok(env_file) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", env_file.display());
        }

        let mut config = match path.map(str::to_string).or_else(Self::find_config_file) {
            Some(config_path) => {
                tracing::info!("Loading configuration from {}", config_path);
                Self::from_toml(&config_path)?
            },
            None => {
                tracing::warn!("Configuration file not found, using defaults");
                Config::default()
            },
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - APP_SERVER_HOST / APP_SERVER_PORT
    /// - APP_LOG_LEVEL: Logging level (e.g., "info,ai_chat_gateway=debug")
    /// - APP_INFERENCE_URL: Base URL of the inference backend
    /// - APP_TEXT_MODEL / APP_VISION_MODEL: Model names
    /// - APP_TEXT_TIMEOUT / APP_VISION_TIMEOUT: Generation timeouts (accepts "120", "2m")
    /// - APP_DEFAULT_LANGUAGE: Fallback language code
    /// - APP_SEARCH_ENABLED: Enable/disable web search enrichment (true/false)
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("APP_SERVER_HOST") {
            self.server.host = host;
            tracing::info!("Override server.host from env: {}", self.server.host);
        }

        if let Ok(port) = std::env::var("APP_SERVER_PORT")
            && let Ok(port) = port.parse()
        {
            self.server.port = port;
            tracing::info!("Override server.port from env: {}", self.server.port);
        }

        if let Ok(level) = std::env::var("APP_LOG_LEVEL") {
            self.logging.level = level;
            tracing::info!("Override logging.level from env: {}", self.logging.level);
        }

        if let Ok(url) = std::env::var("APP_INFERENCE_URL") {
            self.inference.base_url = url;
            tracing::info!("Override inference.base_url from env: {}", self.inference.base_url);
        }

        if let Ok(model) = std::env::var("APP_TEXT_MODEL") {
            self.inference.text_model = model;
            tracing::info!("Override inference.text_model from env: {}", self.inference.text_model);
        }

        if let Ok(model) = std::env::var("APP_VISION_MODEL") {
            self.inference.vision_model = model;
            tracing::info!(
                "Override inference.vision_model from env: {}",
                self.inference.vision_model
            );
        }

        for (var, slot) in [
            ("APP_TEXT_TIMEOUT", &mut self.inference.text_timeout_secs),
            ("APP_VISION_TIMEOUT", &mut self.inference.vision_timeout_secs),
        ] {
            if let Ok(raw) = std::env::var(var) {
                match parse_duration_to_secs(&raw) {
                    Ok(val) => {
                        *slot = val;
                        tracing::info!("Override {} from env: {}s", var, val);
                    },
                    Err(e) => tracing::warn!("Invalid {} '{}': {} (keep {})", var, raw, e, slot),
                }
            }
        }

        if let Ok(lang) = std::env::var("APP_DEFAULT_LANGUAGE") {
            self.language.default = lang;
            tracing::info!("Override language.default from env: {}", self.language.default);
        }

        if let Ok(enabled) = std::env::var("APP_SEARCH_ENABLED")
            && let Ok(val) = enabled.parse()
        {
            self.search.enabled = val;
            tracing::info!("Override search.enabled from env: {}", self.search.enabled);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }
        if self.server.max_body_bytes == 0 {
            anyhow::bail!("server.max_body_bytes must be > 0");
        }
        if self.server.max_concurrent_requests == 0 {
            anyhow::bail!("server.max_concurrent_requests must be > 0");
        }

        if self.inference.base_url.trim().is_empty() {
            anyhow::bail!("inference.base_url cannot be empty");
        }
        if self.inference.text_model.trim().is_empty()
            || self.inference.vision_model.trim().is_empty()
        {
            anyhow::bail!("inference.text_model and inference.vision_model must be set");
        }
        if self.inference.text_timeout_secs == 0
            || self.inference.vision_timeout_secs == 0
            || self.inference.health_timeout_secs == 0
        {
            anyhow::bail!("inference timeouts must be > 0");
        }

        if !(1..=10).contains(&self.search.num_results) {
            anyhow::bail!("search.num_results must be between 1 and 10");
        }
        if self.search.timeout_secs == 0 {
            anyhow::bail!("search.timeout_secs must be > 0");
        }

        if LanguageCode::parse(&self.language.default).is_none() {
            anyhow::bail!(
                "language.default '{}' is not one of: {}",
                self.language.default,
                LanguageCode::ALL.map(|c| c.as_str()).join(", ")
            );
        }

        Ok(())
    }

    /// Default language as a typed code; falls back to Vietnamese if validation was skipped
    pub fn default_language(&self) -> LanguageCode {
        LanguageCode::parse(&self.language.default).unwrap_or(LanguageCode::Vi)
    }

    fn find_config_file() -> Option<String> {
        let possible_paths =
            ["conf/config.toml", "config.toml", "./backend/conf/config.toml"];

        for path in &possible_paths {
            if Path::new(path).exists() {
                return Some(path.to_string());
            }
        }
        None
    }

    fn from_toml(path: &str) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl InferenceConfig {
    pub fn text_timeout(&self) -> Duration {
        Duration::from_secs(self.text_timeout_secs)
    }

    pub fn vision_timeout(&self) -> Duration {
        Duration::from_secs(self.vision_timeout_secs)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_body_bytes: 10 * 1024 * 1024,
            max_concurrent_requests: 8,
        }
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            text_model: "gemma2:9b".to_string(),
            vision_model: "llava:7b".to_string(),
            text_timeout_secs: 120,
            vision_timeout_secs: 180,
            health_timeout_secs: 5,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://html.duckduckgo.com/html/".to_string(),
            num_results: 3,
            timeout_secs: 5,
        }
    }
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self { default: LanguageCode::Vi.as_str().to_string() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info,ai_chat_gateway=debug".to_string(), file: None }
    }
}

// =========================
// Helpers for parsing values
// =========================

fn parse_duration_to_secs(input: &str) -> Result<u64, String> {
    // Accept plain numbers (treated as seconds)
    if let Ok(val) = input.parse::<u64>() {
        return Ok(val);
    }

    let s = input.trim().to_lowercase();
    let (num_str, unit) = s.split_at(s.chars().take_while(|c| c.is_ascii_digit()).count());
    if num_str.is_empty() || unit.is_empty() {
        return Err("missing number or unit".into());
    }
    let n: u64 = num_str.parse().map_err(|_| "invalid number".to_string())?;
    match unit {
        "s" | "sec" | "secs" | "second" | "seconds" => Ok(n),
        "m" | "min" | "mins" | "minute" | "minutes" => Ok(n * 60),
        "h" | "hr" | "hour" | "hours" => Ok(n * 60 * 60),
        _ => Err(format!("unsupported unit: {}", unit)),
    }
}

// Accepts numeric or human-friendly string values
fn deserialize_duration_secs<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct Visitor;
    impl<'de> serde::de::Visitor<'de> for Visitor {
        type Value = u64;
        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a number of seconds or a string like '30s', '5m', '1h'")
        }
        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(v)
        }
        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            if v >= 0 { Ok(v as u64) } else { Err(E::custom("negative not allowed")) }
        }
        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            parse_duration_to_secs(v).map_err(E::custom)
        }
    }
    deserializer.deserialize_any(Visitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_to_secs() {
        assert_eq!(parse_duration_to_secs("120"), Ok(120));
        assert_eq!(parse_duration_to_secs("30s"), Ok(30));
        assert_eq!(parse_duration_to_secs("3m"), Ok(180));
        assert_eq!(parse_duration_to_secs("1h"), Ok(3600));
        assert!(parse_duration_to_secs("5x").is_err());
        assert!(parse_duration_to_secs("m").is_err());
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_language(), LanguageCode::Vi);
        assert_eq!(config.inference.text_timeout(), Duration::from_secs(120));
        assert_eq!(config.inference.vision_timeout(), Duration::from_secs(180));
    }

    #[test]
    fn test_toml_accepts_human_durations() {
        let config: Config = toml::from_str(
            r#"
            [inference]
            text_model = "qwen2.5:7b"
            vision_timeout_secs = "4m"

            [language]
            default = "en"
            "#,
        )
        .unwrap();

        assert_eq!(config.inference.text_model, "qwen2.5:7b");
        assert_eq!(config.inference.vision_model, "llava:7b");
        assert_eq!(config.inference.vision_timeout_secs, 240);
        assert_eq!(config.default_language(), LanguageCode::En);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_default_language() {
        let mut config = Config::default();
        config.language.default = "fr".to_string();
        assert!(config.validate().is_err());
    }
}
