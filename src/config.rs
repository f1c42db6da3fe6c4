use std::env;
use std::fmt;

/// Default Groq OpenAI-compatible API base.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
/// Default completion model.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
/// Sampling temperature for idea generation.
pub const DEFAULT_TEMPERATURE: f64 = 0.8;
/// Token budget for one completion.
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
/// Port the relay binds when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 3000;

/// Process-wide configuration, built once at startup and passed by reference.
/// Nothing reads the environment after this is constructed.
#[derive(Clone)]
pub struct AppConfig {
    /// Upstream credential. `None` means the relay refuses generation
    /// requests with a distinct error instead of attempting the call.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            port: DEFAULT_PORT,
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("port", &self.port)
            .finish()
    }
}

impl AppConfig {
    /// Reads `GROQ_API_KEY`, `GROQ_BASE_URL`, `GROQ_MODEL`, and `PORT`,
    /// falling back to the defaults above. An empty `GROQ_API_KEY` counts
    /// as absent.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(key) = env::var("GROQ_API_KEY") {
            if !key.trim().is_empty() {
                config.api_key = Some(key);
            }
        }
        if let Ok(base_url) = env::var("GROQ_BASE_URL") {
            if !base_url.trim().is_empty() {
                config.base_url = base_url.trim_end_matches('/').to_string();
            }
        }
        if let Ok(model) = env::var("GROQ_MODEL") {
            if !model.trim().is_empty() {
                config.model = model;
            }
        }
        if let Ok(port) = env::var("PORT") {
            if let Ok(port) = port.parse() {
                config.port = port;
            }
        }
        config
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_upstream_contract() {
        let config = AppConfig::default();
        assert!(!config.has_credential());
        assert_eq!(config.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(config.model, "llama-3.3-70b-versatile");
        assert_eq!(config.temperature, 0.8);
        assert_eq!(config.max_tokens, 2000);
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn debug_redacts_the_credential() {
        let config = AppConfig {
            api_key: Some("gsk_secret".to_string()),
            ..AppConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("gsk_secret"));
    }
}
