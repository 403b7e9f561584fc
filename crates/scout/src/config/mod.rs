use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Result, ScoutError};

/// Main configuration structure for Scout
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Chat completion provider configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Web search provider configuration
    #[serde(default)]
    pub search: SearchConfig,
}

impl Config {
    /// Load configuration from an explicit path, or from the first default
    /// location that exists. Falls back to defaults when no file is found.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = config_path {
            tracing::info!("Loading config from: {}", path.display());
            return Self::from_file(path);
        }

        let default_paths = [
            dirs::home_dir().map(|h| h.join(".scout").join("config.toml")),
            dirs::config_dir().map(|c| c.join("scout").join("config.toml")),
            Some(PathBuf::from("config.toml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ScoutError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str(&content)
            .map_err(|e| ScoutError::Config(format!("Failed to parse config: {e}")))
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8000")
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// CORS origins allowed to call the API (empty = any origin)
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            allowed_origins: Vec::new(),
        }
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0:8000".to_string()
}

/// Chat completion provider (OpenAI-compatible) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// API base URL; `/chat/completions` is appended
    #[serde(default = "default_llm_api_url")]
    pub api_url: String,
    /// Environment variable name for API key
    #[serde(default = "default_llm_api_key_env")]
    pub api_key_env: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: default_llm_api_url(),
            api_key_env: default_llm_api_key_env(),
        }
    }
}

fn default_llm_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

/// Web search provider (Perplexity) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// API base URL; `/chat/completions` is appended
    #[serde(default = "default_search_api_url")]
    pub api_url: String,
    /// Environment variable name for API key
    #[serde(default = "default_search_api_key_env")]
    pub api_key_env: String,
    /// Search model identifier
    #[serde(default = "default_search_model")]
    pub model: String,
    /// Request timeout in seconds
    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,
    /// Sampling temperature, kept low for focused answers
    #[serde(default = "default_search_temperature")]
    pub temperature: f32,
    /// Token budget for the search answer
    #[serde(default = "default_search_max_tokens")]
    pub max_tokens: u32,
    /// Presence penalty applied to discourage repetition
    #[serde(default = "default_search_presence_penalty")]
    pub presence_penalty: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_url: default_search_api_url(),
            api_key_env: default_search_api_key_env(),
            model: default_search_model(),
            timeout_secs: default_search_timeout_secs(),
            temperature: default_search_temperature(),
            max_tokens: default_search_max_tokens(),
            presence_penalty: default_search_presence_penalty(),
        }
    }
}

fn default_search_api_url() -> String {
    "https://api.perplexity.ai".to_string()
}

fn default_search_api_key_env() -> String {
    "PERPLEXITY_API_KEY".to_string()
}

fn default_search_model() -> String {
    "sonar-reasoning-pro".to_string()
}

fn default_search_timeout_secs() -> u64 {
    30
}

fn default_search_temperature() -> f32 {
    0.3
}

fn default_search_max_tokens() -> u32 {
    2000
}

fn default_search_presence_penalty() -> f32 {
    0.1
}

/// Provider credentials, resolved once at startup and read-only afterwards
#[derive(Clone, Default)]
pub struct Credentials {
    /// Key for the chat completion provider
    pub llm_api_key: Option<String>,
    /// Key for the search provider; absent means search degrades to an error string
    pub search_api_key: Option<String>,
}

impl Credentials {
    /// Read both keys from the environment variables named in the config.
    /// Empty values count as missing.
    pub fn from_env(config: &Config) -> Self {
        let read = |name: &str| env::var(name).ok().filter(|v| !v.trim().is_empty());

        Self {
            llm_api_key: read(&config.llm.api_key_env),
            search_api_key: read(&config.search.api_key_env),
        }
    }

    /// The LLM key, or a configuration error naming the variable to set
    pub fn require_llm_key(&self, config: &Config) -> Result<&str> {
        self.llm_api_key.as_deref().ok_or_else(|| {
            ScoutError::Config(format!(
                "API key env var '{}' not set",
                config.llm.api_key_env
            ))
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("llm_api_key", &self.llm_api_key.is_some())
            .field("search_api_key", &self.search_api_key.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server.listen_addr, "0.0.0.0:8000");
        assert!(config.server.allowed_origins.is_empty());
        assert_eq!(config.llm.api_url, "https://api.openai.com/v1");
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.search.api_url, "https://api.perplexity.ai");
        assert_eq!(config.search.api_key_env, "PERPLEXITY_API_KEY");
        assert_eq!(config.search.model, "sonar-reasoning-pro");
        assert_eq!(config.search.timeout_secs, 30);
        assert!((config.search.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.search.max_tokens, 2000);
        assert!((config.search.presence_penalty - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_str = r#"
[server]
listen_addr = "127.0.0.1:9000"
allowed_origins = ["http://localhost:3000"]

[llm]
api_url = "http://localhost:11434/v1"
api_key_env = "LOCAL_LLM_KEY"

[search]
api_url = "https://search.example.com"
model = "sonar"
timeout_secs = 5
temperature = 0.1
max_tokens = 512
presence_penalty = 0.0
"#;

        let config: Config = toml::from_str(toml_str).expect("Failed to parse TOML");

        assert_eq!(config.server.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.server.allowed_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.llm.api_url, "http://localhost:11434/v1");
        assert_eq!(config.llm.api_key_env, "LOCAL_LLM_KEY");
        assert_eq!(config.search.api_url, "https://search.example.com");
        assert_eq!(config.search.api_key_env, "PERPLEXITY_API_KEY");
        assert_eq!(config.search.model, "sonar");
        assert_eq!(config.search.timeout_secs, 5);
        assert_eq!(config.search.max_tokens, 512);
        assert!(config.search.presence_penalty.abs() < f32::EPSILON);
    }

    #[test]
    fn test_toml_partial_deserialization() {
        let toml_str = r#"
[search]
timeout_secs = 10
"#;

        let config: Config = toml::from_str(toml_str).expect("Failed to parse partial TOML");

        assert_eq!(config.search.timeout_secs, 10);
        assert_eq!(config.search.model, "sonar-reasoning-pro");
        assert_eq!(config.server.listen_addr, "0.0.0.0:8000");
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_load_from_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nlisten_addr = \"127.0.0.1:7777\"").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.server.listen_addr, "127.0.0.1:7777");
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(Some(&dir.path().join("missing.toml")));
        assert!(matches!(result, Err(ScoutError::Config(_))));
    }

    #[test]
    fn test_load_invalid_toml_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nlisten_addr = ").unwrap();

        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_require_llm_key_names_env_var() {
        let config = Config::default();
        let credentials = Credentials::default();

        let err = credentials.require_llm_key(&config).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_credentials_debug_hides_keys() {
        let credentials = Credentials {
            llm_api_key: Some("sk-secret".to_string()),
            search_api_key: None,
        };
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("llm_api_key: true"));
    }
}
