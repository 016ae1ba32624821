use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Attempts per categorization when none is configured.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Backoff after a failed classifier call, in seconds.
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 2;
/// Confidence used when the classifier names a department but no confidence.
pub const DEFAULT_CONFIDENCE: u8 = 70;
/// Confidence used when keyword scoring finds nothing.
pub const DEFAULT_FALLBACK_CONFIDENCE: u8 = 30;
/// Per-call classifier timeout, in seconds.
pub const DEFAULT_CLASSIFIER_TIMEOUT_SECS: u64 = 30;
/// Completion token limit for classifier calls.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub categorizer: CategorizerConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    5000
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("tickets.db")
}

/// Categorization pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CategorizerConfig {
    /// Classifier attempts before falling back to keyword scoring.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay after a failed classifier call, in seconds.
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    /// Confidence when the classifier omits one.
    #[serde(default = "default_confidence")]
    pub default_confidence: u8,
    /// Confidence when keyword scoring matches nothing.
    #[serde(default = "default_fallback_confidence")]
    pub fallback_confidence: u8,
    /// Per-call classifier timeout, in seconds.
    #[serde(default = "default_classifier_timeout")]
    pub timeout_secs: u64,
    /// Classifier backend. Without it, tickets are categorized by keywords only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm: Option<LlmConfig>,
}

impl CategorizerConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for CategorizerConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
            default_confidence: default_confidence(),
            fallback_confidence: default_fallback_confidence(),
            timeout_secs: default_classifier_timeout(),
            llm: None,
        }
    }
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_retry_delay_secs() -> u64 {
    DEFAULT_RETRY_DELAY_SECS
}

fn default_confidence() -> u8 {
    DEFAULT_CONFIDENCE
}

fn default_fallback_confidence() -> u8 {
    DEFAULT_FALLBACK_CONFIDENCE
}

fn default_classifier_timeout() -> u64 {
    DEFAULT_CLASSIFIER_TIMEOUT_SECS
}

/// LLM provider type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    /// Anthropic Claude API.
    Anthropic,
    /// Local Ollama instance.
    Ollama,
}

/// LLM client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// LLM provider.
    pub provider: LlmProvider,
    /// Model name/identifier.
    pub model: String,
    /// API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Custom API base URL (for proxies or self-hosted).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Maximum tokens for completions.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub categorizer: SanitizedCategorizerConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCategorizerConfig {
    pub max_retries: u32,
    pub retry_delay_secs: u64,
    pub default_confidence: u8,
    pub fallback_confidence: u8,
    pub timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm: Option<SanitizedLlmConfig>,
}

/// Sanitized LLM config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedLlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    pub api_key_configured: bool,
    pub max_tokens: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let categorizer = &config.categorizer;
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            categorizer: SanitizedCategorizerConfig {
                max_retries: categorizer.max_retries,
                retry_delay_secs: categorizer.retry_delay_secs,
                default_confidence: categorizer.default_confidence,
                fallback_confidence: categorizer.fallback_confidence,
                timeout_secs: categorizer.timeout_secs,
                llm: categorizer.llm.as_ref().map(|llm| SanitizedLlmConfig {
                    provider: llm.provider.clone(),
                    model: llm.model.clone(),
                    api_base: llm.api_base.clone(),
                    api_key_configured: llm.api_key.as_ref().is_some_and(|k| !k.is_empty()),
                    max_tokens: llm.max_tokens,
                }),
            },
        }
    }
}
