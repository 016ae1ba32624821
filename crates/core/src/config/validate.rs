use super::{types::Config, ConfigError, LlmProvider};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - At least one classifier attempt, confidences within 0..=100
/// - LLM model is set, Anthropic has a key or a proxy base URL
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    let categorizer = &config.categorizer;

    if categorizer.max_retries == 0 {
        return Err(ConfigError::ValidationError(
            "categorizer.max_retries must be at least 1".to_string(),
        ));
    }

    for (name, value) in [
        ("default_confidence", categorizer.default_confidence),
        ("fallback_confidence", categorizer.fallback_confidence),
    ] {
        if value > 100 {
            return Err(ConfigError::ValidationError(format!(
                "categorizer.{} must be between 0 and 100, got {}",
                name, value
            )));
        }
    }

    if let Some(llm) = &categorizer.llm {
        if llm.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "categorizer.llm.model cannot be empty".to_string(),
            ));
        }
        let has_key = llm.api_key.as_ref().is_some_and(|k| !k.is_empty());
        if llm.provider == LlmProvider::Anthropic && !has_key && llm.api_base.is_none() {
            return Err(ConfigError::ValidationError(
                "categorizer.llm provider anthropic requires api_key or api_base".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CategorizerConfig, LlmConfig, ServerConfig};
    use std::net::IpAddr;

    fn llm(provider: LlmProvider, api_key: Option<&str>) -> LlmConfig {
        LlmConfig {
            provider,
            model: "some-model".to_string(),
            api_key: api_key.map(str::to_string),
            api_base: None,
            max_tokens: 1024,
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = Config {
            server: ServerConfig {
                host: "0.0.0.0".parse::<IpAddr>().unwrap(),
                port: 0,
            },
            ..Default::default()
        };
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_zero_retries_fails() {
        let config = Config {
            categorizer: CategorizerConfig {
                max_retries: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_confidence_out_of_range() {
        let config = Config {
            categorizer: CategorizerConfig {
                fallback_confidence: 101,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("fallback_confidence"));
    }

    #[test]
    fn test_validate_anthropic_requires_key() {
        let config = Config {
            categorizer: CategorizerConfig {
                llm: Some(llm(LlmProvider::Anthropic, None)),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());

        let config = Config {
            categorizer: CategorizerConfig {
                llm: Some(llm(LlmProvider::Anthropic, Some("sk-test"))),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_ollama_no_key_required() {
        let config = Config {
            categorizer: CategorizerConfig {
                llm: Some(llm(LlmProvider::Ollama, None)),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_empty_model_fails() {
        let mut bad = llm(LlmProvider::Ollama, None);
        bad.model = "  ".to_string();
        let config = Config {
            categorizer: CategorizerConfig {
                llm: Some(bad),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }
}
