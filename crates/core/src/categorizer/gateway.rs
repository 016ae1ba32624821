//! Classifier gateway: bounded retries around an unreliable classifier,
//! with keyword scoring as the last resort.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::keywords::KeywordScorer;
use super::llm::{create_llm_client, CompletionRequest, LlmClient, LlmError};
use super::prompt::{build_prompt, parse_response};
use super::types::{CategorizationResult, CategorizationSource};
use crate::config::{CategorizerConfig, DEFAULT_MAX_TOKENS};
use crate::metrics::{
    CATEGORIZATIONS, CLASSIFIER_ATTEMPTS, EXTERNAL_SERVICE_DURATION, EXTERNAL_SERVICE_REQUESTS,
    LLM_TOKENS,
};

/// Longest slice of a rejected response echoed into logs.
const MAX_LOGGED_RESPONSE_CHARS: usize = 200;

/// Result of a single classifier attempt.
///
/// Hard failures back off before the next attempt; soft failures (the
/// classifier answered but named no known department) retry immediately.
#[derive(Debug)]
enum AttemptOutcome {
    Accepted(CategorizationResult),
    SoftFailure(String),
    HardFailure(LlmError),
}

/// Assigns tickets to departments. Every call yields a result.
pub struct Categorizer {
    config: CategorizerConfig,
    client: Option<Arc<dyn LlmClient>>,
    scorer: KeywordScorer,
    max_tokens: u32,
}

impl Categorizer {
    /// Create a categorizer with no classifier; every call uses keyword scoring.
    pub fn new(config: CategorizerConfig) -> Self {
        let scorer = KeywordScorer::new(config.fallback_confidence);
        let max_tokens = config
            .llm
            .as_ref()
            .map(|llm| llm.max_tokens)
            .unwrap_or(DEFAULT_MAX_TOKENS);
        Self {
            config,
            client: None,
            scorer,
            max_tokens,
        }
    }

    /// Create a categorizer, building the classifier client from `config.llm`.
    ///
    /// A missing or unusable LLM configuration is logged and leaves the
    /// categorizer in keyword-only mode.
    pub fn from_config(config: CategorizerConfig) -> Self {
        let client = match &config.llm {
            Some(llm_config) => match create_llm_client(llm_config) {
                Ok(client) => Some(client),
                Err(e) => {
                    warn!("Classifier unavailable, using keyword scoring only: {}", e);
                    None
                }
            },
            None => {
                info!("No classifier configured, using keyword scoring only");
                None
            }
        };

        let categorizer = Self::new(config);
        match client {
            Some(client) => categorizer.with_client(client),
            None => categorizer,
        }
    }

    /// Use the given classifier client.
    pub fn with_client(mut self, client: Arc<dyn LlmClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Whether an external classifier is wired in.
    pub fn has_classifier(&self) -> bool {
        self.client.is_some()
    }

    pub fn config(&self) -> &CategorizerConfig {
        &self.config
    }

    pub fn scorer(&self) -> &KeywordScorer {
        &self.scorer
    }

    /// Categorize a ticket.
    ///
    /// Tries the classifier up to `max_retries` times, then falls back to
    /// keyword scoring. Dropping the returned future cancels any pending
    /// call or backoff.
    pub async fn categorize(&self, title: &str, description: &str) -> CategorizationResult {
        let Some(client) = self.client.as_ref() else {
            debug!("No classifier available, scoring keywords directly");
            return self.fallback(title, description);
        };

        let prompt = build_prompt(title, description);
        let max_attempts = self.config.max_retries;

        for attempt in 1..=max_attempts {
            info!("Classifier attempt {}/{}", attempt, max_attempts);

            match self.attempt(client.as_ref(), &prompt).await {
                AttemptOutcome::Accepted(result) => {
                    CLASSIFIER_ATTEMPTS.with_label_values(&["accepted"]).inc();
                    CATEGORIZATIONS
                        .with_label_values(&[result.source.as_str()])
                        .inc();
                    info!(
                        "Categorized as: {} (confidence: {}%)",
                        result.department, result.confidence
                    );
                    return result;
                }
                AttemptOutcome::SoftFailure(reason) => {
                    CLASSIFIER_ATTEMPTS.with_label_values(&["soft_failure"]).inc();
                    warn!(
                        "Invalid department in classifier response (attempt {}): {}",
                        attempt, reason
                    );
                }
                AttemptOutcome::HardFailure(e) => {
                    CLASSIFIER_ATTEMPTS.with_label_values(&["hard_failure"]).inc();
                    warn!("Classifier error (attempt {}): {}", attempt, e);
                    if attempt < max_attempts {
                        tokio::time::sleep(self.config.retry_delay()).await;
                    }
                }
            }
        }

        warn!("All classifier attempts failed, using keyword fallback");
        self.fallback(title, description)
    }

    /// Re-run categorization for a ticket whose details or routing changed.
    pub async fn recategorize(&self, title: &str, description: &str) -> CategorizationResult {
        info!("Recategorizing ticket");
        self.categorize(title, description).await
    }

    async fn attempt(&self, client: &dyn LlmClient, prompt: &str) -> AttemptOutcome {
        let request = CompletionRequest::new(prompt).with_max_tokens(self.max_tokens);
        let timeout = self.config.timeout();
        let started = Instant::now();

        let outcome = tokio::time::timeout(timeout, client.complete(request)).await;

        EXTERNAL_SERVICE_DURATION
            .with_label_values(&[client.provider(), "classify"])
            .observe(started.elapsed().as_secs_f64());

        let response = match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                EXTERNAL_SERVICE_REQUESTS
                    .with_label_values(&[client.provider(), "classify", e.kind()])
                    .inc();
                return AttemptOutcome::HardFailure(e);
            }
            Err(_) => {
                EXTERNAL_SERVICE_REQUESTS
                    .with_label_values(&[client.provider(), "classify", "timeout"])
                    .inc();
                return AttemptOutcome::HardFailure(LlmError::Timeout(timeout));
            }
        };

        EXTERNAL_SERVICE_REQUESTS
            .with_label_values(&[client.provider(), "classify", "success"])
            .inc();
        LLM_TOKENS
            .with_label_values(&[client.provider(), "input"])
            .inc_by(response.usage.input_tokens as u64);
        LLM_TOKENS
            .with_label_values(&[client.provider(), "output"])
            .inc_by(response.usage.output_tokens as u64);

        debug!("Classifier response: {}", response.text);

        let parsed = parse_response(&response.text);
        match parsed.department {
            Some(department) => {
                let confidence = parsed
                    .confidence
                    .unwrap_or(self.config.default_confidence);
                AttemptOutcome::Accepted(CategorizationResult::new(
                    department,
                    confidence as i64,
                    CategorizationSource::Classifier,
                ))
            }
            None => AttemptOutcome::SoftFailure(format!(
                "no known department in {:?}",
                response
                    .text
                    .chars()
                    .take(MAX_LOGGED_RESPONSE_CHARS)
                    .collect::<String>()
            )),
        }
    }

    fn fallback(&self, title: &str, description: &str) -> CategorizationResult {
        let result = self.scorer.score(title, description);
        CATEGORIZATIONS
            .with_label_values(&[result.source.as_str()])
            .inc();
        result
    }
}
