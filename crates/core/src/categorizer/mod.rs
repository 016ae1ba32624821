//! Categorizer - assigns support tickets to departments.
//!
//! Two tracks cooperate so that every ticket always gets a department:
//!
//! ```text
//! categorize(title, description)
//!   │
//!   ├─ classifier attempt 1..=max_retries ── LlmClient::complete
//!   │     ├─ valid "Department:" line ──────────► result (source = classifier)
//!   │     ├─ unknown/missing department ───────► retry immediately
//!   │     └─ transport/rate-limit/protocol ────► sleep retry_delay, retry
//!   │
//!   └─ exhausted ──► KeywordScorer::score ──────► result (source = keywords)
//! ```
//!
//! The classifier is any [`LlmClient`]: Anthropic, a local Ollama server, or
//! the scripted mock in [`crate::testing`].

mod department;
mod gateway;
mod keywords;
mod llm;
mod prompt;
mod types;

pub use department::{Department, UnknownDepartment};
pub use gateway::Categorizer;
pub use keywords::{keywords_for, KeywordScorer};
pub use llm::{
    create_llm_client, AnthropicClient, CompletionRequest, CompletionResponse, LlmClient,
    LlmError, LlmUsage, OllamaClient,
};
pub use prompt::{build_prompt, parse_response, ParsedResponse};
pub use types::{clamp_confidence, CategorizationResult, CategorizationSource};
