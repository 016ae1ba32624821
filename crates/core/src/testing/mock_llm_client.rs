//! Mock classifier for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::categorizer::{CompletionRequest, CompletionResponse, LlmClient, LlmError, LlmUsage};

/// One scripted classifier reply.
#[derive(Debug, Clone)]
pub struct MockReply {
    kind: ReplyKind,
    delay: Option<Duration>,
}

#[derive(Debug, Clone)]
enum ReplyKind {
    Text(String),
    ConnectionFailed,
    RateLimited,
    ProtocolError,
    NotConfigured,
}

impl MockReply {
    /// Reply with free text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: ReplyKind::Text(text.into()),
            delay: None,
        }
    }

    /// Fail as if the endpoint were unreachable.
    pub fn connection_failed() -> Self {
        Self {
            kind: ReplyKind::ConnectionFailed,
            delay: None,
        }
    }

    /// Fail with a rate-limit error.
    pub fn rate_limited() -> Self {
        Self {
            kind: ReplyKind::RateLimited,
            delay: None,
        }
    }

    /// Fail with an undecodable response body.
    pub fn protocol_error() -> Self {
        Self {
            kind: ReplyKind::ProtocolError,
            delay: None,
        }
    }

    /// Fail as if credentials were missing or rejected.
    pub fn not_configured() -> Self {
        Self {
            kind: ReplyKind::NotConfigured,
            delay: None,
        }
    }

    /// Wait before replying (uses tokio time, so it honors paused clocks).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn into_result(self, model: &str) -> Result<CompletionResponse, LlmError> {
        match self.kind {
            ReplyKind::Text(text) => Ok(CompletionResponse {
                text,
                usage: LlmUsage {
                    input_tokens: 100,
                    output_tokens: 10,
                },
                model: model.to_string(),
            }),
            ReplyKind::ConnectionFailed => {
                Err(LlmError::Http("connection refused".to_string()))
            }
            ReplyKind::RateLimited => Err(LlmError::RateLimited("too many requests".to_string())),
            ReplyKind::ProtocolError => Err(LlmError::Json("unexpected end of input".to_string())),
            ReplyKind::NotConfigured => Err(LlmError::NotConfigured("missing api key".to_string())),
        }
    }
}

/// Mock implementation of the LlmClient trait.
///
/// Replies are taken from a FIFO queue; once it is empty the default reply
/// is used. Every prompt is recorded for assertions.
#[derive(Debug)]
pub struct MockLlmClient {
    queue: Mutex<VecDeque<MockReply>>,
    default_reply: Mutex<MockReply>,
    prompts: Mutex<Vec<String>>,
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLlmClient {
    /// Create a mock that fails with a connection error unless scripted otherwise.
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            default_reply: Mutex::new(MockReply::connection_failed()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that always replies with `text`.
    pub fn always(text: impl Into<String>) -> Self {
        let mock = Self::new();
        mock.set_default_reply(MockReply::text(text));
        mock
    }

    /// Queue a reply for the next call.
    pub fn push_reply(&self, reply: MockReply) {
        self.queue.lock().unwrap().push_back(reply);
    }

    /// Set the reply used once the queue is drained.
    pub fn set_default_reply(&self, reply: MockReply) {
        *self.default_reply.lock().unwrap() = reply;
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Prompts received, in call order.
    pub fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn next_reply(&self) -> MockReply {
        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default_reply.lock().unwrap().clone())
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-classifier"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.prompts.lock().unwrap().push(request.prompt);
        let reply = self.next_reply();

        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }

        reply.into_result(self.model())
    }
}
