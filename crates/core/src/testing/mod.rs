//! Testing utilities and mock implementations.
//!
//! Provides a scripted classifier so the categorization pipeline and the
//! HTTP layer can be exercised without a real LLM endpoint.
//!
//! # Example
//!
//! ```rust,ignore
//! use triage_core::testing::{MockLlmClient, MockReply};
//!
//! let classifier = MockLlmClient::new();
//! classifier.push_reply(MockReply::rate_limited());
//! classifier.push_reply(MockReply::text("Department: HR\nConfidence: 85"));
//!
//! let categorizer = Categorizer::new(config).with_client(Arc::new(classifier));
//! ```

mod mock_llm_client;

pub use mock_llm_client::{MockLlmClient, MockReply};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::ticket::CreateTicketRequest;

    /// A ticket request with reasonable defaults.
    pub fn ticket_request(title: &str, description: &str) -> CreateTicketRequest {
        CreateTicketRequest {
            title: title.to_string(),
            description: description.to_string(),
            user_name: "Jordan Doe".to_string(),
            user_email: "jordan@example.com".to_string(),
        }
    }

    /// A ticket request that keyword scoring routes to IT Support.
    pub fn it_ticket() -> CreateTicketRequest {
        ticket_request("Laptop will not boot", "Black screen after the update")
    }

    /// A ticket request that matches no keyword table.
    pub fn vague_ticket() -> CreateTicketRequest {
        ticket_request("Question", "Where is the nearest cafe?")
    }
}
