use std::sync::Arc;

use triage_core::{Categorizer, Config, SanitizedConfig, TicketStore};

/// Shared application state
pub struct AppState {
    config: Config,
    ticket_store: Arc<dyn TicketStore>,
    categorizer: Arc<Categorizer>,
}

impl AppState {
    pub fn new(
        config: Config,
        ticket_store: Arc<dyn TicketStore>,
        categorizer: Arc<Categorizer>,
    ) -> Self {
        Self {
            config,
            ticket_store,
            categorizer,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn ticket_store(&self) -> &dyn TicketStore {
        self.ticket_store.as_ref()
    }

    pub fn categorizer(&self) -> &Categorizer {
        &self.categorizer
    }
}
