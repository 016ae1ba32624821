pub mod categorizer;
pub mod config;
pub mod metrics;
pub mod routing;
pub mod testing;
pub mod ticket;

pub use categorizer::{
    CategorizationResult, CategorizationSource, Categorizer, Department, KeywordScorer, LlmClient,
    LlmError,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use routing::{
    reroute_ticket, route_ticket, routing_statistics, validate_routing_rules, RoutingError,
    RoutingStatistics, RoutingValidation,
};
pub use ticket::{
    CreateTicketRequest, SqliteTicketStore, Ticket, TicketError, TicketFilter, TicketStatistics,
    TicketStatus, TicketStore,
};
