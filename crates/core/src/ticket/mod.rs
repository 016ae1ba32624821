//! Ticket records and their storage.

mod sqlite_store;
mod store;
mod types;

pub use sqlite_store::SqliteTicketStore;
pub use store::{CreateTicketRequest, TicketError, TicketFilter, TicketStore};
pub use types::{round2, Ticket, TicketStatistics, TicketStatus};
