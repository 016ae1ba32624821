//! SQLite-backed ticket store implementation.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::types::round2;
use super::{
    CreateTicketRequest, Ticket, TicketError, TicketFilter, TicketStatistics, TicketStatus,
    TicketStore,
};
use crate::categorizer::Department;

/// Bucket name used in statistics for tickets that were never routed.
const UNASSIGNED: &str = "unassigned";

const SELECT_COLUMNS: &str = "SELECT id, title, description, user_name, user_email, department, confidence_score, status, created_at, updated_at FROM tickets";

/// SQLite-backed ticket store.
pub struct SqliteTicketStore {
    conn: Mutex<Connection>,
}

impl SqliteTicketStore {
    /// Create a new SQLite ticket store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, TicketError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        info!("Ticket database ready at {:?}", path);
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite ticket store (useful for testing).
    pub fn in_memory() -> Result<Self, TicketError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), TicketError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS tickets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                user_name TEXT NOT NULL,
                user_email TEXT NOT NULL,
                department TEXT,
                confidence_score INTEGER,
                status TEXT NOT NULL DEFAULT 'pending',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_department ON tickets(department);
            CREATE INDEX IF NOT EXISTS idx_status ON tickets(status);
            "#,
        )?;
        Ok(())
    }

    fn timestamp(now: DateTime<Utc>) -> String {
        // Fixed width so lexicographic order matches time order
        now.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn build_where_clause(filter: &TicketFilter) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(department) = filter.department {
            conditions.push("department = ?");
            params.push(Box::new(department.as_str()));
        }

        if let Some(status) = filter.status {
            conditions.push("status = ?");
            params.push(Box::new(status.as_str()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params)
    }

    fn row_to_ticket(row: &rusqlite::Row) -> rusqlite::Result<Ticket> {
        let department: Option<String> = row.get(5)?;
        let confidence_score: Option<i64> = row.get(6)?;
        let status: String = row.get(7)?;
        let created_at_str: String = row.get(8)?;
        let updated_at_str: String = row.get(9)?;

        // Parse timestamps - use default if parsing fails (shouldn't happen with valid data)
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        let updated_at = DateTime::parse_from_rfc3339(&updated_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(Ticket {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            user_name: row.get(3)?,
            user_email: row.get(4)?,
            department: department.and_then(|d| d.parse().ok()),
            confidence_score: confidence_score.map(|c| c.clamp(0, 100) as u8),
            status: status.parse().unwrap_or_default(),
            created_at,
            updated_at,
        })
    }

    fn fetch(conn: &Connection, id: i64) -> Result<Option<Ticket>, TicketError> {
        let ticket = conn
            .query_row(
                &format!("{} WHERE id = ?", SELECT_COLUMNS),
                params![id],
                Self::row_to_ticket,
            )
            .optional()?;
        Ok(ticket)
    }

    fn grouped_counts(conn: &Connection, column: &str) -> Result<BTreeMap<String, i64>, TicketError> {
        let sql = format!(
            "SELECT {col}, COUNT(*) FROM tickets GROUP BY {col}",
            col = column
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            let key: Option<String> = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((key.unwrap_or_else(|| UNASSIGNED.to_string()), count))
        })?;

        let mut counts = BTreeMap::new();
        for row in rows {
            let (key, count) = row?;
            counts.insert(key, count);
        }
        Ok(counts)
    }
}

impl TicketStore for SqliteTicketStore {
    fn create(&self, request: CreateTicketRequest) -> Result<Ticket, TicketError> {
        let conn = self.conn.lock().unwrap();

        let timestamp = Self::timestamp(Utc::now());
        let status = TicketStatus::Pending;

        conn.execute(
            "INSERT INTO tickets (title, description, user_name, user_email, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                request.title,
                request.description,
                request.user_name,
                request.user_email,
                status.as_str(),
                timestamp,
                timestamp,
            ],
        )?;

        let id = conn.last_insert_rowid();
        debug!("Created ticket {} for user {}", id, request.user_name);

        // Read back so timestamps carry the stored precision
        Self::fetch(&conn, id)?.ok_or(TicketError::NotFound(id))
    }

    fn get(&self, id: i64) -> Result<Option<Ticket>, TicketError> {
        let conn = self.conn.lock().unwrap();
        Self::fetch(&conn, id)
    }

    fn exists(&self, id: i64) -> Result<bool, TicketError> {
        let conn = self.conn.lock().unwrap();
        let found = conn
            .query_row("SELECT 1 FROM tickets WHERE id = ?", params![id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    fn list(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, TicketError> {
        let conn = self.conn.lock().unwrap();

        let (where_clause, params) = Self::build_where_clause(filter);

        let sql = format!(
            "{} {} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            SELECT_COLUMNS, where_clause
        );

        let mut stmt = conn.prepare(&sql)?;

        // Build parameter slice with limit and offset
        let mut all_params: Vec<Box<dyn rusqlite::ToSql>> = params;
        all_params.push(Box::new(filter.limit));
        all_params.push(Box::new(filter.offset));

        let param_refs: Vec<&dyn rusqlite::ToSql> = all_params.iter().map(|p| p.as_ref()).collect();

        let rows = stmt.query_map(param_refs.as_slice(), Self::row_to_ticket)?;

        let mut tickets = Vec::new();
        for row_result in rows {
            tickets.push(row_result?);
        }

        Ok(tickets)
    }

    fn count(&self, filter: &TicketFilter) -> Result<i64, TicketError> {
        let conn = self.conn.lock().unwrap();

        let (where_clause, params) = Self::build_where_clause(filter);

        let sql = format!("SELECT COUNT(*) FROM tickets {}", where_clause);

        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let count: i64 = conn.query_row(&sql, param_refs.as_slice(), |row| row.get(0))?;

        Ok(count)
    }

    fn update_department(
        &self,
        id: i64,
        department: Department,
        confidence_score: u8,
    ) -> Result<Ticket, TicketError> {
        if confidence_score > 100 {
            return Err(TicketError::InvalidInput(
                "Confidence score must be between 0 and 100".to_string(),
            ));
        }

        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        let changed = conn.execute(
            "UPDATE tickets SET department = ?, confidence_score = ?, updated_at = ? WHERE id = ?",
            params![department.as_str(), confidence_score, Self::timestamp(now), id],
        )?;

        if changed == 0 {
            return Err(TicketError::NotFound(id));
        }

        debug!("Updated ticket {} department to {}", id, department);
        Self::fetch(&conn, id)?.ok_or(TicketError::NotFound(id))
    }

    fn update_status(&self, id: i64, status: TicketStatus) -> Result<Ticket, TicketError> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        let changed = conn.execute(
            "UPDATE tickets SET status = ?, updated_at = ? WHERE id = ?",
            params![status.as_str(), Self::timestamp(now), id],
        )?;

        if changed == 0 {
            return Err(TicketError::NotFound(id));
        }

        debug!("Updated ticket {} status to {}", id, status);
        Self::fetch(&conn, id)?.ok_or(TicketError::NotFound(id))
    }

    fn statistics(&self) -> Result<TicketStatistics, TicketError> {
        let conn = self.conn.lock().unwrap();

        let total_tickets: i64 = conn.query_row("SELECT COUNT(*) FROM tickets", [], |row| row.get(0))?;
        let by_department = Self::grouped_counts(&conn, "department")?;
        let by_status = Self::grouped_counts(&conn, "status")?;
        let average: Option<f64> = conn.query_row(
            "SELECT AVG(confidence_score) FROM tickets",
            [],
            |row| row.get(0),
        )?;

        Ok(TicketStatistics {
            total_tickets,
            by_department,
            by_status,
            average_confidence: round2(average.unwrap_or(0.0)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn create_test_store() -> SqliteTicketStore {
        SqliteTicketStore::in_memory().unwrap()
    }

    #[test]
    fn test_create_ticket() {
        let store = create_test_store();
        let request = fixtures::it_ticket();

        let ticket = store.create(request.clone()).unwrap();

        assert_eq!(ticket.id, 1);
        assert_eq!(ticket.title, request.title);
        assert_eq!(ticket.description, request.description);
        assert_eq!(ticket.user_name, request.user_name);
        assert_eq!(ticket.user_email, request.user_email);
        assert_eq!(ticket.status, TicketStatus::Pending);
        assert!(ticket.department.is_none());
        assert!(ticket.confidence_score.is_none());
    }

    #[test]
    fn test_ids_autoincrement() {
        let store = create_test_store();
        let first = store.create(fixtures::it_ticket()).unwrap();
        let second = store.create(fixtures::vague_ticket()).unwrap();
        assert_eq!(second.id, first.id + 1);
    }

    #[test]
    fn test_get_ticket() {
        let store = create_test_store();
        let created = store.create(fixtures::it_ticket()).unwrap();

        let fetched = store.get(created.id).unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.title, created.title);
        assert_eq!(fetched.status, TicketStatus::Pending);
    }

    #[test]
    fn test_get_nonexistent_ticket() {
        let store = create_test_store();
        assert!(store.get(42).unwrap().is_none());
        assert!(!store.exists(42).unwrap());
    }

    #[test]
    fn test_exists() {
        let store = create_test_store();
        let ticket = store.create(fixtures::it_ticket()).unwrap();
        assert!(store.exists(ticket.id).unwrap());
    }

    #[test]
    fn test_list_newest_first() {
        let store = create_test_store();
        for i in 0..3 {
            store
                .create(fixtures::ticket_request(&format!("Ticket {}", i), "Some description"))
                .unwrap();
        }

        let tickets = store.list(&TicketFilter::new()).unwrap();
        assert_eq!(tickets.len(), 3);
        assert_eq!(tickets[0].title, "Ticket 2");
        assert_eq!(tickets[2].title, "Ticket 0");
    }

    #[test]
    fn test_list_by_department_and_status() {
        let store = create_test_store();
        let a = store.create(fixtures::it_ticket()).unwrap();
        let b = store.create(fixtures::it_ticket()).unwrap();
        let c = store.create(fixtures::vague_ticket()).unwrap();

        store.update_department(a.id, Department::ItSupport, 80).unwrap();
        store.update_department(b.id, Department::ItSupport, 60).unwrap();
        store.update_department(c.id, Department::General, 30).unwrap();
        store.update_status(b.id, TicketStatus::Resolved).unwrap();

        let filter = TicketFilter::new().with_department(Department::ItSupport);
        assert_eq!(store.list(&filter).unwrap().len(), 2);
        assert_eq!(store.count(&filter).unwrap(), 2);

        let filter = filter.with_status(TicketStatus::Resolved);
        let tickets = store.list(&filter).unwrap();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].id, b.id);

        let filter = TicketFilter::new().with_department(Department::Finance);
        assert!(store.list(&filter).unwrap().is_empty());
    }

    #[test]
    fn test_list_pagination() {
        let store = create_test_store();
        for _ in 0..5 {
            store.create(fixtures::it_ticket()).unwrap();
        }

        let filter = TicketFilter::new().with_limit(2).with_offset(0);
        assert_eq!(store.list(&filter).unwrap().len(), 2);

        let filter = TicketFilter::new().with_limit(2).with_offset(4);
        assert_eq!(store.list(&filter).unwrap().len(), 1);

        // count ignores pagination
        assert_eq!(store.count(&filter).unwrap(), 5);
    }

    #[test]
    fn test_update_department() {
        let store = create_test_store();
        let ticket = store.create(fixtures::it_ticket()).unwrap();

        let updated = store
            .update_department(ticket.id, Department::ItSupport, 85)
            .unwrap();
        assert_eq!(updated.department, Some(Department::ItSupport));
        assert_eq!(updated.confidence_score, Some(85));
        assert!(updated.updated_at >= ticket.updated_at);

        let fetched = store.get(ticket.id).unwrap().unwrap();
        assert_eq!(fetched.department, Some(Department::ItSupport));
    }

    #[test]
    fn test_update_department_rejects_bad_confidence() {
        let store = create_test_store();
        let ticket = store.create(fixtures::it_ticket()).unwrap();
        let result = store.update_department(ticket.id, Department::Hr, 101);
        assert!(matches!(result, Err(TicketError::InvalidInput(_))));
    }

    #[test]
    fn test_update_nonexistent_ticket() {
        let store = create_test_store();
        assert!(matches!(
            store.update_department(9, Department::Hr, 50),
            Err(TicketError::NotFound(9))
        ));
        assert!(matches!(
            store.update_status(9, TicketStatus::Resolved),
            Err(TicketError::NotFound(9))
        ));
    }

    #[test]
    fn test_update_status() {
        let store = create_test_store();
        let ticket = store.create(fixtures::it_ticket()).unwrap();

        let updated = store.update_status(ticket.id, TicketStatus::InProgress).unwrap();
        assert_eq!(updated.status, TicketStatus::InProgress);

        let fetched = store.get(ticket.id).unwrap().unwrap();
        assert_eq!(fetched.status, TicketStatus::InProgress);
    }

    #[test]
    fn test_statistics_empty() {
        let store = create_test_store();
        let stats = store.statistics().unwrap();
        assert_eq!(stats.total_tickets, 0);
        assert!(stats.by_department.is_empty());
        assert!(stats.by_status.is_empty());
        assert_eq!(stats.average_confidence, 0.0);
    }

    #[test]
    fn test_statistics() {
        let store = create_test_store();
        let a = store.create(fixtures::it_ticket()).unwrap();
        let b = store.create(fixtures::it_ticket()).unwrap();
        let c = store.create(fixtures::vague_ticket()).unwrap();
        store.create(fixtures::vague_ticket()).unwrap();

        store.update_department(a.id, Department::ItSupport, 80).unwrap();
        store.update_department(b.id, Department::ItSupport, 60).unwrap();
        store.update_department(c.id, Department::General, 30).unwrap();
        store.update_status(a.id, TicketStatus::Resolved).unwrap();

        let stats = store.statistics().unwrap();
        assert_eq!(stats.total_tickets, 4);
        assert_eq!(stats.by_department["IT Support"], 2);
        assert_eq!(stats.by_department["General"], 1);
        assert_eq!(stats.by_department[UNASSIGNED], 1);
        assert_eq!(stats.by_status["pending"], 3);
        assert_eq!(stats.by_status["resolved"], 1);
        // (80 + 60 + 30) / 3
        assert_eq!(stats.average_confidence, 56.67);
    }

    #[test]
    fn test_file_based_store() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("tickets.db");

        let id = {
            let store = SqliteTicketStore::new(&db_path).unwrap();
            store.create(fixtures::it_ticket()).unwrap().id
        };

        assert!(db_path.exists());

        // Reopening keeps data and does not recreate the schema
        let store = SqliteTicketStore::new(&db_path).unwrap();
        assert!(store.get(id).unwrap().is_some());
    }
}
