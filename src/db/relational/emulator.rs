//! In-memory relational query emulator.
//!
//! Recognises the handful of statement shapes the site issues by substring
//! and answers with synthesized rows that carry the real table's full column
//! set. Every other statement is acknowledged as a successful write with a
//! freshly generated identity.
//!
//! Writes are acknowledged but never persisted: a row inserted while the
//! emulator is bound does not appear in a later read.

use serde_json::{Value, json};
use tracing::warn;

use crate::db::repository::RelationalExecutor;
use crate::db::secret::BOOTSTRAP_HASH;
use crate::db::utils::{current_timestamp, generate_identity};
use crate::db::{DbResult, QueryOutcome, Row, SqlValue, WriteAck};

/// Statement shapes the emulator knows how to answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementShape {
    AdminLookup,
    ProjectListing,
    SectorListing,
    /// Anything else, answered with a write acknowledgment.
    Other,
}

impl StatementShape {
    pub fn classify(statement: &str) -> Self {
        if statement.contains("SELECT * FROM admins") {
            StatementShape::AdminLookup
        } else if statement.contains("SELECT * FROM projects") {
            StatementShape::ProjectListing
        } else if statement.contains("SELECT * FROM sectors") {
            StatementShape::SectorListing
        } else {
            StatementShape::Other
        }
    }
}

/// Demonstration stand-in for the MySQL pool.
#[derive(Debug, Clone)]
pub struct QueryEmulator {
    created_at: String,
}

impl Default for QueryEmulator {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryEmulator {
    pub fn new() -> Self {
        Self {
            created_at: current_timestamp(),
        }
    }

    /// Answer a statement. Parameters are accepted but not interpreted.
    pub fn respond(&self, statement: &str, _params: &[SqlValue]) -> QueryOutcome {
        warn!(statement, "[MOCK DB] executing SQL against the emulator");

        match StatementShape::classify(statement) {
            StatementShape::AdminLookup => QueryOutcome::Rows(vec![self.row(json!({
                "id": 1,
                "username": "admin",
                "password": BOOTSTRAP_HASH,
                "created_at": self.created_at,
            }))]),
            StatementShape::ProjectListing => QueryOutcome::Rows(vec![self.row(json!({
                "id": 1,
                "title": "MySQL Demo Project",
                "category": "infrastructure",
                "description": "Served from MySQL Mock",
                "image": "demo.jpg",
                "created_at": self.created_at,
            }))]),
            StatementShape::SectorListing => QueryOutcome::Rows(vec![self.row(json!({
                "id": 1,
                "title": "Mock Sector",
                "category": "aviation",
                "description": "Served from MySQL Mock",
                "image": "demo.jpg",
                "is_active": 1,
                "created_at": self.created_at,
            }))]),
            StatementShape::Other => QueryOutcome::Ack(WriteAck {
                insert_id: generate_identity(),
                affected_rows: 1,
            }),
        }
    }

    fn row(&self, value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => Row::new(),
        }
    }
}

impl RelationalExecutor for QueryEmulator {
    async fn query(&self, statement: &str, params: &[SqlValue]) -> DbResult<QueryOutcome> {
        Ok(self.respond(statement, params))
    }
}
