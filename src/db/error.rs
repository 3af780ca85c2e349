//! Database error types.
//!
//! This module provides the error taxonomy for the persistence layer.
//! It uses miette for fancy diagnostic output and thiserror for derive macros.
//!
//! A missing record is not an error: lookups return `Option` or an empty
//! list. Native errors from the real stores are wrapped without being rewritten so
//! callers see exactly what MySQL or MongoDB reported. The fallback delegates
//! never construct an error of their own.

use miette::Diagnostic;
use thiserror::Error;

/// Database operation errors.
#[derive(Error, Diagnostic, Debug)]
pub enum DbError {
    #[error("Invalid data: {message} (hint: {help})")]
    #[diagnostic(code(metamax::db::invalid_data))]
    InvalidData { message: String, help: String },

    #[error("Connection error: {message}")]
    #[diagnostic(code(metamax::db::connection_error))]
    Connection { message: String },

    #[error("MySQL error: {0}")]
    #[diagnostic(code(metamax::db::sql))]
    Sql(#[from] sqlx::Error),

    #[error("MongoDB error: {0}")]
    #[diagnostic(code(metamax::db::document))]
    Document(#[from] mongodb::error::Error),

    #[error("Secret hashing error: {message}")]
    #[diagnostic(code(metamax::db::secret))]
    Secret { message: String },
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::InvalidData {
            message: err.to_string(),
            help: "stored record does not match the record schema".to_string(),
        }
    }
}
