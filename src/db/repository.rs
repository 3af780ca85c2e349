//! Delegate traits for data access abstraction.
//!
//! Each subsystem has one contract and two implementations: the real store
//! and the in-process emulator. The failover proxy (relational) and the
//! hybrid model (document) pick an implementation and forward calls to it,
//! so nothing above this layer can tell which one answered.

use crate::db::{DbResult, DocumentKind, Filter, FindOrder, Id, QueryOutcome, SqlValue};

/// Executes relational statements with positional `?` parameters.
pub trait RelationalExecutor {
    /// Run one statement as an independently committed unit.
    async fn query(&self, statement: &str, params: &[SqlValue]) -> DbResult<QueryOutcome>;
}

/// Storage operations behind the hybrid document models.
pub trait DocumentBackend {
    /// All records matching `filter`, in the requested order.
    async fn find<T: DocumentKind>(&self, filter: &Filter, order: FindOrder) -> DbResult<Vec<T>>;

    /// First record matching `filter`.
    async fn find_one<T: DocumentKind>(&self, filter: &Filter) -> DbResult<Option<T>>;

    /// Record whose identity matches `id` textually.
    async fn find_by_id<T: DocumentKind>(&self, id: &str) -> DbResult<Option<T>>;

    /// Number of stored records of kind `T`.
    async fn count<T: DocumentKind>(&self) -> DbResult<u64>;

    /// Store a new record. Its identity is already assigned.
    async fn insert<T: DocumentKind>(&self, record: &T) -> DbResult<()>;

    /// Overwrite the stored record carrying the same identity.
    async fn replace<T: DocumentKind>(&self, record: &T) -> DbResult<()>;

    /// Remove the record with identity `id`. Missing records are not an error.
    async fn delete<T: DocumentKind>(&self, id: &str) -> DbResult<()>;

    /// Fresh identity for a record about to be inserted.
    fn next_identity(&self) -> Id;
}
