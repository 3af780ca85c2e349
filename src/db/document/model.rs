//! Hybrid document models.
//!
//! A [`HybridModel`] exposes one record kind through a single set of
//! operations and routes each call to MongoDB or to the in-memory store.
//! The choice is made per call from the current [`DocumentConnection`] state,
//! never cached, so the same model switches delegates when the store drops
//! out or comes back.
//!
//! Secret hashing runs in [`Doc::save`] before the delegate is chosen, so it
//! behaves identically in both modes.

use std::fmt;
use std::future::IntoFuture;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

use chrono::Utc;
use futures_util::future::BoxFuture;
use tracing::debug;

use super::connection::DocumentConnection;
use super::memory::MemoryStore;
use super::mongo::MongoBackend;
use crate::db::repository::DocumentBackend;
use crate::db::secret::verify_secret;
use crate::db::{
    Contact, DbResult, DocumentKind, Filter, FindOrder, Id, Project, SecretBearing, Sector,
    StoreMode, User,
};

/// Delegate chosen for a single call.
enum Delegate {
    Live(MongoBackend),
    Fallback(MemoryStore),
}

impl Delegate {
    fn mode(&self) -> StoreMode {
        match self {
            Delegate::Live(_) => StoreMode::Live,
            Delegate::Fallback(_) => StoreMode::Fallback,
        }
    }
}

impl DocumentBackend for Delegate {
    async fn find<T: DocumentKind>(&self, filter: &Filter, order: FindOrder) -> DbResult<Vec<T>> {
        match self {
            Delegate::Live(db) => db.find(filter, order).await,
            Delegate::Fallback(mem) => mem.find(filter, order).await,
        }
    }

    async fn find_one<T: DocumentKind>(&self, filter: &Filter) -> DbResult<Option<T>> {
        match self {
            Delegate::Live(db) => db.find_one(filter).await,
            Delegate::Fallback(mem) => mem.find_one(filter).await,
        }
    }

    async fn find_by_id<T: DocumentKind>(&self, id: &str) -> DbResult<Option<T>> {
        match self {
            Delegate::Live(db) => db.find_by_id(id).await,
            Delegate::Fallback(mem) => mem.find_by_id(id).await,
        }
    }

    async fn count<T: DocumentKind>(&self) -> DbResult<u64> {
        match self {
            Delegate::Live(db) => db.count::<T>().await,
            Delegate::Fallback(mem) => mem.count::<T>().await,
        }
    }

    async fn insert<T: DocumentKind>(&self, record: &T) -> DbResult<()> {
        match self {
            Delegate::Live(db) => db.insert(record).await,
            Delegate::Fallback(mem) => mem.insert(record).await,
        }
    }

    async fn replace<T: DocumentKind>(&self, record: &T) -> DbResult<()> {
        match self {
            Delegate::Live(db) => db.replace(record).await,
            Delegate::Fallback(mem) => DocumentBackend::replace(mem, record).await,
        }
    }

    async fn delete<T: DocumentKind>(&self, id: &str) -> DbResult<()> {
        match self {
            Delegate::Live(db) => db.delete::<T>(id).await,
            Delegate::Fallback(mem) => mem.delete::<T>(id).await,
        }
    }

    fn next_identity(&self) -> Id {
        match self {
            Delegate::Live(db) => db.next_identity(),
            Delegate::Fallback(mem) => mem.next_identity(),
        }
    }
}

/// Model for one document kind, routing each call to the current delegate.
pub struct HybridModel<T> {
    connection: DocumentConnection,
    memory: MemoryStore,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Clone for HybridModel<T> {
    fn clone(&self) -> Self {
        Self {
            connection: self.connection.clone(),
            memory: self.memory.clone(),
            _kind: PhantomData,
        }
    }
}

impl<T> fmt::Debug for HybridModel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HybridModel")
            .field("type", &std::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}

impl<T: DocumentKind> HybridModel<T> {
    pub fn new(connection: DocumentConnection, memory: MemoryStore) -> Self {
        Self {
            connection,
            memory,
            _kind: PhantomData,
        }
    }

    /// Mode the next call would use.
    pub fn mode(&self) -> StoreMode {
        self.delegate().mode()
    }

    fn delegate(&self) -> Delegate {
        match self.connection.live() {
            Some(db) => Delegate::Live(MongoBackend::new(db)),
            None => Delegate::Fallback(self.memory.clone()),
        }
    }

    fn delegate_for(&self, operation: &'static str) -> Delegate {
        let delegate = self.delegate();
        debug!(
            collection = T::COLLECTION,
            operation,
            mode = %delegate.mode(),
            "document call"
        );
        delegate
    }

    /// Wrap `record` in an unsaved document.
    pub fn new_doc(&self, record: T) -> Doc<T> {
        Doc {
            model: self.clone(),
            record,
            persisted: false,
        }
    }

    /// Insert `record` and return the saved document with its identity.
    pub async fn create(&self, record: T) -> DbResult<Doc<T>> {
        let mut doc = self.new_doc(record);
        doc.save().await?;
        Ok(doc)
    }

    /// Lazy query over the kind. Nothing runs until it is awaited.
    pub fn find(&self, filter: Filter) -> FindQuery<T> {
        FindQuery {
            model: self.clone(),
            filter,
            order: FindOrder::default(),
        }
    }

    /// First record matching `filter`.
    ///
    /// The in-memory store only compares the filter's first condition; an
    /// empty filter yields the oldest record.
    pub async fn find_one(&self, filter: &Filter) -> DbResult<Option<Doc<T>>> {
        let record = self.delegate_for("find_one").find_one::<T>(filter).await?;
        Ok(record.map(|r| self.persisted(r)))
    }

    /// Record with identity `id`; numeric and textual ids compare by their text.
    pub async fn find_by_id(&self, id: impl fmt::Display) -> DbResult<Option<Doc<T>>> {
        let id = id.to_string();
        let record = self
            .delegate_for("find_by_id")
            .find_by_id::<T>(&id)
            .await?;
        Ok(record.map(|r| self.persisted(r)))
    }

    pub async fn count_documents(&self) -> DbResult<u64> {
        self.delegate_for("count_documents").count::<T>().await
    }

    fn persisted(&self, record: T) -> Doc<T> {
        Doc {
            model: self.clone(),
            record,
            persisted: true,
        }
    }
}

/// Lazy, chainable `find`.
///
/// The delegate is chosen and the records are read when the query is
/// resolved, not when it is built: awaiting twice can yield different results.
#[must_use = "a FindQuery does nothing until awaited"]
pub struct FindQuery<T> {
    model: HybridModel<T>,
    filter: Filter,
    order: FindOrder,
}

impl<T: DocumentKind> FindQuery<T> {
    /// Order of the resolved records. Defaults to [`FindOrder::NewestFirst`].
    pub fn sort(mut self, order: FindOrder) -> Self {
        self.order = order;
        self
    }

    /// Resolve the query against the current delegate.
    pub async fn exec(self) -> DbResult<Vec<Doc<T>>> {
        let records = self
            .model
            .delegate_for("find")
            .find::<T>(&self.filter, self.order)
            .await?;
        Ok(records
            .into_iter()
            .map(|r| self.model.persisted(r))
            .collect())
    }
}

impl<T: DocumentKind> IntoFuture for FindQuery<T> {
    type Output = DbResult<Vec<Doc<T>>>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.exec())
    }
}

/// A record bound to its model, carrying the instance operations.
pub struct Doc<T> {
    model: HybridModel<T>,
    record: T,
    persisted: bool,
}

impl<T: fmt::Debug> fmt::Debug for Doc<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Doc")
            .field("record", &self.record)
            .field("persisted", &self.persisted)
            .finish()
    }
}

impl<T: DocumentKind> Doc<T> {
    /// Whether the document has not been saved yet.
    pub fn is_new(&self) -> bool {
        !self.persisted
    }

    pub fn into_inner(self) -> T {
        self.record
    }

    /// Insert the document, or replace the stored copy if already saved.
    ///
    /// First saves assign the creation timestamp and, when absent, the identity.
    pub async fn save(&mut self) -> DbResult<()> {
        self.record.before_save()?;

        let delegate = self.model.delegate_for("save");
        if self.persisted {
            return delegate.replace(&self.record).await;
        }

        if self.record.id().is_empty() {
            self.record.set_id(delegate.next_identity());
        }
        self.record.set_created_at(Utc::now());
        delegate.insert(&self.record).await?;
        self.persisted = true;
        Ok(())
    }

    /// Remove the stored record with this document's identity.
    ///
    /// The document counts as unsaved afterwards, so a later [`Doc::save`]
    /// inserts it again under the same identity.
    pub async fn delete_one(&mut self) -> DbResult<()> {
        self.model
            .delegate_for("delete_one")
            .delete::<T>(self.record.id())
            .await?;
        self.persisted = false;
        Ok(())
    }
}

impl<T: SecretBearing> Doc<T> {
    /// Check a candidate plaintext against the stored hash.
    pub fn match_secret(&self, candidate: &str) -> bool {
        verify_secret(candidate, self.record.secret())
    }
}

impl<T> Deref for Doc<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.record
    }
}

impl<T> DerefMut for Doc<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.record
    }
}

/// One model per document kind, sharing a connection and an in-memory store.
#[derive(Debug, Clone)]
pub struct Models {
    pub users: HybridModel<User>,
    pub projects: HybridModel<Project>,
    pub sectors: HybridModel<Sector>,
    pub contacts: HybridModel<Contact>,
}

impl Models {
    pub fn new(connection: DocumentConnection) -> Self {
        Self::with_memory(connection, MemoryStore::new())
    }

    pub fn with_memory(connection: DocumentConnection, memory: MemoryStore) -> Self {
        Self {
            users: HybridModel::new(connection.clone(), memory.clone()),
            projects: HybridModel::new(connection.clone(), memory.clone()),
            sectors: HybridModel::new(connection.clone(), memory.clone()),
            contacts: HybridModel::new(connection, memory),
        }
    }

    /// Mode the next document call would use.
    pub fn mode(&self) -> StoreMode {
        self.users.mode()
    }
}
