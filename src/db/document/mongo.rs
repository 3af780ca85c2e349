//! MongoDB-backed document delegate.

use futures_util::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, Document, doc};
use mongodb::{Collection, Database};

use crate::db::repository::DocumentBackend;
use crate::db::{DbError, DbResult, DocumentKind, Filter, FindOrder, Id};

/// Native document store delegate for one database.
#[derive(Debug, Clone)]
pub struct MongoBackend {
    db: Database,
}

impl MongoBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn collection<T: DocumentKind>(&self) -> Collection<T> {
        self.db.collection::<T>(T::COLLECTION)
    }
}

/// Translate an equality filter into a BSON query document.
pub(crate) fn to_bson_filter(filter: &Filter) -> DbResult<Document> {
    let mut query = Document::new();
    for (field, value) in filter.iter() {
        let value = bson::to_bson(value).map_err(|e| DbError::InvalidData {
            message: e.to_string(),
            help: format!("filter value for '{field}' cannot be expressed as BSON"),
        })?;
        query.insert(field, value);
    }
    Ok(query)
}

/// Query matching a record by identity.
///
/// Identities are handled as text, but documents written by other clients
/// usually carry an ObjectId `_id`. A hex identity matches either form.
pub(crate) fn identity_filter(id: &str) -> Document {
    match ObjectId::parse_str(id) {
        Ok(oid) => doc! { "_id": { "$in": [oid, id] } },
        Err(_) => doc! { "_id": id },
    }
}

/// Replacement body for `record`, without its immutable `_id`.
fn replacement_document<T: DocumentKind>(record: &T) -> DbResult<Document> {
    let mut body = bson::to_document(record).map_err(|e| DbError::InvalidData {
        message: e.to_string(),
        help: format!("record in '{}' cannot be expressed as BSON", T::COLLECTION),
    })?;
    body.remove("_id");
    Ok(body)
}

fn sort_document(order: FindOrder) -> Document {
    match order {
        FindOrder::NewestFirst => doc! { "createdAt": -1 },
        FindOrder::OldestFirst => doc! { "createdAt": 1 },
    }
}

impl DocumentBackend for MongoBackend {
    async fn find<T: DocumentKind>(&self, filter: &Filter, order: FindOrder) -> DbResult<Vec<T>> {
        let cursor = self
            .collection::<T>()
            .find(to_bson_filter(filter)?)
            .sort(sort_document(order))
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_one<T: DocumentKind>(&self, filter: &Filter) -> DbResult<Option<T>> {
        Ok(self
            .collection::<T>()
            .find_one(to_bson_filter(filter)?)
            .await?)
    }

    async fn find_by_id<T: DocumentKind>(&self, id: &str) -> DbResult<Option<T>> {
        Ok(self.collection::<T>().find_one(identity_filter(id)).await?)
    }

    async fn count<T: DocumentKind>(&self) -> DbResult<u64> {
        Ok(self.collection::<T>().count_documents(doc! {}).await?)
    }

    async fn insert<T: DocumentKind>(&self, record: &T) -> DbResult<()> {
        self.collection::<T>().insert_one(record).await?;
        Ok(())
    }

    async fn replace<T: DocumentKind>(&self, record: &T) -> DbResult<()> {
        self.db
            .collection::<Document>(T::COLLECTION)
            .replace_one(identity_filter(record.id()), replacement_document(record)?)
            .await?;
        Ok(())
    }

    async fn delete<T: DocumentKind>(&self, id: &str) -> DbResult<()> {
        self.collection::<T>()
            .delete_one(identity_filter(id))
            .await?;
        Ok(())
    }

    fn next_identity(&self) -> Id {
        ObjectId::new().to_hex()
    }
}
