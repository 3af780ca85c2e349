//! Domain models for the persistence layer.
//!
//! Relational results are surfaced as loosely typed rows keyed by column name,
//! the same shape the route handlers consume regardless of which delegate
//! produced them. Document-backed records are strongly typed and share the
//! [`DocumentKind`] contract used by the hybrid model factory.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::db::DbResult;
use crate::db::secret::{hash_secret, is_hashed};

// =============================================================================
// Relational Surface
// =============================================================================

/// One relational row keyed by column name.
pub type Row = serde_json::Map<String, Value>;

/// Column sets of the relational tables, in schema order.
pub const ADMIN_COLUMNS: &[&str] = &["id", "username", "password", "created_at"];
pub const PROJECT_COLUMNS: &[&str] = &[
    "id",
    "title",
    "category",
    "description",
    "image",
    "created_at",
];
pub const SECTOR_COLUMNS: &[&str] = &[
    "id",
    "title",
    "category",
    "description",
    "image",
    "is_active",
    "created_at",
];
pub const CONTACT_MESSAGE_COLUMNS: &[&str] =
    &["id", "name", "email", "topic", "message", "created_at"];

/// Positional parameter bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Int(i64),
    Text(String),
    Bool(bool),
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v.into())
    }
}

impl From<u64> for SqlValue {
    fn from(v: u64) -> Self {
        // Identities above i64::MAX do not occur in practice; bind as text rather than wrap.
        i64::try_from(v)
            .map(SqlValue::Int)
            .unwrap_or_else(|_| SqlValue::Text(v.to_string()))
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// Acknowledgment returned for statements that do not produce rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteAck {
    #[serde(rename = "insertId")]
    pub insert_id: u64,
    #[serde(rename = "affectedRows")]
    pub affected_rows: u64,
}

/// Result of a relational statement: either a row set or a write acknowledgment.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Rows(Vec<Row>),
    Ack(WriteAck),
}

impl QueryOutcome {
    /// Rows produced by the statement. An acknowledgment carries none.
    pub fn rows(&self) -> &[Row] {
        match self {
            QueryOutcome::Rows(rows) => rows,
            QueryOutcome::Ack(_) => &[],
        }
    }

    pub fn into_rows(self) -> Vec<Row> {
        match self {
            QueryOutcome::Rows(rows) => rows,
            QueryOutcome::Ack(_) => Vec::new(),
        }
    }

    pub fn ack(&self) -> Option<WriteAck> {
        match self {
            QueryOutcome::Ack(ack) => Some(*ack),
            QueryOutcome::Rows(_) => None,
        }
    }
}

/// Which delegate is serving a subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreMode {
    /// The externally hosted store.
    Live,
    /// The in-process emulator.
    Fallback,
}

impl fmt::Display for StoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreMode::Live => write!(f, "live"),
            StoreMode::Fallback => write!(f, "fallback"),
        }
    }
}

// =============================================================================
// Document Query Types
// =============================================================================

/// Equality filter for document lookups, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `field == value` condition.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// The first condition. The in-memory emulator only interprets this one.
    pub fn first(&self) -> Option<(&str, &Value)> {
        self.conditions.first().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.conditions.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Ordering applied when a lazy `find` is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FindOrder {
    /// Most recently created first.
    #[default]
    NewestFirst,
    /// Creation order.
    OldestFirst,
}

// =============================================================================
// Document Record Kinds
// =============================================================================

/// Record identity. Empty until the record is first saved.
pub type Id = String;

/// Contract shared by every document-backed record kind.
pub trait DocumentKind:
    Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + Unpin + 'static
{
    /// Collection (and in-memory list) that owns records of this kind.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: Id);
    fn set_created_at(&mut self, at: DateTime<Utc>);

    /// Write-path side effect run before every insert or replace, in both modes.
    fn before_save(&mut self) -> DbResult<()> {
        Ok(())
    }
}

/// Record kinds carrying a hashed secret.
pub trait SecretBearing: DocumentKind {
    fn secret(&self) -> &str;
}

/// Accept textual, numeric or ObjectId identities; all are kept in textual
/// form. An ObjectId becomes its 24-character hex string.
fn deserialize_identity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Id, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawIdentity {
        Text(String),
        Signed(i64),
        Unsigned(u64),
        ObjectId {
            #[serde(rename = "$oid")]
            oid: String,
        },
    }

    Ok(match RawIdentity::deserialize(deserializer)? {
        RawIdentity::Text(s) => s,
        RawIdentity::Signed(n) => n.to_string(),
        RawIdentity::Unsigned(n) => n.to_string(),
        RawIdentity::ObjectId { oid } => oid,
    })
}

/// `createdAt` codec.
///
/// Written as epoch milliseconds. Read from epoch milliseconds or from a
/// BSON date in any of its extended JSON shapes, so records written by
/// other MongoDB clients load too.
mod created_at {
    use chrono::{DateTime, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        at: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        chrono::serde::ts_milliseconds::serialize(at, serializer)
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum DateValue {
        Millis(i64),
        Long {
            #[serde(rename = "$numberLong")]
            number_long: String,
        },
        Text(String),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Millis(i64),
        Date {
            #[serde(rename = "$date")]
            date: DateValue,
        },
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let millis = match RawTimestamp::deserialize(deserializer)? {
            RawTimestamp::Millis(ms)
            | RawTimestamp::Date {
                date: DateValue::Millis(ms),
            } => ms,
            RawTimestamp::Date {
                date: DateValue::Long { number_long },
            } => number_long
                .parse::<i64>()
                .map_err(|e| D::Error::custom(format!("invalid $numberLong: {e}")))?,
            RawTimestamp::Date {
                date: DateValue::Text(text),
            } => {
                return DateTime::parse_from_rfc3339(&text)
                    .map(|at| at.with_timezone(&Utc))
                    .map_err(|e| D::Error::custom(format!("invalid $date: {e}")));
            }
        };
        DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {millis}")))
    }
}

fn default_visible() -> bool {
    true
}

/// Administrator-equivalent account stored in the document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", default, deserialize_with = "deserialize_identity")]
    pub id: Id,
    pub username: String,
    pub password: String,
    #[serde(
        rename = "createdAt",
        with = "created_at",
        default = "Utc::now"
    )]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: Id::new(),
            username: username.into(),
            password: password.into(),
            created_at: Utc::now(),
        }
    }
}

impl DocumentKind for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: Id) {
        self.id = id;
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
    }

    fn before_save(&mut self) -> DbResult<()> {
        if !is_hashed(&self.password) {
            self.password = hash_secret(&self.password)?;
        }
        Ok(())
    }
}

impl SecretBearing for User {
    fn secret(&self) -> &str {
        &self.password
    }
}

/// Portfolio project shown on the public site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "_id", default, deserialize_with = "deserialize_identity")]
    pub id: Id,
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(
        rename = "createdAt",
        with = "created_at",
        default = "Utc::now"
    )]
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: Id::new(),
            title: title.into(),
            category: category.into(),
            description: None,
            image: None,
            created_at: Utc::now(),
        }
    }
}

impl DocumentKind for Project {
    const COLLECTION: &'static str = "projects";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: Id) {
        self.id = id;
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
    }
}

/// Industry sector card; hidden sectors stay stored but are not shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sector {
    #[serde(rename = "_id", default, deserialize_with = "deserialize_identity")]
    pub id: Id,
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(rename = "isVisible", default = "default_visible")]
    pub is_visible: bool,
    #[serde(
        rename = "createdAt",
        with = "created_at",
        default = "Utc::now"
    )]
    pub created_at: DateTime<Utc>,
}

impl Sector {
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: Id::new(),
            title: title.into(),
            category: category.into(),
            description: None,
            image: None,
            is_visible: true,
            created_at: Utc::now(),
        }
    }
}

impl DocumentKind for Sector {
    const COLLECTION: &'static str = "sectors";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: Id) {
        self.id = id;
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
    }
}

/// Message submitted through the public contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(rename = "_id", default, deserialize_with = "deserialize_identity")]
    pub id: Id,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub topic: Option<String>,
    pub message: String,
    #[serde(
        rename = "createdAt",
        with = "created_at",
        default = "Utc::now"
    )]
    pub created_at: DateTime<Utc>,
}

impl Contact {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Id::new(),
            name: name.into(),
            email: email.into(),
            topic: None,
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}

impl DocumentKind for Contact {
    const COLLECTION: &'static str = "contacts";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: Id) {
        self.id = id;
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
    }
}
