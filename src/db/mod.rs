//! Persistence layer with a live store and an in-process fallback per subsystem.
//!
//! Route handlers talk to two facades that hide which backend answered:
//! the relational [`FailoverProxy`] (MySQL or a statement emulator, chosen
//! once at startup) and the document [`Models`] (MongoDB or an in-memory
//! store, chosen again on every call).
//!
//! # Architecture
//!
//! - `error`: Storage-agnostic error types
//! - `models`: Relational rows and parameters, document record kinds
//! - `repository`: Delegate traits shared by the live and fallback backends
//! - `secret`: Secret hashing and the login comparison rule
//! - `relational`: Failover proxy, MySQL executor, emulator, schema
//! - `document`: Connection state, hybrid models, MongoDB and memory backends

mod error;
mod models;
mod repository;
mod secret;
pub mod utils;

pub mod document;
pub mod relational;


pub use document::{Doc, DocumentConnection, FindQuery, HybridModel, Models, ReadyState};
pub use error::{DbError, DbResult};
pub use models::*;
pub use relational::{
    AdminSeed, FailoverProxy, RelationalConfig, create_database, init_schema, prepare_database,
};
pub use repository::*;
pub use secret::{
    BOOTSTRAP_HASH, BOOTSTRAP_PLAINTEXT, HASH_MARKER, authenticate_admin, hash_secret, is_hashed,
    verify_login_secret, verify_secret,
};
