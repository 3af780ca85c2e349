//! Document subsystem: MongoDB with per-call fallback to an in-memory store.
//!
//! # Architecture
//!
//! - `connection`: live connection state consulted on every model call
//! - `model`: hybrid models, lazy `find` queries and document instances
//! - `mongo`: real delegate over the MongoDB driver
//! - `memory`: in-process emulator, one insertion-ordered list per kind

mod connection;
mod memory;
mod model;
mod mongo;

#[cfg(test)]
mod memory_test;
#[cfg(test)]
mod model_test;
#[cfg(all(test, feature = "mongo-tests"))]
mod live_test;

pub use connection::{DocumentConnection, ReadyState};
pub use memory::MemoryStore;
pub use model::{Doc, FindQuery, HybridModel, Models};
pub use mongo::MongoBackend;
