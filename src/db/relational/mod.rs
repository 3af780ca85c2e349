//! Relational subsystem: MySQL with a one-shot failover to an emulator.
//!
//! # Architecture
//!
//! - `proxy`: startup probe and the pass-through [`FailoverProxy`]
//! - `mysql`: real delegate over a SQLx pool
//! - `emulator`: demonstration fallback answering known statement shapes
//! - `schema`: explicit database and table creation, administrator seeding

mod emulator;
mod mysql;
mod proxy;
mod schema;


pub use emulator::{QueryEmulator, StatementShape};
pub use mysql::MySqlExecutor;
pub use proxy::{FailoverProxy, RelationalConfig};
pub use schema::{AdminSeed, create_database, init_schema, prepare_database};
