//! Connection probe and failover proxy for the relational store.
//!
//! The proxy is bound exactly once, when it is constructed. [`FailoverProxy::probe`]
//! tries to acquire one pooled MySQL connection within a bounded timeout; on
//! success every later call goes to the pool, on any failure every later call
//! goes to the [`QueryEmulator`]. The binding never changes afterwards: a
//! store that comes up later is only adopted by restarting the process.
//!
//! The binding is an owned value rather than process-wide state, so tests
//! can construct either mode directly with [`FailoverProxy::live`] and
//! [`FailoverProxy::emulated`].

use std::sync::Arc;
use std::time::Duration;

use sqlx::MySqlPool;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use tracing::{debug, error, info, warn};

use super::emulator::QueryEmulator;
use super::mysql::MySqlExecutor;
use crate::db::repository::RelationalExecutor;
use crate::db::{DbError, DbResult, QueryOutcome, SqlValue, StoreMode};

/// Credentials and pool settings for the relational store.
#[derive(Debug, Clone)]
pub struct RelationalConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Maximum pooled connections.
    pub pool_size: u32,
    /// Upper bound for the startup probe.
    pub probe_timeout: Duration,
}

impl Default for RelationalConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            database: "Metamax".to_string(),
            pool_size: 10,
            probe_timeout: Duration::from_millis(2000),
        }
    }
}

impl RelationalConfig {
    /// Options for the server itself, without selecting a database.
    pub fn server_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
    }

    pub fn connect_options(&self) -> MySqlConnectOptions {
        self.server_options().database(&self.database)
    }
}

#[derive(Debug, Clone)]
enum Delegate {
    Live(Arc<MySqlExecutor>),
    Emulated(Arc<QueryEmulator>),
}

/// Pass-through to whichever relational delegate was bound at startup.
#[derive(Debug, Clone)]
pub struct FailoverProxy {
    delegate: Delegate,
}

impl FailoverProxy {
    /// Probe the configured store and bind to it, or to the emulator.
    ///
    /// Never fails: connection errors and timeouts select the emulator.
    pub async fn probe(config: &RelationalConfig) -> Self {
        info!(
            host = %config.host,
            port = config.port,
            user = %config.user,
            database = %config.database,
            "Attempting MySQL connection"
        );

        let pool = MySqlPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(config.probe_timeout)
            .connect_lazy_with(config.connect_options());

        let failure = match tokio::time::timeout(config.probe_timeout, pool.acquire()).await {
            Ok(Ok(conn)) => {
                drop(conn);
                info!("MySQL connected successfully");
                return Self::live(pool);
            }
            Ok(Err(e)) => DbError::Connection {
                message: e.to_string(),
            },
            Err(_) => DbError::Connection {
                message: format!("probe timed out after {:?}", config.probe_timeout),
            },
        };

        error!(error = %failure, "MySQL connection failed");
        warn!("Switching to in-memory relational emulator");
        Self::emulated()
    }

    /// Bind to an already established pool.
    pub fn live(pool: MySqlPool) -> Self {
        Self {
            delegate: Delegate::Live(Arc::new(MySqlExecutor::new(pool))),
        }
    }

    /// Bind to the in-memory emulator.
    pub fn emulated() -> Self {
        Self {
            delegate: Delegate::Emulated(Arc::new(QueryEmulator::new())),
        }
    }

    pub fn mode(&self) -> StoreMode {
        match self.delegate {
            Delegate::Live(_) => StoreMode::Live,
            Delegate::Emulated(_) => StoreMode::Fallback,
        }
    }

    /// The live pool, when bound to the real store.
    pub fn pool(&self) -> Option<&MySqlPool> {
        match &self.delegate {
            Delegate::Live(executor) => Some(executor.pool()),
            Delegate::Emulated(_) => None,
        }
    }

    /// Forward a statement verbatim to the bound delegate.
    pub async fn query(&self, statement: &str, params: &[SqlValue]) -> DbResult<QueryOutcome> {
        debug!(delegate = %self.mode(), statement, params = params.len(), "relational query");
        match &self.delegate {
            Delegate::Live(executor) => executor.query(statement, params).await,
            Delegate::Emulated(emulator) => emulator.query(statement, params).await,
        }
    }
}
