//! Relational schema initialisation.
//!
//! The failover proxy performs no schema management. This module is run
//! explicitly (see the `--init-schema` flag of the API binary): it creates
//! the configured database when the server does not have it yet, then the
//! four tables, and seeds the first administrator.

use std::time::Duration;

use sqlx::MySqlPool;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use tracing::info;

use super::proxy::RelationalConfig;
use crate::db::secret::hash_secret;
use crate::db::{DbError, DbResult};

/// MySQL's limit on identifier length.
const MAX_DATABASE_NAME: usize = 64;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS admins (
        id INT AUTO_INCREMENT PRIMARY KEY,
        username VARCHAR(100) UNIQUE NOT NULL,
        password VARCHAR(255) NOT NULL,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS projects (
        id INT AUTO_INCREMENT PRIMARY KEY,
        title VARCHAR(255) NOT NULL,
        category VARCHAR(100) NOT NULL,
        description TEXT,
        image VARCHAR(255),
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS sectors (
        id INT AUTO_INCREMENT PRIMARY KEY,
        title VARCHAR(255) NOT NULL,
        category VARCHAR(100) NOT NULL,
        description TEXT,
        image VARCHAR(255),
        is_active BOOLEAN DEFAULT TRUE,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS contact_messages (
        id INT AUTO_INCREMENT PRIMARY KEY,
        name VARCHAR(150),
        email VARCHAR(150),
        topic VARCHAR(100),
        message TEXT,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )",
];

/// Whether `name` is safe to splice into a backquoted database identifier.
pub(crate) fn is_valid_database_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_DATABASE_NAME
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

async fn connect(options: MySqlConnectOptions, timeout: Duration) -> DbResult<MySqlPool> {
    let pending = MySqlPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(timeout)
        .connect_with(options);
    match tokio::time::timeout(timeout, pending).await {
        Ok(pool) => Ok(pool?),
        Err(_) => Err(DbError::Connection {
            message: format!("connection timed out after {timeout:?}"),
        }),
    }
}

/// Create database `name` on the server reached through `server` unless it
/// already exists.
pub async fn create_database(
    server: MySqlConnectOptions,
    name: &str,
    timeout: Duration,
) -> DbResult<()> {
    if !is_valid_database_name(name) {
        return Err(DbError::InvalidData {
            message: format!("invalid database name '{name}'"),
            help: "use letters, digits, '_' or '$' (at most 64 characters)".to_string(),
        });
    }

    let pool = connect(server, timeout).await?;
    sqlx::query(&format!("CREATE DATABASE IF NOT EXISTS `{name}`"))
        .execute(&pool)
        .await?;
    pool.close().await;
    info!(database = name, "database ready");
    Ok(())
}

/// Make sure the configured database exists and return a pool bound to it.
///
/// Works against a fresh server: the database is created over a connection
/// that selects none, and only then is a pool opened on it.
pub async fn prepare_database(config: &RelationalConfig) -> DbResult<MySqlPool> {
    create_database(
        config.server_options(),
        &config.database,
        config.probe_timeout,
    )
    .await?;
    connect(config.connect_options(), config.probe_timeout).await
}

/// First administrator account created by [`init_schema`].
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub username: String,
    pub password: String,
}

/// Create missing tables and seed the administrator if it does not exist.
///
/// Idempotent: existing tables and an existing administrator are left alone.
pub async fn init_schema(pool: &MySqlPool, seed: &AdminSeed) -> DbResult<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
        let head: String = statement.chars().take(50).collect();
        info!(statement = %head, "schema statement executed");
    }

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins WHERE username = ?")
        .bind(&seed.username)
        .fetch_one(pool)
        .await?;

    if existing > 0 {
        info!(username = %seed.username, "Admin user already exists");
        return Ok(());
    }

    let hash = hash_secret(&seed.password)?;
    sqlx::query("INSERT INTO admins (username, password) VALUES (?, ?)")
        .bind(&seed.username)
        .bind(&hash)
        .execute(pool)
        .await?;
    info!(username = %seed.username, "Default admin user created");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_names_are_restricted_to_identifier_characters() {
        assert!(is_valid_database_name("Metamax"));
        assert!(is_valid_database_name("metamax_test$1"));
        assert!(!is_valid_database_name(""));
        assert!(!is_valid_database_name("meta`max"));
        assert!(!is_valid_database_name("metamax; DROP DATABASE x"));
        assert!(!is_valid_database_name(&"a".repeat(MAX_DATABASE_NAME + 1)));
    }

    #[tokio::test]
    async fn invalid_name_is_rejected_before_connecting() {
        let config = RelationalConfig {
            database: "bad-name".to_string(),
            ..RelationalConfig::default()
        };
        let result = prepare_database(&config).await;
        assert!(matches!(result, Err(DbError::InvalidData { .. })));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_store_error() {
        let config = RelationalConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            probe_timeout: Duration::from_millis(500),
            ..RelationalConfig::default()
        };
        let result = prepare_database(&config).await;
        assert!(matches!(
            result,
            Err(DbError::Sql(_)) | Err(DbError::Connection { .. })
        ));
    }
}
