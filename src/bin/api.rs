//! Metamax CMS API server binary.
//!
//! Probes the relational store once, connects the document store, and hands
//! both facades to the API layer. Neither store being reachable stops the
//! server from starting: each falls back to its in-process emulator.

use std::net::IpAddr;
use std::time::Duration;

use clap::Parser;
use metamax_cms::api::{self, ApiError, AppState, Config};
use metamax_cms::db::{
    AdminSeed, DbError, DocumentConnection, FailoverProxy, Models, RelationalConfig, init_schema,
    prepare_database,
};
use miette::Diagnostic;
use thiserror::Error;
use tracing::info;

#[derive(Error, Diagnostic, Debug)]
enum BinaryError {
    #[error("Database error: {0}")]
    #[diagnostic(code(metamax::binary::database))]
    Database(#[from] DbError),

    #[error("API server error: {0}")]
    #[diagnostic(code(metamax::binary::api))]
    Api(#[from] ApiError),

    #[error("Schema initialisation needs an administrator password")]
    #[diagnostic(code(metamax::binary::schema), help("set ADMIN_PASSWORD"))]
    MissingAdminPassword,
}

#[derive(Parser)]
#[command(name = "metamax-api")]
#[command(author, version, about = "Metamax CMS API server", long_about = None)]
struct Cli {
    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "5050")]
    port: u16,

    /// MySQL host
    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    db_host: String,

    /// MySQL port
    #[arg(long, env = "DB_PORT", default_value = "3306")]
    db_port: u16,

    /// MySQL user
    #[arg(long, env = "DB_USER", default_value = "root")]
    db_user: String,

    /// MySQL password
    #[arg(long, env = "DB_PASSWORD", default_value = "", hide_env_values = true)]
    db_password: String,

    /// MySQL database name
    #[arg(long, env = "DB_NAME", default_value = "Metamax")]
    db_name: String,

    /// Milliseconds to wait for the MySQL startup probe
    #[arg(long, env = "DB_PROBE_TIMEOUT_MS", default_value = "2000")]
    db_probe_timeout_ms: u64,

    /// MongoDB connection string
    #[arg(long, env = "MONGO_URI", default_value = "mongodb://127.0.0.1:27017")]
    mongo_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGO_DB", default_value = "metamax")]
    mongo_db: String,

    /// Create the MySQL database and tables, seed the administrator, then exit
    #[arg(long)]
    init_schema: bool,

    /// Administrator login created by --init-schema
    #[arg(long, env = "ADMIN_USERNAME", default_value = "admin")]
    admin_username: String,

    /// Administrator password used by --init-schema
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,
}

impl Cli {
    fn relational_config(&self) -> RelationalConfig {
        RelationalConfig {
            host: self.db_host.clone(),
            port: self.db_port,
            user: self.db_user.clone(),
            password: self.db_password.clone(),
            database: self.db_name.clone(),
            probe_timeout: Duration::from_millis(self.db_probe_timeout_ms),
            ..RelationalConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), BinaryError> {
    // A missing .env file is normal outside development
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    api::init_tracing();

    let relational_config = cli.relational_config();

    if cli.init_schema {
        let password = cli
            .admin_password
            .clone()
            .ok_or(BinaryError::MissingAdminPassword)?;
        // Unlike the probe, a missing database is created rather than emulated
        let pool = prepare_database(&relational_config).await?;
        init_schema(
            &pool,
            &AdminSeed {
                username: cli.admin_username.clone(),
                password,
            },
        )
        .await?;
        pool.close().await;
        info!("Database schema ready");
        return Ok(());
    }

    let relational = FailoverProxy::probe(&relational_config).await;

    let connection = DocumentConnection::connect(
        &cli.mongo_uri,
        &cli.mongo_db,
        Duration::from_millis(cli.db_probe_timeout_ms),
    )
    .await;

    info!(
        relational = %relational.mode(),
        document = ?connection.ready_state(),
        "Stores bound"
    );

    api::run(
        Config {
            host: cli.host,
            port: cli.port,
        },
        AppState::new(relational, Models::new(connection)),
    )
    .await?;

    Ok(())
}
