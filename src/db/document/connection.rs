//! Live connection state for the document store.
//!
//! Unlike the relational proxy, the document models never bind once. Every
//! model call asks [`DocumentConnection::live`] whether the store is usable
//! right now, so a MongoDB server that drops out falls back to the in-memory
//! emulator and is picked up again as soon as the driver's heartbeat sees it.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use mongodb::bson::doc;
use mongodb::event::EventHandler;
use mongodb::event::sdam::SdamEvent;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use tracing::{debug, error, info, warn};

/// Connection states, numbered like the driver-level ready states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReadyState {
    Disconnected = 0,
    Connected = 1,
    Connecting = 2,
    Disconnecting = 3,
}

impl ReadyState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ReadyState::Connected,
            2 => ReadyState::Connecting,
            3 => ReadyState::Disconnecting,
            _ => ReadyState::Disconnected,
        }
    }
}

#[derive(Debug)]
struct Inner {
    state: AtomicU8,
    closed: AtomicBool,
    database: RwLock<Option<Database>>,
}

impl Inner {
    fn set_state(&self, state: ReadyState) {
        let previous = ReadyState::from_u8(self.state.swap(state as u8, Ordering::SeqCst));
        if previous != state {
            info!(from = ?previous, to = ?state, "document store state changed");
        }
    }
}

/// Shared, cloneable handle to the document store connection.
#[derive(Debug, Clone)]
pub struct DocumentConnection {
    inner: Arc<Inner>,
}

impl Default for DocumentConnection {
    fn default() -> Self {
        Self::disconnected()
    }
}

impl DocumentConnection {
    /// A handle that never reaches a real store.
    pub fn disconnected() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: AtomicU8::new(ReadyState::Disconnected as u8),
                closed: AtomicBool::new(false),
                database: RwLock::new(None),
            }),
        }
    }

    /// Connect to `uri` and select `database`.
    ///
    /// Never fails. When the initial ping does not succeed within `timeout`
    /// the handle stays disconnected; the driver keeps monitoring the server
    /// and the handle flips to connected once a heartbeat succeeds.
    pub async fn connect(uri: &str, database: &str, timeout: Duration) -> Self {
        let connection = Self::disconnected();
        connection.inner.set_state(ReadyState::Connecting);

        let mut options = match ClientOptions::parse(uri).await {
            Ok(options) => options,
            Err(e) => {
                error!(error = %e, "invalid MongoDB connection string");
                connection.inner.set_state(ReadyState::Disconnected);
                return connection;
            }
        };
        options.server_selection_timeout = Some(timeout);
        options.connect_timeout = Some(timeout);

        let monitored = Arc::downgrade(&connection.inner);
        options.sdam_event_handler = Some(EventHandler::callback(move |event: SdamEvent| {
            let Some(inner) = monitored.upgrade() else {
                return;
            };
            if inner.closed.load(Ordering::SeqCst) {
                return;
            }
            match event {
                SdamEvent::ServerHeartbeatSucceeded(_) => inner.set_state(ReadyState::Connected),
                SdamEvent::ServerHeartbeatFailed(_) => inner.set_state(ReadyState::Disconnected),
                _ => {}
            }
        }));

        let client = match Client::with_options(options) {
            Ok(client) => client,
            Err(e) => {
                error!(error = %e, "MongoDB client could not be created");
                connection.inner.set_state(ReadyState::Disconnected);
                return connection;
            }
        };

        let db = client.database(database);
        if let Ok(mut slot) = connection.inner.database.write() {
            *slot = Some(db.clone());
        }

        match db.run_command(doc! { "ping": 1 }).await {
            Ok(_) => {
                info!(database, "MongoDB connected successfully");
                connection.inner.set_state(ReadyState::Connected);
            }
            Err(e) => {
                error!(error = %e, "MongoDB connection failed");
                warn!("Document models will use the in-memory store until the server is reachable");
                connection.inner.set_state(ReadyState::Disconnected);
            }
        }

        connection
    }

    pub fn ready_state(&self) -> ReadyState {
        ReadyState::from_u8(self.inner.state.load(Ordering::SeqCst))
    }

    /// The database handle, if the store is usable at this moment.
    pub fn live(&self) -> Option<Database> {
        if self.ready_state() != ReadyState::Connected {
            return None;
        }
        self.inner.database.read().ok().and_then(|db| db.clone())
    }

    /// Stop using the real store. Heartbeats no longer revive the handle.
    pub fn disconnect(&self) {
        self.inner.set_state(ReadyState::Disconnecting);
        self.inner.closed.store(true, Ordering::SeqCst);
        self.inner.set_state(ReadyState::Disconnected);
    }

    /// Ping the server again and resume using it on success.
    ///
    /// Returns whether the handle is connected afterwards.
    pub async fn reconnect(&self) -> bool {
        let db = self.inner.database.read().ok().and_then(|db| db.clone());
        let Some(db) = db else {
            debug!("no MongoDB client configured; staying on the in-memory store");
            return false;
        };

        self.inner.set_state(ReadyState::Connecting);
        match db.run_command(doc! { "ping": 1 }).await {
            Ok(_) => {
                self.inner.closed.store(false, Ordering::SeqCst);
                self.inner.set_state(ReadyState::Connected);
                true
            }
            Err(e) => {
                warn!(error = %e, "MongoDB reconnect failed");
                self.inner.set_state(ReadyState::Disconnected);
                false
            }
        }
    }
}
