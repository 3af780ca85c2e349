//! Database utility functions.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

static LAST_IDENTITY: AtomicU64 = AtomicU64::new(0);

/// Generate a time-derived identity for records created by the fallback stores.
///
/// The value is the current time in milliseconds, bumped past the previously
/// issued value so two calls within the same millisecond never collide.
/// Unique for the lifetime of the process only.
pub fn generate_identity() -> u64 {
    let now = Utc::now().timestamp_millis().max(0) as u64;
    let mut last = LAST_IDENTITY.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_IDENTITY.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed)
        {
            Ok(_) => return next,
            Err(observed) => last = observed,
        }
    }
}

/// Get current datetime as string in MySQL `TIMESTAMP` format
pub fn current_timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
