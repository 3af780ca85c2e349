//! One-way secret hashing and the login comparison rule.
//!
//! Secrets are stored as argon2 PHC strings. A stored value is recognised as
//! already hashed by its `$argon2` prefix, so a write path never hashes twice.
//!
//! # Bootstrap credential
//!
//! The relational emulator serves a fixed administrator row whose stored hash
//! is [`BOOTSTRAP_HASH`]. [`verify_login_secret`] treats that exact value as
//! matching [`BOOTSTRAP_PLAINTEXT`] so the admin panel stays usable while the
//! relational store is unreachable.
//!
//! **SECURITY: this is a demonstration backdoor for fallback mode. It must
//! never be wired into a production credential path.** A real `admins` table
//! never contains this value because the schema seeder hashes with argon2.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use tracing::warn;

use crate::db::relational::FailoverProxy;
use crate::db::{DbError, DbResult, Row, SqlValue};

/// Prefix carried by every hash this module produces.
pub const HASH_MARKER: &str = "$argon2";

/// Stored hash of the emulated administrator.
pub const BOOTSTRAP_HASH: &str = "$2a$10$ExampleHashForMetamax2025";

/// Plaintext accepted for [`BOOTSTRAP_HASH`].
pub const BOOTSTRAP_PLAINTEXT: &str = "metamax2025";

/// Whether a stored value already carries the hash marker.
pub fn is_hashed(value: &str) -> bool {
    value.starts_with(HASH_MARKER)
}

/// Hash a plaintext secret with a fresh random salt.
pub fn hash_secret(plain: &str) -> DbResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DbError::Secret {
            message: e.to_string(),
        })
}

/// Verify a candidate against a stored hash.
///
/// A stored value that is not a parseable hash never matches.
pub fn verify_secret(candidate: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .is_ok()
}

/// Login comparison used by the authentication flow, including the bootstrap rule.
pub fn verify_login_secret(candidate: &str, stored: &str) -> bool {
    if stored == BOOTSTRAP_HASH {
        let matched = candidate == BOOTSTRAP_PLAINTEXT;
        if matched {
            warn!("login accepted through the fallback bootstrap credential");
        }
        return matched;
    }
    verify_secret(candidate, stored)
}

/// Look up an administrator by login name and check the supplied secret.
///
/// Returns the matching row, or `None` when the name is unknown or the
/// secret does not match. Store errors propagate unchanged.
pub async fn authenticate_admin(
    proxy: &FailoverProxy,
    username: &str,
    password: &str,
) -> DbResult<Option<Row>> {
    let outcome = proxy
        .query(
            "SELECT * FROM admins WHERE username = ?",
            &[SqlValue::from(username)],
        )
        .await?;

    let Some(admin) = outcome.into_rows().into_iter().next() else {
        return Ok(None);
    };

    let stored = admin
        .get("password")
        .and_then(|v| v.as_str())
        .unwrap_or_default();

    Ok(verify_login_secret(password, stored).then_some(admin))
}
