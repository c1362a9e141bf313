//! Shape checks for database connection credentials.
//!
//! These are pure string predicates; nothing here touches the network.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Result, ThreatError};

fn ipv4_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{1,3}(\.\d{1,3}){3}$").expect("regex is valid"))
}

fn database_name_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_$]+$").expect("regex is valid"))
}

fn username_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_]+$").expect("regex is valid"))
}

/// Four dot-separated groups of one to three digits. Octet values are not checked.
pub fn validate_ipv4_format(address: &str) -> bool {
    ipv4_shape().is_match(address)
}

/// A dotted-quad IPv4 address with every octet in `0..=255`.
pub fn validate_ipv4(address: &str) -> bool {
    validate_ipv4_format(address) && address.split('.').all(|octet| octet.parse::<u8>().is_ok())
}

/// Letters, digits, `_` and `$` only.
pub fn validate_database_name(name: &str) -> bool {
    database_name_shape().is_match(name)
}

/// Letters and `_` only.
pub fn validate_username(username: &str) -> bool {
    username_shape().is_match(username)
}

// ── ConnectionSettings ────────────────────────────────────────────────────────

/// Validated credentials for the relational store.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub host: String,
    pub db_name: String,
    pub username: String,
    password: String,
}

impl ConnectionSettings {
    /// Validate and build connection settings.
    ///
    /// `host` must be `localhost` or a valid IPv4 address. The password is
    /// accepted as-is.
    pub fn new(
        host: impl Into<String>,
        db_name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let host = host.into();
        let db_name = db_name.into();
        let username = username.into();

        if host != "localhost" && !validate_ipv4(&host) {
            return Err(ThreatError::InvalidCredentials(format!("host '{}'", host)));
        }
        if !validate_database_name(&db_name) {
            return Err(ThreatError::InvalidCredentials(format!(
                "database name '{}'",
                db_name
            )));
        }
        if !validate_username(&username) {
            return Err(ThreatError::InvalidCredentials(format!(
                "username '{}'",
                username
            )));
        }

        Ok(Self {
            host,
            db_name,
            username,
            password: password.into(),
        })
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("host", &self.host)
            .field("db_name", &self.db_name)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
