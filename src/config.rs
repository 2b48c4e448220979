// src/config.rs

use std::env;
use std::str::FromStr;

use dotenvy::dotenv;

/// Session lifetime when `SESSION_TTL_SECS` is not set: 8 hours.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 8 * 60 * 60;
pub const DEFAULT_DASHBOARD_CACHE_TTL_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub admin_username: String,
    /// Read once at startup. [`crate::state::AppState::new`] hashes it and
    /// clears this field, so the running process only keeps the hash.
    pub admin_password: String,
    /// When set, every question create/update/delete is rejected.
    pub exam_edit_lock: bool,
    pub port: u16,
    pub public_dir: String,
    pub rust_log: String,
    pub session_ttl_secs: i64,
    pub dashboard_cache_ttl_secs: u64,
    /// `None` leaves the dashboard cache unbounded in entry count.
    pub dashboard_cache_max_entries: Option<usize>,
    pub db_acquire_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let admin_username = env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
        let admin_password =
            env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());

        let exam_edit_lock = env::var("EXAM_EDIT_LOCK")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            database_url,
            admin_username,
            admin_password,
            exam_edit_lock,
            port: parse_var("PORT", 5050),
            public_dir: env::var("PUBLIC_DIR").unwrap_or_else(|_| "public".to_string()),
            rust_log,
            session_ttl_secs: parse_var("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS),
            dashboard_cache_ttl_secs: parse_var(
                "DASHBOARD_CACHE_TTL_SECS",
                DEFAULT_DASHBOARD_CACHE_TTL_SECS,
            ),
            dashboard_cache_max_entries: env::var("DASHBOARD_CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .filter(|n: &usize| *n > 0),
            db_acquire_timeout_secs: parse_var("DB_ACQUIRE_TIMEOUT_SECS", 8),
        }
    }
}

/// Only a case-insensitive "true" turns a flag on.
pub fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring unparseable {}={:?}, using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}
