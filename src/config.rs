// src/config.rs

use dotenvy::dotenv;
use std::env;

/// Marathon draw size bounds.
pub const MARATHON_MIN_QUESTIONS: i64 = 5;
pub const MARATHON_MAX_QUESTIONS: i64 = 100;

/// Floor for marathon duration in minutes; actual duration is
/// max(floor, question count) unless the caller overrides it.
pub const MARATHON_MIN_DURATION_MINUTES: i64 = 10;

/// Passing threshold applied when the source carries none (marathon).
pub const DEFAULT_PASSING_SCORE: f64 = 70.0;

/// Minimum question count for a ticket, enforced at authoring time.
pub const TICKET_MIN_QUESTIONS: usize = 10;

/// Device slots granted to a user unless an admin customizes them.
pub const DEFAULT_MAX_DEVICES: i64 = 4;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    /// Seconds between expiry sweeps.
    pub sweep_interval_secs: u64,
    /// When true, a user may hold at most one in-progress session and new
    /// starts are rejected with Conflict. When false (default) sessions are
    /// addressed purely by id and several may run side by side.
    pub single_session_policy: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86400);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let admin_username = env::var("ADMIN_USERNAME").ok();
        let admin_password = env::var("ADMIN_PASSWORD").ok();

        let sweep_interval_secs = env::var("SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        let single_session_policy = env::var("SINGLE_SESSION_POLICY")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            admin_username,
            admin_password,
            sweep_interval_secs,
            single_session_policy,
        }
    }
}
