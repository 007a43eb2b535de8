// src/config.rs

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use dotenvy::dotenv;

/// Number of answered questions after which an assessment always stops.
pub const DEFAULT_MAX_QUESTIONS: usize = 12;

/// Percentage-point gap between the top two archetypes that ends an assessment early.
pub const DEFAULT_CONFIDENCE_GAP: i64 = 20;

/// Idle lifetime of an in-memory assessment session.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    pub max_questions: usize,
    pub confidence_gap: i64,
    pub session_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let bind_addr = env::var("BIND_ADDR")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let max_questions = parse_or("ASSESSMENT_MAX_QUESTIONS", DEFAULT_MAX_QUESTIONS);
        let confidence_gap = parse_or("ASSESSMENT_CONFIDENCE_GAP", DEFAULT_CONFIDENCE_GAP);
        let session_ttl = Duration::from_secs(parse_or("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS));

        Self {
            database_url,
            jwt_secret,
            bind_addr,
            max_questions,
            confidence_gap,
            session_ttl,
        }
    }

    /// Config for tests and tools that never touch the database.
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            database_url: String::new(),
            jwt_secret: jwt_secret.to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            max_questions: DEFAULT_MAX_QUESTIONS,
            confidence_gap: DEFAULT_CONFIDENCE_GAP,
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
        }
    }
}

/// Reads an optional numeric setting. A value that is present but does not
/// parse stops startup, like a missing `DATABASE_URL` does.
fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    parse_setting(key, env::var(key).ok(), default)
}

fn parse_setting<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{} must be a number, got {:?}", key, raw)),
        None => default,
    }
}
