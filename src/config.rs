// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Topics whose historical accuracy falls strictly below this ratio are "weak".
pub const WEAK_TOPIC_THRESHOLD: f64 = 0.7;

/// Score ratio at or above which post-quiz recommendations are suppressed.
pub const MASTERY_THRESHOLD: f64 = 0.8;

/// Upper bound on questions in a personalized (adaptive) quiz.
pub const MAX_PERSONALIZED_QUESTIONS: usize = 7;

/// Upper bound on questions a learner may request for a custom quiz.
pub const MAX_CUSTOM_QUESTIONS: u32 = 10;

/// Topic label used when a question carries none.
pub const DEFAULT_TOPIC: &str = "Mixed";

/// Experience level assumed when the learner never declared one.
pub const DEFAULT_EXPERIENCE: &str = "Beginner";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub rust_log: String,
    pub bind_addr: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub provider_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let openai_api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let openai_base_url = env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        let openai_model = env::var("OPENAI_MODEL")
            .unwrap_or_else(|_| "gpt-3.5-turbo".to_string());

        let provider_timeout_secs = env::var("PROVIDER_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8);

        Self {
            database_url,
            jwt_secret,
            rust_log,
            bind_addr,
            openai_api_key,
            openai_base_url,
            openai_model,
            provider_timeout_secs,
        }
    }
}
