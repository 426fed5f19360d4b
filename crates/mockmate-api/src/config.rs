//! Server configuration.
//!
//! Everything is read from environment variables at startup (a `.env`
//! file is honored via dotenvy in `main`). Missing variables fall back
//! to the defaults below; the Gemini key is genuinely optional and only
//! gates the feedback endpoints.

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind host, `HOST`.
    pub host: String,
    /// Bind port, `PORT`.
    pub port: u16,
    /// Allowed CORS origins, `CORS_ALLOWED_ORIGINS` (comma separated, `*` for any).
    pub cors_origins: Vec<String>,
    /// Gemini API key, `GEMINI_API_KEY`. Absent means feedback endpoints
    /// answer with a configuration error.
    pub gemini_api_key: Option<String>,
    /// Preferred Gemini model, `GEMINI_MODEL`.
    pub gemini_model: String,
    /// Directory of per-domain question files, `QUESTION_BANK_DIR`.
    pub question_bank_dir: PathBuf,
    /// Sustained per-IP request rate on `/api`, `RATE_LIMIT_RPS`.
    pub rate_limit_rps: u32,
    /// Per-IP burst allowance on `/api`, `RATE_LIMIT_BURST`.
    pub rate_limit_burst: u32,
    /// Request body cap in bytes, `MAX_BODY_SIZE`.
    pub max_body_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            gemini_api_key: None,
            gemini_model: "gemini-2.0-flash".to_string(),
            question_bank_dir: PathBuf::from("data/questions"),
            rate_limit_rps: 10,
            rate_limit_burst: 20,
            max_body_size: 2 * 1024 * 1024,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port),
            cors_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.cors_origins),
            gemini_api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
            gemini_model: env::var("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            question_bank_dir: env::var("QUESTION_BANK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.question_bank_dir),
            rate_limit_rps: parse_var("RATE_LIMIT_RPS", defaults.rate_limit_rps),
            rate_limit_burst: parse_var("RATE_LIMIT_BURST", defaults.rate_limit_burst),
            max_body_size: parse_var("MAX_BODY_SIZE", defaults.max_body_size),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
