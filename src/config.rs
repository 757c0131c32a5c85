//! Environment-driven configuration.
//!
//! Every knob has a default so the service boots with an empty environment;
//! a missing Gemini key only downgrades insights to computed mode.

use std::env;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_DEMO_CACHE_TTL_MS: u64 = 10 * 60 * 1000;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// API key for the Gemini insight backend; empty disables remote calls.
    pub gemini_api_key: String,
    pub gemini_model: String,
    /// How long the memoized demo dashboard stays fresh.
    pub demo_cache_ttl_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            gemini_api_key: String::new(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            demo_cache_ttl_ms: DEFAULT_DEMO_CACHE_TTL_MS,
        }
    }
}

impl Config {
    /// Read configuration from the process environment. Call after
    /// `dotenvy::dotenv()` so `.env` values are visible.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: parsed_var("PORT").unwrap_or(defaults.port),
            gemini_api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
            gemini_model: env::var("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            demo_cache_ttl_ms: parsed_var("DEMO_CACHE_TTL_MS").unwrap_or(defaults.demo_cache_ttl_ms),
        }
    }
}

fn parsed_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[serial_test::serial]
    #[test]
    fn defaults_apply_with_empty_env() {
        for key in ["PORT", "GEMINI_API_KEY", "GEMINI_MODEL", "DEMO_CACHE_TTL_MS"] {
            env::remove_var(key);
        }
        let cfg = Config::from_env();
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert!(cfg.gemini_api_key.is_empty());
        assert_eq!(cfg.gemini_model, DEFAULT_GEMINI_MODEL);
        assert_eq!(cfg.demo_cache_ttl_ms, DEFAULT_DEMO_CACHE_TTL_MS);
    }

    #[serial_test::serial]
    #[test]
    fn env_overrides_win_and_garbage_falls_back() {
        env::set_var("PORT", "8080");
        env::set_var("DEMO_CACHE_TTL_MS", "not-a-number");
        let cfg = Config::from_env();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.demo_cache_ttl_ms, DEFAULT_DEMO_CACHE_TTL_MS);
        env::remove_var("PORT");
        env::remove_var("DEMO_CACHE_TTL_MS");
    }
}
