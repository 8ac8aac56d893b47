use std::{env, time::Duration};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether list and item reads go through the cache (default: true)
    pub cache_enabled: bool,
    /// Cache TTL in seconds (default: 3600)
    pub cache_ttl_seconds: u64,
    /// Maximum number of cache entries (default: 10,000)
    pub cache_max_entries: usize,
    /// Seconds between expired-entry sweeps (default: 60)
    pub cache_sweep_interval_seconds: u64,
    /// Path to SQLite database file (default: "tasklane.db")
    /// Note: Only used when the `sqlite` feature is enabled.
    #[allow(dead_code)]
    pub sqlite_path: String,
    /// Redis connection URL (default: "redis://localhost:6379")
    /// Note: Only used when the `redis` or `auth-redis` feature is enabled.
    #[allow(dead_code)]
    pub redis_url: String,
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn env_flag(name: &str) -> Option<bool> {
    let value = env::var(name).ok()?;
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CACHE_ENABLED` - `false`/`0` disables the cache decorator (default: true)
    /// - `CACHE_TTL_SECONDS` - Cache TTL in seconds (default: 3600)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 10,000)
    /// - `CACHE_SWEEP_INTERVAL_SECONDS` - Expired-entry sweep period (default: 60)
    /// - `SQLITE_PATH` - SQLite database path (default: "tasklane.db")
    /// - `REDIS_URL` - Redis connection URL (default: "redis://localhost:6379")
    ///
    /// Unparsable values fall back to the default.
    pub fn from_env() -> Self {
        Self {
            cache_enabled: env_flag("CACHE_ENABLED").unwrap_or(true),
            cache_ttl_seconds: env_parse("CACHE_TTL_SECONDS").unwrap_or(3600),
            cache_max_entries: env_parse("CACHE_MAX_ENTRIES").unwrap_or(10_000),
            cache_sweep_interval_seconds: env_parse("CACHE_SWEEP_INTERVAL_SECONDS")
                .filter(|&s: &u64| s > 0)
                .unwrap_or(60),
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "tasklane.db".to_string()),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
        }
    }

    /// Get cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    /// Get the sweep interval as a Duration.
    pub fn cache_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache_sweep_interval_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 6] = [
        "CACHE_ENABLED",
        "CACHE_TTL_SECONDS",
        "CACHE_MAX_ENTRIES",
        "CACHE_SWEEP_INTERVAL_SECONDS",
        "SQLITE_PATH",
        "REDIS_URL",
    ];

    #[test]
    fn test_duration_conversions() {
        let config = Config {
            cache_enabled: true,
            cache_ttl_seconds: 600,
            cache_max_entries: 10_000,
            cache_sweep_interval_seconds: 30,
            sqlite_path: "test.db".to_string(),
            redis_url: "redis://localhost:6379".to_string(),
        };

        assert_eq!(config.cache_ttl(), Duration::from_secs(600));
        assert_eq!(config.cache_sweep_interval(), Duration::from_secs(30));
    }

    // Both cases live in one test so they never race on the process env.
    #[test]
    fn test_from_env_defaults_and_overrides() {
        for var in VARS {
            env::remove_var(var);
        }

        let config = Config::from_env();
        assert!(config.cache_enabled);
        assert_eq!(config.cache_ttl_seconds, 3600);
        assert_eq!(config.cache_max_entries, 10_000);
        assert_eq!(config.cache_sweep_interval_seconds, 60);
        assert_eq!(config.sqlite_path, "tasklane.db");
        assert_eq!(config.redis_url, "redis://localhost:6379");

        env::set_var("CACHE_ENABLED", "false");
        env::set_var("CACHE_TTL_SECONDS", "120");
        env::set_var("CACHE_SWEEP_INTERVAL_SECONDS", "0");
        env::set_var("CACHE_MAX_ENTRIES", "lots");

        let config = Config::from_env();
        assert!(!config.cache_enabled);
        assert_eq!(config.cache_ttl_seconds, 120);
        assert_eq!(config.cache_sweep_interval_seconds, 60);
        assert_eq!(config.cache_max_entries, 10_000);

        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_env_flag_values() {
        env::set_var("TASKLANE_TEST_FLAG", " Off ");
        assert_eq!(env_flag("TASKLANE_TEST_FLAG"), Some(false));
        env::set_var("TASKLANE_TEST_FLAG", "YES");
        assert_eq!(env_flag("TASKLANE_TEST_FLAG"), Some(true));
        env::set_var("TASKLANE_TEST_FLAG", "maybe");
        assert_eq!(env_flag("TASKLANE_TEST_FLAG"), None);
        env::remove_var("TASKLANE_TEST_FLAG");
    }
}
