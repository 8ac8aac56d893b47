use chrono::Duration;

/// Default lifetime of an issued access token, in minutes.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;

/// Longest accepted token lifetime (one year). Larger values are clamped.
pub const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 365;

/// Auth configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// How long an issued token stays valid.
    pub token_ttl: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl: Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
        }
    }
}

impl AuthConfig {
    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `TOKEN_TTL_MINUTES`: Token lifetime in minutes (default: 60, at most
    ///   one year)
    pub fn from_env() -> Self {
        let minutes = std::env::var("TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|s| s.parse::<i64>().ok());

        Self {
            token_ttl: token_ttl_from_minutes(minutes),
        }
    }
}

fn token_ttl_from_minutes(minutes: Option<i64>) -> Duration {
    let minutes = minutes
        .filter(|m| *m > 0)
        .map_or(DEFAULT_TOKEN_TTL_MINUTES, |m| m.min(MAX_TOKEN_TTL_MINUTES));

    Duration::try_minutes(minutes).unwrap_or(Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES))
}
