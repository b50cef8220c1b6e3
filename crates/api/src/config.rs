use std::time::Duration;

use pixelperfect_db::PhaseBudgets;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// Defaults suit local development; production overrides them via the
/// environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `60`). Must exceed the two
    /// track phase budgets combined or a slow replace is cut off mid-write.
    pub request_timeout_secs: u64,
    /// How long shutdown waits for background tasks to drain (default: `10`).
    pub shutdown_timeout_secs: u64,
    /// Budget for the delete phase of a track write (default: `15`).
    pub track_delete_timeout_secs: u64,
    /// Budget for the recreate phase of a track write (default: `30`).
    pub track_recreate_timeout_secs: u64,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                 |
    /// |-------------------------------|-------------------------|
    /// | `HOST`                        | `0.0.0.0`               |
    /// | `PORT`                        | `3000`                  |
    /// | `CORS_ORIGINS`                | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`        | `60`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`       | `10`                    |
    /// | `TRACK_DELETE_TIMEOUT_SECS`   | `15`                    |
    /// | `TRACK_RECREATE_TIMEOUT_SECS` | `30`                    |
    ///
    /// # Panics
    ///
    /// Panics on unparsable values; misconfiguration should stop startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let defaults = PhaseBudgets::default();

        Self {
            host,
            port: env_or("PORT", 3000),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 60),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 10),
            track_delete_timeout_secs: env_or(
                "TRACK_DELETE_TIMEOUT_SECS",
                defaults.delete.as_secs(),
            ),
            track_recreate_timeout_secs: env_or(
                "TRACK_RECREATE_TIMEOUT_SECS",
                defaults.recreate.as_secs(),
            ),
            jwt: JwtConfig::from_env(),
        }
    }

    /// Per-phase budgets handed to the track workflow.
    pub fn phase_budgets(&self) -> PhaseBudgets {
        PhaseBudgets {
            delete: Duration::from_secs(self.track_delete_timeout_secs),
            recreate: Duration::from_secs(self.track_recreate_timeout_secs),
        }
    }

    /// Whether a request can outlive a replace that uses its full budget.
    pub fn request_timeout_covers_budgets(&self) -> bool {
        Duration::from_secs(self.request_timeout_secs) > self.phase_budgets().total()
    }
}

fn env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("{key} must be a valid number: {e}")),
        Err(_) => default,
    }
}
