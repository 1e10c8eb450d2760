//! Catalog server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Catalog server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL; the in-memory store is used when unset
    pub database_url: Option<String>,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// Default log level when `RUST_LOG` is unset
    pub log_level: String,
    /// JSON log lines
    pub log_json: bool,
    /// Directory for daily rolling log files
    pub log_dir: Option<String>,
    /// PostgreSQL pool size
    pub db_max_connections: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, BoxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".into());
        let database_url = lookup("DATABASE_URL").filter(|s| !s.is_empty());
        if database_url.is_none() && environment != "development" {
            return Err(format!("DATABASE_URL must be set in {environment} environment").into());
        }

        Ok(Self {
            database_url,
            http_port: lookup("HTTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_json: lookup("LOG_JSON")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            log_dir: lookup("LOG_DIR").filter(|s| !s.is_empty()),
            db_max_connections: lookup("DB_MAX_CONNECTIONS")
                .and_then(|n| n.parse().ok())
                .unwrap_or(10),
        })
    }
}
