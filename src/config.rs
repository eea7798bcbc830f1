use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Bound on each outbound asset fetch during PDF rendering.
    pub asset_timeout: Duration,
    /// Lifetime of a freshly issued session.
    pub session_ttl_hours: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let asset_timeout = env::var("ASSET_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(8));
        let session_ttl_hours = env::var("SESSION_TTL_HOURS")
            .ok()
            .and_then(|t| t.parse::<i64>().ok())
            .unwrap_or(24);
        Ok(Self {
            database_url,
            host,
            port,
            asset_timeout,
            session_ttl_hours,
        })
    }
}
