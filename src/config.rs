use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

use crate::service::checkin::DEFAULT_WARNING_THRESHOLD_KM;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub db_max_connections: u32,

    // Rate limiting
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    pub log_dir: String,

    /// Check-ins farther than this from the client site carry a warning.
    pub distance_warning_km: f64,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn optional<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

fn warning_radius(key: &str, km: f64) -> Result<f64> {
    if !km.is_finite() || km < 0.0 {
        anyhow::bail!("{key} must be a finite, non-negative number of kilometres, got {km}");
    }
    Ok(km)
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            db_max_connections: optional("DB_MAX_CONNECTIONS", 10)?,
            rate_protected_per_min: optional("RATE_PROTECTED_PER_MIN", 1000)?,
            api_prefix: optional("API_PREFIX", "/api".to_string())?,
            log_dir: optional("LOG_DIR", "logs".to_string())?,
            distance_warning_km: warning_radius(
                "DISTANCE_WARNING_KM",
                optional("DISTANCE_WARNING_KM", DEFAULT_WARNING_THRESHOLD_KM)?,
            )?,
        })
    }
}
