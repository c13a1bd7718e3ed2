//! Environment configuration

use std::str::FromStr;

use crate::{CatalogError, Result};

pub const DEFAULT_PORT: u16 = 8083;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_IMPORT_MAX_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub database_max_connections: u32,
    pub nats_url: Option<String>,
    pub import_max_bytes: usize,
}

impl Config {
    /// Reads the process environment (call `dotenvy::dotenv()` first to pick up `.env`).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| CatalogError::Config("DATABASE_URL is required".into()))?;
        Ok(Self {
            database_url,
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            nats_url: lookup("NATS_URL").filter(|v| !v.trim().is_empty()),
            import_max_bytes: parse_or(&lookup, "IMPORT_MAX_BYTES", DEFAULT_IMPORT_MAX_BYTES)?,
        })
    }

    pub fn bind_addr(&self) -> String { format!("0.0.0.0:{}", self.port) }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| CatalogError::Config(format!("{key}: invalid value {raw:?}"))),
    }
}
