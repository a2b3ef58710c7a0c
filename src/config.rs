use std::net::SocketAddr;

use anyhow::{Context, Result};

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3001";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Runtime settings, read from the process environment (and `.env` via
/// `dotenvy` in `main`).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_address: SocketAddr,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        let bind_address = std::env::var("BIND_ADDRESS")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string())
            .parse()
            .context("BIND_ADDRESS must be a socket address")?;
        let max_connections = match std::env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(value) => value
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };
        Ok(Self {
            database_url,
            jwt_secret,
            bind_address,
            max_connections,
        })
    }
}
