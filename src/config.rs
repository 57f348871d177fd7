use anyhow::{anyhow, Result};
use std::env;

use crate::rental::BlockingPolicy;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub http_port: u16,
    pub blocking_policy: BlockingPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:./data/rental.db".to_string());
        let database_url = if database_url.trim().is_empty() {
            "sqlite:./data/rental.db".to_string()
        } else {
            database_url
        };

        let port_str = env::var("HTTP_PORT")
            .unwrap_or_else(|_| "3000".to_string());
        let http_port = port_str.trim()
            .parse()
            .map_err(|_| anyhow!("Invalid HTTP_PORT"))?;

        let blocking_policy = match env::var("BOOKING_BLOCKING_POLICY") {
            Ok(value) if !value.trim().is_empty() => value
                .parse()
                .map_err(|e| anyhow!("Invalid BOOKING_BLOCKING_POLICY: {}", e))?,
            _ => BlockingPolicy::default(),
        };

        Ok(Config {
            database_url,
            http_port,
            blocking_policy,
        })
    }
}
