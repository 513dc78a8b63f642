//! Configuration management
//!
//! Loads configuration from config.toml with support for:
//! - Server binding settings
//! - Formatting precision of rendered amounts
//! - Seed token prices

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::format::FormatOptions;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

/// Main configuration structure matching config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub formatting: FormatOptions,
    /// USD price per staking token address
    #[serde(default)]
    pub prices: HashMap<String, f64>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Load from config.toml or use defaults
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    /// Load from specific path
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            Self::parse(&content).context("Failed to parse config file")
        } else {
            Self::parse(DEFAULT_CONFIG).context("Failed to parse default config")
        }
    }

    fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Bind host (PAYOUT_HOST env var takes precedence)
    pub fn host(&self) -> String {
        match std::env::var("PAYOUT_HOST") {
            Ok(host) if !host.is_empty() => host,
            _ => self.server.host.clone(),
        }
    }

    /// Bind port (PAYOUT_PORT env var takes precedence)
    pub fn port(&self) -> u16 {
        std::env::var("PAYOUT_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(self.server.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::parse(DEFAULT_CONFIG).unwrap_or_else(|_| Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            formatting: FormatOptions::default(),
            prices: HashMap::new(),
        })
    }
}
