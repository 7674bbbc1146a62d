//! Configuration for the network collaborator
//!
//! Loaded from TOML:
//!
//! ```toml
//! [fetch]
//! timeout_ms = 10000
//! user_agent = "vcon-dialog/0.1"
//! max_body_bytes = 104857600
//! follow_redirects = true
//! ```

use crate::error::{DialogError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

/// HTTP client settings for HEAD/GET of external content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct FetchConfig {
    /// Overall request timeout in milliseconds
    #[validate(range(min = 1))]
    pub timeout_ms: u64,

    /// User-Agent header sent with every request
    #[validate(length(min = 1))]
    pub user_agent: String,

    /// Largest body accepted from a GET; longer bodies are refused
    #[validate(range(min = 1))]
    pub max_body_bytes: u64,

    /// Follow redirects on HEAD and GET
    pub follow_redirects: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            timeout_ms: 30_000,
            user_agent: concat!("vcon-dialog/", env!("CARGO_PKG_VERSION")).to_string(),
            max_body_bytes: 100 * 1024 * 1024,
            follow_redirects: true,
        }
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
}

impl Config {
    /// Parse and validate TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(text).map_err(|e| DialogError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.fetch
            .validate()
            .map_err(|e| DialogError::Config(e.to_string()))
    }
}
