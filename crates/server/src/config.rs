//! Training and serving configuration.
//!
//! Training settings can come from an optional TOML file where every key
//! is optional:
//!
//! ```toml
//! test_fraction = 0.2
//! split_seed = 42
//!
//! [encoder]
//! vocabulary_size = 500
//! drop_first_category = true
//!
//! [forest]
//! n_estimators = 100
//! max_depth = 20
//! max_features = "sqrt"
//! random_seed = 42
//! ```

use anyhow::{Context, Result};
use classifier::ForestConfig;
use pipeline::EncoderConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything a training run needs besides the data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub encoder: EncoderConfig,
    pub forest: ForestConfig,
    /// Share of rows held out for evaluation
    pub test_fraction: f64,
    pub split_seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            encoder: EncoderConfig::default(),
            forest: ForestConfig::default(),
            test_fraction: 0.2,
            split_seed: 42,
        }
    }
}

impl TrainingConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Where the web form finds its bundle and listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeConfig {
    pub bundle_dir: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            bundle_dir: PathBuf::from("models"),
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl ServeConfig {
    /// `host:port` for binding
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
