//! Configuration file support.
//!
//! Loads `rpcgen.toml` from the path given with `--config`, or from the
//! current directory when present. Command-line flags override it.
//!
//! Example rpcgen.toml:
//! ```toml
//! [generate]
//! package = "todo"
//! tags = ["json", "yaml"]
//! fetch_library = "node-fetch"
//! module = "Todo"
//! class = "Client"
//! validate = true
//! ```

use anyhow::{Context, Result};
use rpcgen::GenerateOptions;
use serde::Deserialize;
use std::path::Path;

/// Default config file name.
pub const CONFIG_FILE: &str = "rpcgen.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct RpcgenConfig {
    /// Defaults for `rpcgen generate`.
    pub generate: GenerateOptions,
}

impl RpcgenConfig {
    /// Load the configuration.
    ///
    /// An explicit path must exist; the implicit `./rpcgen.toml` is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_file(path),
            None => {
                let path = Path::new(CONFIG_FILE);
                if path.exists() {
                    Self::load_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
