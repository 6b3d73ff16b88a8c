//! Bootstrap configuration
//!
//! Both binaries read the same TOML file. Resolution order:
//! 1. `--config <path>` (or `PARMSYNC_CONFIG`, merged by clap)
//! 2. `./parmsync.toml` in the working directory
//! 3. Built-in defaults
//!
//! A missing file is not fatal: a warning is logged and defaults are used.
//! A file that exists but does not parse, or that declares an invalid
//! parameter table, is a startup error.
//!
//! ```toml
//! [logging]
//! level = "info"
//!
//! [server]
//! bind_addr = "127.0.0.1:9090"
//! tick_period_ms = 1000
//!
//! [client]
//! server_url = "http://127.0.0.1:9090"
//! bind_addr = "127.0.0.1:9091"
//! sync_interval_ms = 1000
//! request_timeout_ms = 500
//!
//! [[parameters]]
//! name = "Alpha"
//! type = "float"
//! settable = false
//! tick_increment = 1.0
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::params::{NumericKind, ParamSpec, ParameterSchema};
use crate::{Error, Result};

/// File name looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "parmsync.toml";

/// Root of the TOML file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub logging: LoggingConfig,
    pub server: ServerConfig,
    pub client: ClientConfig,
    /// Parameter table; empty means the built-in table
    pub parameters: Vec<ParameterConfig>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Server section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Period of the simulated backend feed
    pub tick_period_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:9090".to_string(),
            tick_period_ms: 1000,
        }
    }
}

impl ServerConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }
}

/// Client section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the server's `/get` and `/set` endpoints
    pub server_url: String,
    /// Address of the client's local UI API
    pub bind_addr: String,
    pub sync_interval_ms: u64,
    /// Per-request timeout for both fetch and push
    pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:9090".to_string(),
            bind_addr: "127.0.0.1:9091".to_string(),
            sync_interval_ms: 1000,
            request_timeout_ms: 500,
        }
    }
}

impl ClientConfig {
    pub fn sync_interval(&self) -> Duration {
        Duration::from_millis(self.sync_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// One `[[parameters]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct ParameterConfig {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: NumericKind,
    #[serde(default)]
    pub settable: bool,
    /// Amount the server's ticker adds each period (server only)
    #[serde(default)]
    pub tick_increment: Option<f64>,
}

impl From<&ParameterConfig> for ParamSpec {
    fn from(p: &ParameterConfig) -> Self {
        ParamSpec::new(p.name.clone(), p.kind, p.settable)
    }
}

/// Ticker increments used with the built-in parameter table
const DEFAULT_TICK_RULES: [(&str, f64); 2] = [("Alpha", 1.0), ("Beta", 2.0)];

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse config text and validate it
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the resolved path, falling back to defaults when no file exists
    ///
    /// Nothing is logged here; binaries load config before tracing is set up
    /// and report the returned [`ConfigSource`] afterwards.
    pub fn load_or_default(cli_path: Option<&Path>) -> Result<(Self, ConfigSource)> {
        match resolve_config_path(cli_path) {
            Some(path) if path.exists() => {
                let config = Self::load(&path)?;
                Ok((config, ConfigSource::File(path)))
            }
            Some(path) => Ok((Self::default(), ConfigSource::Missing(path))),
            None => Ok((Self::default(), ConfigSource::Defaults)),
        }
    }

    /// Check periods and the parameter table
    pub fn validate(&self) -> Result<()> {
        if self.server.tick_period_ms == 0 {
            return Err(Error::Config("server.tick_period_ms must be > 0".to_string()));
        }
        if self.client.sync_interval_ms == 0 {
            return Err(Error::Config("client.sync_interval_ms must be > 0".to_string()));
        }
        if self.client.request_timeout_ms == 0 {
            return Err(Error::Config("client.request_timeout_ms must be > 0".to_string()));
        }

        for p in &self.parameters {
            if let Some(inc) = p.tick_increment {
                if !inc.is_finite() {
                    return Err(Error::Config(format!(
                        "tick_increment for {} must be finite",
                        p.name
                    )));
                }
            }
        }

        self.schema().map(|_| ())
    }

    /// Parameter schema declared by the file, or the built-in table
    pub fn schema(&self) -> Result<ParameterSchema> {
        if self.parameters.is_empty() {
            return Ok(ParameterSchema::default_parameters());
        }
        ParameterSchema::new(self.parameters.iter().map(ParamSpec::from).collect())
    }

    /// `(name, increment)` pairs for the server's ticker
    pub fn tick_rules(&self) -> Vec<(String, f64)> {
        if self.parameters.is_empty() {
            return DEFAULT_TICK_RULES
                .iter()
                .map(|(name, inc)| (name.to_string(), *inc))
                .collect();
        }
        self.parameters
            .iter()
            .filter_map(|p| p.tick_increment.map(|inc| (p.name.clone(), inc)))
            .filter(|(_, inc)| *inc != 0.0)
            .collect()
    }
}

/// Where a loaded [`TomlConfig`] came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// A path was resolved but no file exists there
    Missing(PathBuf),
    /// No path given and no `./parmsync.toml`
    Defaults,
}

impl ConfigSource {
    pub fn is_missing(&self) -> bool {
        matches!(self, ConfigSource::Missing(_))
    }

    /// Report the source once tracing is initialised
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded configuration from {}", path.display()),
            ConfigSource::Missing(path) => warn!(
                "Config file {} not found, using built-in defaults",
                path.display()
            ),
            ConfigSource::Defaults => info!("No config file, using built-in defaults"),
        }
    }
}

/// Explicit path if given, else `./parmsync.toml` if it exists
pub fn resolve_config_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }

    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    local.exists().then_some(local)
}
