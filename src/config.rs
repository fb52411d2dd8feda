//! TOML configuration with defaults for every field.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::constants::{
    DEFAULT_CONFIG_FILE, DEFAULT_DOWNLOAD_COLOR, DEFAULT_INTERVAL_MS, DEFAULT_UPLOAD_COLOR,
};
use crate::errors::{GraphError, Result};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub graph: GraphConfig,
    pub source: SourceConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub download_color: String,
    pub upload_color: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            download_color: DEFAULT_DOWNLOAD_COLOR.to_string(),
            upload_color: DEFAULT_UPLOAD_COLOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Kernel interface counters.
    #[default]
    Counters,
    /// libpcap packet capture, needs the `capture` feature.
    Capture,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Interface to watch; picked automatically when unset.
    pub interface: Option<String>,
    pub interval_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            interface: None,
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

impl SourceConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// The graph owns the screen, so logs only go to a file.
    pub file: Option<PathBuf>,
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }

    /// Loads `path`, or the default path if it exists, or plain defaults.
    ///
    /// An explicit path that doesn't exist is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);

        let config = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| GraphError::Io {
                path: path_buf.clone(),
                source,
            })?;
            Self::parse(&raw).map_err(|details| GraphError::ConfigParse {
                path: path_buf.clone(),
                details,
            })?
        } else if path.is_some() {
            return Err(GraphError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    fn parse(raw: &str) -> std::result::Result<Self, String> {
        toml::from_str(raw).map_err(|err| err.to_string())
    }

    pub fn validate(&self) -> Result<()> {
        if self.source.interval_ms == 0 {
            return Err(GraphError::InvalidConfig {
                details: "source.interval_ms must be greater than zero".to_string(),
            });
        }
        if self
            .source
            .interface
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            return Err(GraphError::InvalidConfig {
                details: "source.interface must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
