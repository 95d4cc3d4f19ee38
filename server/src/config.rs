//! Configuration for the stun server.
//!
//! Precedence, lowest first: defaults, config file, environment, flags.
//! Environment and flags are both handled by clap in `main`, this module
//! only merges what it is given.

use log::info;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use lstun::constants::DEFAULT_PORT;

pub const ENV_UDP_PORT: &str = "LSTN_UDP_PORT";
pub const ENV_TCP_PORT: &str = "LSTN_TCP_PORT";
pub const ENV_MONITORING_PORT: &str = "LSTN_MONITORING_PORT";
pub const ENV_MONITORING_PATH: &str = "LSTN_MONITORING_PATH";
pub const ENV_CONFIG: &str = "LSTN_CONFIG";

pub const DEFAULT_MONITORING_PORT: u16 = 8081;
pub const DEFAULT_MONITORING_PATH: &str = "/metrics";

pub const CONFIG_FILE_NAME: &str = "stun.toml";
pub const CONFIG_SEARCH_DIRS: [&str; 2] = ["/etc/stun/", "./config/"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}, {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parse config {path}, {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config, {0}")]
    Invalid(String),
}

/// One transport's listener settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ServerConf {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Metrics endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MonitoringConf {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_monitoring_port")]
    pub port: u16,
    #[serde(default = "default_monitoring_path")]
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub udp: ServerConf,
    #[serde(default)]
    pub tcp: ServerConf,
    #[serde(default)]
    pub monitoring: MonitoringConf,
}

/// Values that override the file, from the environment or the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_path: Option<PathBuf>,
    pub udp_port: Option<u16>,
    pub tcp_port: Option<u16>,
    pub monitoring_port: Option<u16>,
    pub monitoring_path: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_monitoring_port() -> u16 {
    DEFAULT_MONITORING_PORT
}

fn default_monitoring_path() -> String {
    DEFAULT_MONITORING_PATH.to_string()
}

impl Default for MonitoringConf {
    fn default() -> Self {
        Self {
            enabled: true,
            port: DEFAULT_MONITORING_PORT,
            path: default_monitoring_path(),
        }
    }
}

impl fmt::Display for MonitoringConf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{enabled: {}, port: {}, path: {}}}",
            self.enabled, self.port, self.path
        )
    }
}

impl Default for ServerConf {
    fn default() -> Self {
        Self {
            enabled: true,
            port: DEFAULT_PORT,
        }
    }
}

impl fmt::Display for ServerConf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{enabled: {}, port: {}}}", self.enabled, self.port)
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{udp: {}, tcp: {}, monitoring: {}}}",
            self.udp, self.tcp, self.monitoring
        )
    }
}

impl Configuration {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// First existing `stun.toml` in the search dirs.
    pub fn find_file() -> Option<PathBuf> {
        CONFIG_SEARCH_DIRS
            .iter()
            .map(|dir| Path::new(dir).join(CONFIG_FILE_NAME))
            .find(|p| p.is_file())
    }

    pub fn resolve(overrides: &Overrides) -> Result<Self, ConfigError> {
        let path = match &overrides.config_path {
            Some(p) => Some(p.clone()),
            None => Self::find_file(),
        };

        let mut conf = match path {
            Some(p) => {
                info!("reading config file {}", p.display());
                Self::load(&p)?
            }
            None => {
                info!(
                    "no {} found in {:?}, using defaults",
                    CONFIG_FILE_NAME, CONFIG_SEARCH_DIRS
                );
                Self::default()
            }
        };

        conf.apply(overrides);
        conf.validate()?;
        Ok(conf)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // the router only takes absolute paths
        if !self.monitoring.path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "monitoring path must start with '/': {}",
                self.monitoring.path
            )));
        }
        Ok(())
    }

    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(port) = overrides.udp_port {
            self.udp.port = port;
        }
        if let Some(port) = overrides.tcp_port {
            self.tcp.port = port;
        }
        if let Some(port) = overrides.monitoring_port {
            self.monitoring.port = port;
        }
        if let Some(path) = &overrides.monitoring_path {
            self.monitoring.path = path.clone();
        }
    }
}
