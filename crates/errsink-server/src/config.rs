//! Server configuration.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Host the HTTP viewer binds to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port the HTTP viewer binds to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Address the TCP collector listens on.
    #[serde(default = "default_collector_addr")]
    pub collector_addr: SocketAddr,
    /// Initial auto-clear toggle.
    #[serde(default = "default_auto_clear")]
    pub auto_clear: bool,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_collector_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 4848))
}

fn default_auto_clear() -> bool {
    true
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("./frontend/dist")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            collector_addr: default_collector_addr(),
            auto_clear: default_auto_clear(),
            static_dir: default_static_dir(),
        }
    }
}

impl Config {
    /// Load config from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Load config from `config/default.toml`, then the user config directory,
    /// or fall back to defaults.
    pub fn load() -> Result<Self> {
        let local = PathBuf::from("config/default.toml");
        if local.exists() {
            return Self::load_from(&local);
        }

        if let Some(user) = dirs::config_dir().map(|d| d.join("errsink").join("config.toml")) {
            if user.exists() {
                return Self::load_from(&user);
            }
        }

        Ok(Config::default())
    }

    /// Address the HTTP viewer binds to.
    pub fn http_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse::<SocketAddr>()
            .with_context(|| format!("Invalid HTTP address {addr}"))
    }
}
