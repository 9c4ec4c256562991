//! TOML configuration for the web server.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use mailprobe_region::RegionConfig;
use serde::Deserialize;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "MAILPROBE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "mailprobe.toml";
/// Environment variable overriding `server.port`.
pub const PORT_ENV: &str = "PORT";

const DEFAULT_CLIENT_CACHE_TTL_SECS: u64 = 3600;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8020,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
    /// Also write daily-rolling log files here.
    pub directory: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            directory: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Lifetime of a cached client-IP region verdict.
    pub client_cache_ttl_secs: u64,
    pub server: ServerConfig,
    pub region: RegionConfig,
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client_cache_ttl_secs: DEFAULT_CLIENT_CACHE_TTL_SECS,
            server: ServerConfig::default(),
            region: RegionConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read the file named by `MAILPROBE_CONFIG` (default `mailprobe.toml`),
    /// then apply the `PORT` override.
    pub fn load() -> anyhow::Result<Self> {
        let path = env::var_os(CONFIG_PATH_ENV)
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
        let mut config = Self::from_file(&path)?;
        config.apply_port_override(env::var(PORT_ENV).ok().as_deref())?;
        Ok(config)
    }

    /// A missing file yields the defaults; an unreadable or malformed one is an error.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn apply_port_override(&mut self, port: Option<&str>) -> anyhow::Result<()> {
        if let Some(port) = port {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("invalid {PORT_ENV} value: {port}"))?;
        }
        Ok(())
    }

    pub fn client_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.client_cache_ttl_secs)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8020);
        assert_eq!(config.client_cache_ttl(), Duration::from_secs(3600));
        assert_eq!(config.log.level, "info");
        assert_eq!(config.region, RegionConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = AppConfig::from_toml(
            r#"
client_cache_ttl_secs = 60

[server]
port = 9000

[region]
db_path = "/srv/geo/GeoLite2-Country.mmdb"
max_workers = 8

[log]
json = true
"#,
        )
        .unwrap();
        assert_eq!(config.client_cache_ttl_secs, 60);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(
            config.region.db_path,
            PathBuf::from("/srv/geo/GeoLite2-Country.mmdb")
        );
        assert_eq!(config.region.max_workers, 8);
        assert_eq!(config.region.cache_size, 10_000);
        assert!(config.log.json);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(AppConfig::from_toml("[server]\nport = \"eighty\"").is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::from_file(Path::new("/nonexistent/mailprobe.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nhost = \"127.0.0.1\"").unwrap();
        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_port_override() {
        let mut config = AppConfig::default();
        config.apply_port_override(Some(" 8443 ")).unwrap();
        assert_eq!(config.server.port, 8443);

        config.apply_port_override(None).unwrap();
        assert_eq!(config.server.port, 8443);

        assert!(config.apply_port_override(Some("not-a-port")).is_err());
    }
}
