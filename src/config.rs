use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::catalog::loader::DataFiles;
use crate::constants::{
    CATALOG_FILE, CONFIG_FILE, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_STATIC_DIR, ENV_DATA_DIR, ENV_HOST,
    ENV_PORT, ENV_STATIC_DIR, PROPERTY_FILE,
};
use crate::error::{HotelMatchError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub dir: PathBuf,
    pub property_file: String,
    pub catalog_file: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Shuffle the initial grid so the correct answers are not clustered
    pub shuffle_catalog: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            property_file: PROPERTY_FILE.to_string(),
            catalog_file: CATALOG_FILE.to_string(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { shuffle_catalog: true }
    }
}

impl Config {
    /// `config.toml` in the working directory plus environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::from_file(CONFIG_FILE)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Defaults when the file does not exist
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| {
            HotelMatchError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Ok(toml::from_str(&content)?)
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(host) = lookup(ENV_HOST) {
            self.server.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port
                .parse()
                .map_err(|_| HotelMatchError::Config(format!("{ENV_PORT} is not a valid port: {port}")))?;
        }
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.data.dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(ENV_STATIC_DIR) {
            self.server.static_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    pub fn data_files(&self) -> DataFiles {
        DataFiles {
            property: self.data.dir.join(&self.data.property_file),
            catalog: self.data.dir.join(&self.data.catalog_file),
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| HotelMatchError::Config(format!("Invalid bind address: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::from_file(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert!(config.display.shuffle_catalog);
        assert_eq!(config.data_files(), DataFiles::in_dir("."));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[server]\nport = 9000\n\n[display]\nshuffle_catalog = false\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert!(!config.display.shuffle_catalog);
        assert_eq!(config.data.catalog_file, CATALOG_FILE);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[server]\nport = \"not a number\"\n").unwrap();
        assert!(matches!(Config::from_file(&path), Err(HotelMatchError::Toml(_))));
    }

    #[test]
    fn environment_overrides_file_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_HOST, "127.0.0.1"),
            (ENV_PORT, "8123"),
            (ENV_DATA_DIR, "/tmp/data"),
        ]);
        let mut config = Config::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.bind_addr().unwrap(), "127.0.0.1:8123".parse().unwrap());
        assert_eq!(config.data_files().catalog, PathBuf::from("/tmp/data").join(CATALOG_FILE));
    }

    #[test]
    fn invalid_port_override_is_rejected() {
        let mut config = Config::default();
        let result = config.apply_overrides(|key| (key == ENV_PORT).then(|| "eighty".to_string()));
        assert!(matches!(result, Err(HotelMatchError::Config(_))));
    }
}
