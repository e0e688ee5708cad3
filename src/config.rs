use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, OptionExt, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    database: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Page size used by GetArtists when the caller doesn't send a limit
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    #[serde(default)]
    pub pool: PoolConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 8,
            acquire_timeout_secs: 8,
        }
    }
}

fn default_port() -> u16 {
    50051
}

fn default_page_size() -> u64 {
    100
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: "~/.local/share/artist-catalog/catalog.db".to_string(),
            port: default_port(),
            default_page_size: default_page_size(),
            pool: PoolConfig::default(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .context(format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("artist-catalog").join("config.toml"))
    }

    /// Load config from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path().ok_or_eyre("Config directory not found")?;

        Self::from_file(&config_path)
    }

    /// Write the default config to `path` unless a file is already there.
    /// Returns whether a file was written.
    pub fn write_default(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create config directory: {}", parent.display()))?;
        }
        let contents =
            toml::to_string_pretty(&Config::default()).context("Failed to serialize config")?;
        std::fs::write(path, contents)
            .context(format!("Failed to write config file: {}", path.display()))?;
        Ok(true)
    }

    /// Create a default config file, if it doesn't exist
    pub fn create_default() -> Result<()> {
        let path = Self::config_path().ok_or_eyre("Config directory not found")?;
        if !Self::write_default(&path)? {
            log::info!("Config already exists at {}", path.display());
        }
        Ok(())
    }

    /// Expand ~ to home directory
    fn expand_path(&self, path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(rest);
        }
        PathBuf::from(path)
    }

    /// Get expanded database path
    pub fn database_path(&self) -> PathBuf {
        self.expand_path(&self.database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_file_applies_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "database = \"/tmp/catalog.db\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();

        assert_eq!(config.database_path(), PathBuf::from("/tmp/catalog.db"));
        assert_eq!(config.port, 50051);
        assert_eq!(config.default_page_size, 100);
        assert_eq!(config.pool.max_connections, 10);
    }

    #[test]
    fn test_from_file_reads_pool_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "database = \"catalog.db\"\nport = 9000\n\n[pool]\nmax_connections = 3\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.pool.max_connections, 3);
        assert_eq!(config.pool.min_connections, 1);
    }

    #[test]
    fn test_from_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::from_file(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_write_default_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artist-catalog").join("config.toml");

        assert!(Config::write_default(&path).unwrap());
        assert!(!Config::write_default(&path).unwrap());

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.default_page_size, 100);
    }

    #[test]
    fn test_expand_home() {
        let config = Config::default();
        if let Some(home) = dirs::home_dir() {
            assert!(config.database_path().starts_with(home));
        }
    }
}
