//! # Configuration
//!
//! TOML configuration for the questledger binary. Every section has defaults,
//! so a partial file (or none at all, via [`Config::default`]) is enough to
//! open a store.
//!
//! ```toml
//! [storage]
//! data_dir = "./data"
//! # db_path = "/var/lib/questledger/db"
//!
//! [logging]
//! level = "info"
//! file = "questledger.log"
//!
//! [shop]
//! stock = ["item_8", "item_9", "item_6", "item_7", "item_5", "item_10"]
//!
//! [seed]
//! # dir = "./seed"
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub shop: ShopConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    /// Optional override for the sled database path; defaults to `<data_dir>/questledger`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            db_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some("questledger.log".to_string()),
        }
    }
}

/// Items the shop offers, in display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopConfig {
    pub stock: Vec<String>,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            stock: ["item_8", "item_9", "item_6", "item_7", "item_5", "item_10"]
                .iter()
                .map(|id| id.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SeedConfig {
    /// Directory holding `items.json`, `enemies.json` and `quests.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Where the game database lives.
    pub fn db_path(&self) -> PathBuf {
        match &self.storage.db_path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(&self.storage.data_dir).join("questledger"),
        }
    }

    pub fn seed_dir(&self) -> Option<PathBuf> {
        self.seed.dir.as_ref().map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_db_path_under_data_dir() {
        let config = Config::default();
        assert_eq!(config.db_path(), PathBuf::from("./data").join("questledger"));
        assert!(config.seed_dir().is_none());
    }

    #[test]
    fn test_db_path_override() {
        let mut config = Config::default();
        config.storage.db_path = Some("/tmp/elsewhere".to_string());
        assert_eq!(config.db_path(), PathBuf::from("/tmp/elsewhere"));
    }

    #[test]
    fn test_default_shop_stock_order() {
        let shop = ShopConfig::default();
        assert_eq!(
            shop.stock,
            vec!["item_8", "item_9", "item_6", "item_7", "item_5", "item_10"]
        );
    }

    #[test]
    fn test_create_default_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let path = path.to_str().unwrap();

        tokio_test::block_on(Config::create_default(path)).unwrap();
        let loaded = tokio_test::block_on(Config::load(path)).unwrap();
        assert_eq!(loaded.storage.data_dir, "./data");
        assert_eq!(loaded.logging.level, "info");
        assert_eq!(loaded.shop.stock.len(), 6);
    }

    #[test]
    fn test_partial_file_uses_section_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "[shop]\nstock = [\"item_6\"]\n").unwrap();

        let loaded = tokio_test::block_on(Config::load(path.to_str().unwrap())).unwrap();
        assert_eq!(loaded.shop.stock, vec!["item_6"]);
        assert_eq!(loaded.storage.data_dir, "./data");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = tokio_test::block_on(Config::load("/nonexistent/questledger.toml"));
        assert!(result.is_err());
    }
}
