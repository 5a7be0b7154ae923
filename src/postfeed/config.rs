use crate::error::{FeedError, Result};
use crate::store::{validate_collection, DEFAULT_COLLECTION};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_AUTHOR: &str = "Anonymous User";
const DEFAULT_WATCH_INTERVAL_MS: u64 = 500;

/// Configuration for postfeed, stored in `<data dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedConfig {
    /// Collection the feed reads from and writes to
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Author recorded on posts created from this machine
    #[serde(default = "default_author")]
    pub author: String,

    /// How often `watch` polls the store for new snapshots
    #[serde(default = "default_watch_interval_ms")]
    pub watch_interval_ms: u64,
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

fn default_author() -> String {
    DEFAULT_AUTHOR.to_string()
}

fn default_watch_interval_ms() -> u64 {
    DEFAULT_WATCH_INTERVAL_MS
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            author: default_author(),
            watch_interval_ms: DEFAULT_WATCH_INTERVAL_MS,
        }
    }
}

impl FeedConfig {
    pub const KEYS: [&'static str; 3] = ["collection", "author", "watch-interval-ms"];

    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(FeedError::Io)?;
        let config: FeedConfig =
            serde_json::from_str(&content).map_err(FeedError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(FeedError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(FeedError::Serialization)?;
        fs::write(config_path, content).map_err(FeedError::Io)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "collection" => Some(self.collection.clone()),
            "author" => Some(self.author.clone()),
            "watch-interval-ms" => Some(self.watch_interval_ms.to_string()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        match key {
            "collection" => {
                validate_collection(value).map_err(|e| e.to_string())?;
                self.collection = value.to_string();
            }
            "author" => {
                let author = value.trim();
                if author.is_empty() {
                    return Err("author cannot be empty".to_string());
                }
                self.author = author.to_string();
            }
            "watch-interval-ms" => {
                let ms: u64 = value
                    .parse()
                    .map_err(|_| format!("'{}' is not a number of milliseconds", value))?;
                if ms == 0 {
                    return Err("watch-interval-ms must be positive".to_string());
                }
                self.watch_interval_ms = ms;
            }
            _ => return Err(format!("Unknown config key: {}", key)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FeedConfig::default();
        assert_eq!(config.collection, "posts");
        assert_eq!(config.author, "Anonymous User");
        assert_eq!(config.watch_interval_ms, 500);
    }

    #[test]
    fn test_load_missing_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = FeedConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config, FeedConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("nested");

        let mut config = FeedConfig::default();
        config.set("author", "CSS Specialist").unwrap();
        config.save(&dir).unwrap();

        let loaded = FeedConfig::load(&dir).unwrap();
        assert_eq!(loaded.author, "CSS Specialist");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILENAME),
            r#"{"collection": "questions"}"#,
        )
        .unwrap();

        let config = FeedConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config.collection, "questions");
        assert_eq!(config.watch_interval_ms, 500);
    }

    #[test]
    fn test_set_validates_values() {
        let mut config = FeedConfig::default();
        assert!(config.set("collection", "../posts").is_err());
        assert!(config.set("watch-interval-ms", "soon").is_err());
        assert!(config.set("watch-interval-ms", "0").is_err());
        assert!(config.set("author", "   ").is_err());
        assert!(config.set("colour", "blue").is_err());

        config.set("watch-interval-ms", "250").unwrap();
        assert_eq!(config.get("watch-interval-ms").as_deref(), Some("250"));
    }
}
