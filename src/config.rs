use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::account::auth::DEFAULT_MIN_PASSWORD_LEN;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Error reading config '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Error parsing config '{path}': {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("Could not write default config to '{path}': {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("Could not serialize default config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SinigangConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub accounts: AccountsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    pub db_path: String,
}

/// Registration policy and the defaults given to a fresh profile
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AccountsConfig {
    #[serde(default = "default_min_password_len")]
    pub min_password_len: usize,
    #[serde(default = "default_display_name")]
    pub default_display_name: String,
    #[serde(default = "default_bio")]
    pub default_bio: String,
    /// `{handle}` is replaced with the handle minus its `@`
    #[serde(default = "default_avatar_url_template")]
    pub avatar_url_template: String,
    #[serde(default = "default_cover_image_url")]
    pub cover_image_url: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_min_password_len() -> usize {
    DEFAULT_MIN_PASSWORD_LEN
}

fn default_display_name() -> String {
    "Explorer".to_string()
}

fn default_bio() -> String {
    "New member of Sinigang Social. Ready to share, connect, and explore the digital frontier."
        .to_string()
}

fn default_avatar_url_template() -> String {
    "https://picsum.photos/seed/{handle}/200/200".to_string()
}

fn default_cover_image_url() -> String {
    "https://picsum.photos/seed/cover/1200/400".to_string()
}

impl Default for SinigangConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            storage: StorageConfig::default(),
            accounts: AccountsConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: "./data/sinigang".to_string(),
        }
    }
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            min_password_len: default_min_password_len(),
            default_display_name: default_display_name(),
            default_bio: default_bio(),
            avatar_url_template: default_avatar_url_template(),
            cover_image_url: default_cover_image_url(),
        }
    }
}

impl AccountsConfig {
    /// Placeholder avatar for a normalized handle
    pub fn avatar_url_for(&self, handle: &str) -> String {
        self.avatar_url_template
            .replace("{handle}", handle.trim_start_matches('@'))
    }
}

impl SinigangConfig {
    /// Read the config at `path`, writing the defaults there first if the file is missing.
    ///
    /// A file that exists but cannot be read or parsed is an error.
    pub fn load_or_create(path: &str) -> Result<Self, ConfigError> {
        if !std::path::Path::new(path).exists() {
            let config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&config)?)
                .map_err(|source| ConfigError::Write { path: path.to_string(), source })?;
            return Ok(config);
        }

        let s = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_string(), source })?;
        toml::from_str(&s).map_err(|source| ConfigError::Parse { path: path.to_string(), source })
    }
}
