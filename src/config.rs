// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{CorruptReadPolicy, DuplicatePolicy};

pub const DEFAULT_BASE_URL: &str = "https://api.exchangerate-api.com/v4/latest";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://favorites.db";
/// Shipped in sample configs; never sent to the provider.
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub favorites: FavoritesConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

/// Matching and recovery rules for the favorites document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FavoritesConfig {
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
    #[serde(default)]
    pub on_corrupt: CorruptReadPolicy,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
        }
    }
}

impl ApiConfig {
    /// The configured key, unless it is empty or still the placeholder
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && *key != PLACEHOLDER_API_KEY)
            .map(str::to_string)
    }
}

fn get_config_path() -> PathBuf {
    if let Ok(path) = env::var("CURRENCY_CONVERTER_CONFIG") {
        return PathBuf::from(path);
    }
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("config.toml");
    path
}

/// Load `config.toml` (or defaults when it is missing), then apply
/// environment overrides.
pub fn load_config() -> anyhow::Result<Config> {
    let mut config = load_config_from(&get_config_path())?;
    config.apply_env_overrides(|key| env::var(key).ok());
    Ok(config)
}

pub fn load_config_from(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        log::debug!("No config file at {}, using defaults", path.display());
        return Ok(Config::default());
    }
    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: Config = toml::from_str(&config_str)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(config)
}

pub fn save_config(config: &Config, path: &Path) -> anyhow::Result<()> {
    let config_str = toml::to_string_pretty(config)?;
    fs::write(path, config_str)?;
    Ok(())
}

impl Config {
    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("EXCHANGE_RATE_API_URL") {
            self.api.base_url = url;
        }
        if let Some(key) = var("EXCHANGE_RATE_API_KEY") {
            self.api.api_key = Some(key);
        }
        if let Some(url) = var("DATABASE_URL") {
            self.storage.database_url = url;
        }
    }
}
