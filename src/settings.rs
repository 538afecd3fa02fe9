// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "currency-converter";
const SETTINGS_NAME: &str = "settings";

/// Per-user preferences, stored in the platform config directory.
/// Toggles missing from the file take their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub dark_mode: bool,
    pub notifications: bool,
    /// Show live rates for favorites on the home screen
    pub auto_update: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dark_mode: false,
            notifications: true,
            auto_update: true,
        }
    }
}

impl Settings {
    /// Set one preference by its command-line name
    pub fn set(&mut self, key: &str, value: bool) -> Result<()> {
        match key {
            "dark-mode" => self.dark_mode = value,
            "notifications" => self.notifications = value,
            "auto-update" => self.auto_update = value,
            _ => bail!(
                "Unknown setting '{}' (expected dark-mode, notifications or auto-update)",
                key
            ),
        }
        Ok(())
    }

    pub fn entries(&self) -> [(&'static str, &'static str, bool); 3] {
        [
            ("dark-mode", "Enable dark theme for the app", self.dark_mode),
            ("notifications", "Receive updates about currency rates", self.notifications),
            ("auto-update", "Automatically update currency rates", self.auto_update),
        ]
    }
}

fn settings_path() -> Result<PathBuf> {
    confy::get_configuration_file_path(APP_NAME, SETTINGS_NAME)
        .context("Failed to locate the settings file")
}

pub fn load_settings() -> Result<Settings> {
    load_settings_from(&settings_path()?)
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(&settings_path()?, settings)
}

pub fn load_settings_from(path: &Path) -> Result<Settings> {
    confy::load_path(path).with_context(|| format!("Failed to load settings from {}", path.display()))
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<()> {
    confy::store_path(path, settings)
        .with_context(|| format!("Failed to save settings to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_settings_screen() {
        let settings = Settings::default();
        assert!(!settings.dark_mode);
        assert!(settings.notifications);
        assert!(settings.auto_update);
    }

    #[test]
    fn test_set_by_name() -> Result<()> {
        let mut settings = Settings::default();
        settings.set("dark-mode", true)?;
        settings.set("auto-update", false)?;
        assert!(settings.dark_mode);
        assert!(!settings.auto_update);

        assert!(settings.set("font-size", true).is_err());
        Ok(())
    }

    #[test]
    fn test_missing_file_gives_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("settings.toml");

        let settings = load_settings_from(&path)?;
        assert_eq!(settings, Settings::default());
        Ok(())
    }

    #[test]
    fn test_partial_file_fills_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "dark_mode = true\n")?;

        let settings = load_settings_from(&path)?;
        assert!(settings.dark_mode);
        assert!(settings.notifications);
        assert!(settings.auto_update);
        Ok(())
    }

    #[test]
    fn test_settings_persist() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("settings.toml");

        let mut settings = Settings::default();
        settings.set("notifications", false)?;
        save_settings_to(&path, &settings)?;

        assert_eq!(load_settings_from(&path)?, settings);
        Ok(())
    }
}
