// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for Takein
//!
//! Every field is kept as the whitespace-separated text an operator types, so
//! a saved file round-trips exactly what was entered.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::destination;
use crate::tokenizer::TokenRule;
use crate::TakeinError;

/// Tokenizer and destination settings for an intake run
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct IntakeConfig {
    /// Separators applied to the full source path
    #[serde(default = "default_path_separators")]
    pub path_separators: String,

    /// Keys bound to the full source path fragments
    #[serde(default = "default_path_keys")]
    pub path_keys: String,

    /// Separators applied to the base name
    #[serde(default = "default_name_separators")]
    pub name_separators: String,

    /// Keys bound to the base name fragments
    #[serde(default = "default_name_keys")]
    pub name_keys: String,

    /// Destination directory pattern (`$NAME` / `${NAME}`)
    #[serde(default = "default_destination")]
    pub destination: String,
}

// Default value functions
fn default_path_separators() -> String { "/".to_string() }
fn default_path_keys() -> String { "_ _ _ _ SHOW ... NAME".to_string() }
fn default_name_separators() -> String { ". _".to_string() }
fn default_name_keys() -> String { "SEQ SCENE SHOT PART VER ...".to_string() }
fn default_destination() -> String {
    "/mnt/storm/show/${SHOW}/shot/${SEQ}/${SCENE}_${SHOT}/out/".to_string()
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            path_separators: default_path_separators(),
            path_keys: default_path_keys(),
            name_separators: default_name_separators(),
            name_keys: default_name_keys(),
            destination: default_destination(),
        }
    }
}

impl IntakeConfig {
    /// Default location: `<user config dir>/takein/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("takein").join("config.json"))
    }

    /// Load configuration from a JSON file, falling back to defaults when absent
    pub fn load(path: &Path) -> crate::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let config: Self = serde_json::from_str(&content)
                    .map_err(|e| TakeinError::Config(format!("Failed to parse config: {}", e)))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("Config file not found at {:?}, using defaults", path);
                Ok(Self::default())
            }
            Err(e) => Err(TakeinError::at(path, e)),
        }
    }

    /// Save configuration to a JSON file, creating its directory if needed
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| TakeinError::at(parent, e))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| TakeinError::at(path, e))?;
        Ok(())
    }

    /// Rule applied to the whole source path
    pub fn path_rule(&self) -> TokenRule {
        TokenRule::from_fields(&self.path_separators, &self.path_keys)
    }

    /// Rule applied to the source base name
    pub fn name_rule(&self) -> TokenRule {
        TokenRule::from_fields(&self.name_separators, &self.name_keys)
    }

    /// Check the destination pattern is usable at all.
    ///
    /// With every variable blanked out the pattern must still be absolute.
    pub fn validate(&self) -> crate::Result<()> {
        let dest = self.destination.trim();
        if dest.is_empty() {
            return Err(TakeinError::Config("please set destination".to_string()));
        }
        let skeleton = destination::expand(dest, |_| Some(""))?;
        if !skeleton.starts_with('/') {
            return Err(TakeinError::Config("destination path cannot be relative".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_validate() {
        let config = IntakeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.path_rule().keys.len(), 7);
        assert_eq!(config.name_rule().separators, vec![".", "_"]);
    }

    #[test]
    fn test_validate_rejects_empty_and_relative() {
        let mut config = IntakeConfig::default();
        config.destination = "   ".to_string();
        assert!(matches!(config.validate(), Err(TakeinError::Config(_))));

        config.destination = "out/${SHOW}".to_string();
        assert!(matches!(config.validate(), Err(TakeinError::Config(_))));

        config.destination = "${ROOT}/out".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = IntakeConfig::default();
        config.destination = "/tmp/out/${SHOW}".to_string();
        config.save(&path).unwrap();

        let loaded = IntakeConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let loaded = IntakeConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, IntakeConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"destination": "/data/${SHOW}"}"#).unwrap();

        let loaded = IntakeConfig::load(&path).unwrap();
        assert_eq!(loaded.destination, "/data/${SHOW}");
        assert_eq!(loaded.path_keys, default_path_keys());
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(IntakeConfig::load(&path), Err(TakeinError::Config(_))));
    }
}
