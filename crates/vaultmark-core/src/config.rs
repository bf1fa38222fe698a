//! Vault configuration.
//!
//! Read from an optional `vaultmark.yaml` at the vault root:
//!
//! ```yaml
//! daily_directory: journal
//! directories:
//!   objects: objects/
//!   pages: pages/
//! exclude: [.git, .vaultmark, templates]
//! ```

use crate::error::{Error, Result};
use crate::paths::normalize_dir_root;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name of the vault configuration.
pub const CONFIG_FILE: &str = "vaultmark.yaml";

fn default_daily_directory() -> String {
    "daily".to_string()
}

fn default_exclude() -> Vec<String> {
    vec![".git".to_string(), ".vaultmark".to_string()]
}

/// Optional roots stripped from object IDs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directories {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objects: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<String>,
}

/// Configuration for a single vault
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Directory holding `YYYY-MM-DD.md` daily notes
    #[serde(default = "default_daily_directory")]
    pub daily_directory: String,
    #[serde(default)]
    pub directories: Directories,
    /// Directory names skipped while walking the vault
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            daily_directory: default_daily_directory(),
            directories: Directories::default(),
            exclude: default_exclude(),
        }
    }
}

impl VaultConfig {
    pub fn builder() -> VaultConfigBuilder {
        VaultConfigBuilder::new()
    }

    /// Load `vaultmark.yaml` from a vault root; a missing file yields the defaults.
    pub fn load(vault_path: &Path) -> Result<Self> {
        let path = vault_path.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: VaultConfig = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(&content).map_err(|e| {
                Error::config_error(format!("failed to parse {}: {}", path.display(), e))
            })?
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the vault configuration
    pub fn validate(&self) -> Result<()> {
        let daily = self.daily_directory.trim_matches('/');
        if daily.is_empty() {
            return Err(Error::config_error("daily_directory cannot be empty"));
        }
        if daily.split('/').any(|part| part == "..") {
            return Err(Error::config_error(format!(
                "daily_directory must stay inside the vault: {}",
                self.daily_directory
            )));
        }
        Ok(())
    }

    /// Daily directory without surrounding slashes.
    pub fn daily_dir(&self) -> &str {
        self.daily_directory.trim_matches('/')
    }

    /// Objects root in `"dir/"` form, empty when unset.
    pub fn objects_root(&self) -> String {
        normalize_dir_root(self.directories.objects.as_deref().unwrap_or(""))
    }

    /// Pages root in `"dir/"` form, empty when unset.
    pub fn pages_root(&self) -> String {
        normalize_dir_root(self.directories.pages.as_deref().unwrap_or(""))
    }

    pub fn is_excluded(&self, dir_name: &str) -> bool {
        self.exclude.iter().any(|e| e == dir_name)
    }
}

/// Builder for VaultConfig
#[derive(Debug, Default)]
pub struct VaultConfigBuilder {
    daily_directory: Option<String>,
    objects: Option<String>,
    pages: Option<String>,
    exclude: Option<Vec<String>>,
}

impl VaultConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn daily_directory(mut self, dir: impl Into<String>) -> Self {
        self.daily_directory = Some(dir.into());
        self
    }

    pub fn objects_root(mut self, root: impl Into<String>) -> Self {
        self.objects = Some(root.into());
        self
    }

    pub fn pages_root(mut self, root: impl Into<String>) -> Self {
        self.pages = Some(root.into());
        self
    }

    /// Replace the excluded directory names
    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Build and validate
    pub fn build(self) -> Result<VaultConfig> {
        let config = VaultConfig {
            daily_directory: self.daily_directory.unwrap_or_else(default_daily_directory),
            directories: Directories {
                objects: self.objects,
                pages: self.pages,
            },
            exclude: self.exclude.unwrap_or_else(default_exclude),
        };
        config.validate()?;
        Ok(config)
    }
}
