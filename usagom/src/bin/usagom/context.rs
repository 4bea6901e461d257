use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_DIR: &str = ".usagom";
pub const CONFIG_FILE: &str = "config.toml";

/// Project context for usagom operations
pub struct ProjectContext {
    /// Directory holding `.usagom/`, or the working directory when none exists
    pub project_root: PathBuf,
    /// Path to config file
    pub config_path: PathBuf,
    /// Path to schemas directory
    pub schemas_dir: PathBuf,
    /// Loaded configuration
    pub config: Option<UsagomConfig>,
}

/// Configuration stored in .usagom/config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsagomConfig {
    #[serde(default)]
    pub usagom: UsagomSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsagomSettings {
    #[serde(default = "default_schemas_dir")]
    pub schemas_dir: String,
}

impl Default for UsagomSettings {
    fn default() -> Self {
        Self {
            schemas_dir: default_schemas_dir(),
        }
    }
}

fn default_schemas_dir() -> String {
    "schemas".to_string()
}

impl ProjectContext {
    /// Find and load project context from current directory or ancestors
    pub fn find() -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Self::find_from(&current_dir)
    }

    /// Find project context starting from the given directory.
    ///
    /// Falls back to `start` with default settings when no ancestor holds a
    /// `.usagom/config.toml`.
    pub fn find_from(start: &Path) -> Result<Self> {
        let project_root = Self::find_project_root(start).unwrap_or_else(|| start.to_path_buf());
        Self::from_root(project_root)
    }

    /// Create context from a known project root
    pub fn from_root(project_root: PathBuf) -> Result<Self> {
        let config_path = project_root.join(CONFIG_DIR).join(CONFIG_FILE);

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path).context("Failed to read config.toml")?;
            let config: UsagomConfig = toml::from_str(&content).context("Failed to parse config.toml")?;
            Some(config)
        } else {
            None
        };

        let schemas_dir = match &config {
            Some(cfg) => project_root.join(&cfg.usagom.schemas_dir),
            None => project_root.join(default_schemas_dir()),
        };

        Ok(Self {
            project_root,
            config_path,
            schemas_dir,
            config,
        })
    }

    fn find_project_root(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE).is_file())
            .map(Path::to_path_buf)
    }

    /// Check if usagom is initialized in this project
    pub fn is_initialized(&self) -> bool {
        self.config.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = UsagomConfig::default();
        assert_eq!(config.usagom.schemas_dir, "schemas");
    }

    #[test]
    fn test_config_serialization() {
        let config = UsagomConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("schemas_dir"));
    }

    #[test]
    fn test_finds_config_in_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(CONFIG_DIR);
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join(CONFIG_FILE), "[usagom]\nschemas_dir = \"models\"\n").unwrap();
        let nested = dir.path().join("src").join("deep");
        std::fs::create_dir_all(&nested).unwrap();

        let ctx = ProjectContext::find_from(&nested).unwrap();
        assert!(ctx.is_initialized());
        assert_eq!(ctx.project_root, dir.path());
        assert_eq!(ctx.schemas_dir, dir.path().join("models"));
    }

    #[test]
    fn test_defaults_without_config() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ProjectContext::find_from(dir.path()).unwrap();
        assert!(!ctx.is_initialized());
        assert_eq!(ctx.schemas_dir, dir.path().join("schemas"));
    }
}
