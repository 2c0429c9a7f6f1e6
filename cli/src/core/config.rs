//! # unarchive Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module loads, merges, expands and validates the unarchive
//! configuration. Configuration only tunes *how* extraction runs (which
//! programs to launch, where scratch directories live, how long a command may
//! take); it never changes what ends up at the destination.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. Project-specific `.unarchive.toml` in the current directory or ancestors
//!    (the search stops at a directory containing `.git`)
//! 2. User-specific config: the file named by `UNARCHIVE_CONFIG` if set,
//!    otherwise `config.toml` in the platform config directory
//! 3. Default values defined in the code
//!
//! Paths are `~`-expanded and the merged result is validated before use.
//!
//! ## Examples
//!
//! ```toml
//! [tools]
//! unzip = "/usr/local/bin/unzip"
//! tar = "gtar"
//!
//! [extract]
//! scratch_dir = "~/tmp"
//! timeout_secs = 600
//! ```
//!
//! ```rust
//! let cfg = config::load_config()?;
//! let tar_program = &cfg.tools.tar;
//! ```
//!
use crate::core::error::{Result, UnarchiveError};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)] // Error if unknown fields are in TOML
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
}

/// External programs used for extraction.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ToolsConfig {
    /// Program used for zip archives.
    #[serde(default = "default_unzip")]
    pub unzip: String,
    /// Program used for tar, tar.gz and tar.bz2 archives.
    #[serde(default = "default_tar")]
    pub tar: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            unzip: default_unzip(),
            tar: default_tar(),
        }
    }
}

/// Settings for the extraction pipeline.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ExtractConfig {
    /// Directory in which scratch directories are created (can use ~).
    /// Defaults to the destination's parent directory.
    pub scratch_dir: Option<String>,
    /// Seconds the external command may run before it is killed.
    pub timeout_secs: Option<u64>,
}

fn default_unzip() -> String {
    "unzip".to_string()
}
fn default_tar() -> String {
    "tar".to_string()
}

const PROJECT_CONFIG_FILENAME: &str = ".unarchive.toml";
/// Environment variable naming an explicit user configuration file.
pub const CONFIG_ENV_VAR: &str = "UNARCHIVE_CONFIG";

pub fn load_config() -> Result<Config> {
    let user_config = load_user_config()?;
    let project_config = load_project_config()?;
    let mut merged_config = merge_configs(user_config.unwrap_or_default(), project_config);
    expand_config_paths(&mut merged_config);
    validate_config(&merged_config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", merged_config);
    Ok(merged_config)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(explicit) = std::env::var_os(CONFIG_ENV_VAR) {
        let config_path = PathBuf::from(explicit);
        info!(
            "Loading configuration named by {}: {}",
            CONFIG_ENV_VAR,
            config_path.display()
        );
        return load_config_from_path(&config_path).map(Some);
    }
    if let Some(proj_dirs) = ProjectDirs::from("com", "unarchive", "unarchive") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config() -> Result<Option<Config>> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    if let Some(project_config_path) = find_project_config_path(&current_dir) {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        load_config_from_path(&project_config_path).map(Some)
    } else {
        debug!("No project configuration file (.unarchive.toml) found in current directory or ancestors.");
        Ok(None)
    }
}

fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let mut path: &Path = start;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Project values win whenever they differ from the defaults.
fn merge_configs(user: Config, project: Option<Config>) -> Config {
    let project_cfg = match project {
        Some(p) => p,
        None => return user,
    };
    let mut merged = Config::default();
    merged.tools.unzip = if project_cfg.tools.unzip != default_unzip() {
        project_cfg.tools.unzip
    } else {
        user.tools.unzip
    };
    merged.tools.tar = if project_cfg.tools.tar != default_tar() {
        project_cfg.tools.tar
    } else {
        user.tools.tar
    };
    merged.extract.scratch_dir = project_cfg
        .extract
        .scratch_dir
        .or(user.extract.scratch_dir);
    merged.extract.timeout_secs = project_cfg
        .extract
        .timeout_secs
        .or(user.extract.timeout_secs);
    merged
}

fn expand_config_paths(config: &mut Config) {
    if let Some(dir) = config.extract.scratch_dir.as_mut() {
        *dir = shellexpand::tilde(dir).into_owned();
        debug!("Expanded scratch directory: {}", dir);
    }
    config.tools.unzip = shellexpand::tilde(&config.tools.unzip).into_owned();
    config.tools.tar = shellexpand::tilde(&config.tools.tar).into_owned();
}

fn validate_config(config: &Config) -> Result<()> {
    debug!("Validating final configuration...");
    if config.tools.unzip.trim().is_empty() {
        return Err(anyhow!(UnarchiveError::Config(
            "tools.unzip must not be empty.".to_string()
        )));
    }
    if config.tools.tar.trim().is_empty() {
        return Err(anyhow!(UnarchiveError::Config(
            "tools.tar must not be empty.".to_string()
        )));
    }
    if config.extract.timeout_secs == Some(0) {
        return Err(anyhow!(UnarchiveError::Config(
            "extract.timeout_secs must be greater than zero.".to_string()
        )));
    }
    if let Some(dir) = &config.extract.scratch_dir {
        let scratch = Path::new(dir);
        if !scratch.exists() {
            warn!(
                "Configured scratch directory '{}' does not exist; it will be created on demand.",
                scratch.display()
            );
        } else if !scratch.is_dir() {
            return Err(anyhow!(UnarchiveError::Config(format!(
                "Configured scratch path '{}' exists but is not a directory.",
                scratch.display()
            ))));
        }
    }
    Ok(())
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_deserialize_basic_toml() {
        let toml_content = r#"
            [tools]
            tar = "gtar"

            [extract]
            scratch_dir = "~/scratch"
            timeout_secs = 30
        "#;

        let config: Config = toml::from_str(toml_content).expect("Failed to parse TOML");

        assert_eq!(config.tools.tar, "gtar");
        assert_eq!(config.tools.unzip, default_unzip()); // Default
        assert_eq!(config.extract.scratch_dir.as_deref(), Some("~/scratch")); // Not yet expanded
        assert_eq!(config.extract.timeout_secs, Some(30));
    }

    #[test]
    fn test_deserialize_rejects_unknown_fields() {
        let result: std::result::Result<Config, _> = toml::from_str("[tools]\nzip = \"7z\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_path_expansion() {
        let mut config = Config {
            extract: ExtractConfig {
                scratch_dir: Some("~/scratch_test".to_string()),
                timeout_secs: None,
            },
            ..Default::default()
        };

        expand_config_paths(&mut config);

        let home_dir = dirs::home_dir().unwrap();
        assert_eq!(
            config.extract.scratch_dir,
            Some(home_dir.join("scratch_test").to_string_lossy().into_owned())
        );
        assert_eq!(config.tools.tar, "tar"); // Bare program names unchanged
    }

    #[test]
    fn test_merge_prefers_project_values() {
        let user = Config {
            tools: ToolsConfig {
                unzip: "/opt/unzip".to_string(),
                tar: "bsdtar".to_string(),
            },
            extract: ExtractConfig {
                scratch_dir: Some("/user/scratch".to_string()),
                timeout_secs: Some(10),
            },
        };
        let project = Config {
            tools: ToolsConfig {
                tar: "gtar".to_string(),
                ..Default::default()
            },
            extract: ExtractConfig {
                scratch_dir: None,
                timeout_secs: Some(99),
            },
        };

        let merged = merge_configs(user, Some(project));

        assert_eq!(merged.tools.unzip, "/opt/unzip"); // Project left default, user wins
        assert_eq!(merged.tools.tar, "gtar");
        assert_eq!(merged.extract.scratch_dir.as_deref(), Some("/user/scratch"));
        assert_eq!(merged.extract.timeout_secs, Some(99));
    }

    #[test]
    fn test_find_project_config_stops_at_git() {
        let temp_dir = tempdir().unwrap();
        let repo = temp_dir.path().join("repo");
        let nested = repo.join("a/b");
        fs::create_dir_all(&nested).unwrap();
        fs::create_dir(repo.join(".git")).unwrap();
        // A config above the repository root must not be picked up.
        fs::write(temp_dir.path().join(PROJECT_CONFIG_FILENAME), "").unwrap();

        assert_eq!(find_project_config_path(&nested), None);

        fs::write(repo.join(PROJECT_CONFIG_FILENAME), "").unwrap();
        assert_eq!(
            find_project_config_path(&nested),
            Some(repo.join(PROJECT_CONFIG_FILENAME))
        );
    }

    #[test]
    fn test_validate_config_valid() {
        let temp_dir = tempdir().unwrap();
        let config = Config {
            extract: ExtractConfig {
                scratch_dir: Some(temp_dir.path().to_string_lossy().to_string()),
                timeout_secs: Some(5),
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_config_zero_timeout() {
        let config = Config {
            extract: ExtractConfig {
                scratch_dir: None,
                timeout_secs: Some(0),
            },
            ..Default::default()
        };
        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("timeout_secs must be greater than zero"));
    }

    #[test]
    fn test_validate_config_empty_tool() {
        let config = Config {
            tools: ToolsConfig {
                unzip: "  ".to_string(),
                tar: "tar".to_string(),
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_config_scratch_path_is_file() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("not_a_dir");
        fs::write(&file_path, "").unwrap();

        let config = Config {
            extract: ExtractConfig {
                scratch_dir: Some(file_path.to_string_lossy().to_string()),
                timeout_secs: None,
            },
            ..Default::default()
        };
        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("is not a directory"));
    }
}
