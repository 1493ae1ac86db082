//! Optional per-project guard configuration.
//!
//! Read from `<cwd>/.claude/dp-cto/config.toml`. A missing file is the normal
//! case and yields defaults. The hook paths use [`load_or_default`], which
//! never fails: a broken config must not be able to wedge a session.

use serde::Deserialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

use crate::core::error::GuardError;
use crate::core::schemas;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardConfig {
    /// Stage record directory, relative to the session cwd.
    pub state_dir: String,
    /// Plan directory, relative to the session cwd. Also the prefix stored in
    /// `plan_path`.
    pub plans_dir: String,
    pub index_file: String,
    pub superpowers: SuperpowersConfig,
}

/// Additions to the built-in superpowers tiers. Built-ins cannot be removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SuperpowersConfig {
    pub deny: Vec<String>,
    pub allow: Vec<String>,
    pub warn_keywords: Vec<String>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            state_dir: schemas::STATE_DIR.to_string(),
            plans_dir: schemas::PLANS_DIR.to_string(),
            index_file: schemas::PLAN_INDEX_FILE.to_string(),
            superpowers: SuperpowersConfig::default(),
        }
    }
}

impl GuardConfig {
    pub fn state_dir_in(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.state_dir)
    }

    pub fn index_path_in(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.plans_dir).join(&self.index_file)
    }

    fn validate(&self) -> Result<(), GuardError> {
        for (key, value) in [
            ("state_dir", &self.state_dir),
            ("plans_dir", &self.plans_dir),
            ("index_file", &self.index_file),
        ] {
            if !is_contained_relative(value) {
                return Err(GuardError::Config(format!(
                    "{} must be a non-empty relative path without '..' (got '{}')",
                    key, value
                )));
            }
        }
        Ok(())
    }
}

fn is_contained_relative(value: &str) -> bool {
    let path = Path::new(value);
    !value.trim().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

pub fn config_path(cwd: &Path) -> PathBuf {
    cwd.join(schemas::STATE_DIR).join(schemas::CONFIG_FILE_NAME)
}

/// Load the config for `cwd`. No file means defaults; a file that fails to
/// parse or validate is an error.
pub fn load_guard_config(cwd: &Path) -> Result<GuardConfig, GuardError> {
    let path = config_path(cwd);
    if !path.exists() {
        return Ok(GuardConfig::default());
    }
    let content = fs::read_to_string(&path)?;
    let config: GuardConfig = toml::from_str(&content)
        .map_err(|e| GuardError::Config(format!("{}: {}", path.display(), e)))?;
    config.validate()?;
    Ok(config)
}

pub fn load_or_default(cwd: &Path) -> GuardConfig {
    match load_guard_config(cwd) {
        Ok(config) => config,
        Err(err) => {
            warn!(error = %err, "ignoring unusable dp-cto config, using defaults");
            GuardConfig::default()
        }
    }
}
