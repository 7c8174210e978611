//! Control unit configuration loading.
//!
//! One TOML file (see [`arm_common::arm::config`]) holds the whole arm
//! description. Loading always validates, so a [`LoadedConfig`] is safe to
//! build controllers from.

use std::path::{Path, PathBuf};

use arm_common::arm::config::ArmConfig;
use arm_common::config::{ConfigError, ConfigLoader};
use tracing::debug;

/// Validated configuration plus where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub arm: ArmConfig,
    /// `None` for in-memory documents and built-in defaults.
    pub source: Option<PathBuf>,
}

impl LoadedConfig {
    /// Built-in reference tuning.
    pub fn defaults() -> Self {
        Self {
            arm: ArmConfig::default(),
            source: None,
        }
    }
}

// ─── Loading Functions ──────────────────────────────────────────────

/// Load and validate the arm configuration from a TOML file.
///
/// # Errors
/// - [`ConfigError::FileNotFound`] if `path` does not exist.
/// - [`ConfigError::ParseError`] for unreadable files or invalid TOML.
/// - [`ConfigError::ValidationError`] for out-of-range values.
pub fn load_config(path: &Path) -> Result<LoadedConfig, ConfigError> {
    let arm = ArmConfig::load(path)?;
    arm.validate()?;
    debug!(path = %path.display(), service = %arm.shared.service_name, "config loaded");
    Ok(LoadedConfig {
        arm,
        source: Some(path.to_path_buf()),
    })
}

/// Load config from a TOML string (for testing).
pub fn load_config_from_str(content: &str) -> Result<LoadedConfig, ConfigError> {
    let arm = ArmConfig::from_toml_str(content)?;
    arm.validate()?;
    Ok(LoadedConfig { arm, source: None })
}

// ─── Tests ──────────────────────────────────────────────────────────
