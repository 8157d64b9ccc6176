//! Conversion settings, loadable from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};
use stepmesh_mesh::{AssembleOptions, NormalizeParams, WeldTolerance};
use stepmesh_tessellate::Deflection;
use thiserror::Error;

/// 500 MiB, the largest upload a conversion accepts.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 500 * 1024 * 1024;

/// Errors loading or validating a [`ConvertConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Reading the config file failed.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings for one conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
    /// Maximum chord deviation in model units.
    pub linear_deflection: f64,
    /// Maximum angle between adjacent facets, in radians.
    pub angular_deflection: f64,
    /// Apply each face's local→model placement while assembling.
    pub apply_placements: bool,
    /// Upload size limit.
    pub max_upload_bytes: u64,
    /// Weld distance. Kept last: it serializes as a TOML table.
    pub weld_tolerance: WeldTolerance,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            linear_deflection: 0.1,
            angular_deflection: 0.5,
            apply_placements: true,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            weld_tolerance: WeldTolerance::default(),
        }
    }
}

impl ConvertConfig {
    /// Parse and validate a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Check every value is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.deflection()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let weld = match self.weld_tolerance {
            WeldTolerance::Relative(v) | WeldTolerance::Absolute(v) => v,
        };
        if !(weld >= 0.0 && weld.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "weld tolerance must be non-negative and finite, got {weld}"
            )));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid("max_upload_bytes must be positive".into()));
        }
        Ok(())
    }

    /// Tessellation tolerances.
    pub fn deflection(&self) -> Deflection {
        Deflection {
            linear: self.linear_deflection,
            angular: self.angular_deflection,
        }
    }

    /// Assembly options.
    pub fn assemble_options(&self) -> AssembleOptions {
        AssembleOptions {
            apply_placements: self.apply_placements,
        }
    }

    /// Normalization parameters.
    pub fn normalize_params(&self) -> NormalizeParams {
        NormalizeParams {
            weld: self.weld_tolerance,
        }
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
