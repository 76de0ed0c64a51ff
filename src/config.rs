//! Layered story configuration.
//!
//! Sources, highest priority first:
//! 1. Environment variables with the `CDS_` prefix (`CDS_UPDATE_DB=true`)
//! 2. `hubbleds.toml` in the working directory, if present
//! 3. Built-in defaults

use crate::core::{GalaxyData, DISTANCE_CONSTANT};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE: &str = "hubbleds.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment extraction or merge error.
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    /// A configuration field has an invalid value.
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryConfig {
    /// Angular size (arcsec) to distance (Mpc) conversion constant.
    pub distance_constant: f64,
    /// Persist stage state and measurements.
    pub update_db: bool,
    /// Verbose logging.
    pub debug_mode: bool,
    pub class_code: String,
    /// Demo deployment: nothing is persisted.
    pub force_demo: bool,
    /// Galaxies the example table starts with, numbered in order.
    #[serde(default)]
    pub example_galaxies: Vec<GalaxyData>,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            distance_constant: DISTANCE_CONSTANT,
            update_db: false,
            debug_mode: false,
            class_code: String::new(),
            force_demo: false,
            example_galaxies: Vec::new(),
        }
    }
}

impl StoryConfig {
    /// Load from defaults, `hubbleds.toml` and `CDS_*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(CONFIG_FILE)
    }

    /// Like [`load`](Self::load) with an explicit config file path.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(path.as_ref()).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    pub fn figment(path: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        let path = PathBuf::from(path);
        if path.exists() {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed("CDS_"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.distance_constant.is_finite() || self.distance_constant <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "distance_constant".to_string(),
                reason: format!("must be positive and finite, got {}", self.distance_constant),
            });
        }
        for galaxy in &self.example_galaxies {
            let readings = [galaxy.ra, galaxy.decl, galaxy.z, galaxy.rest_wave];
            if galaxy.id.is_empty() || readings.iter().any(|v| !v.is_finite()) {
                return Err(ConfigError::InvalidValue {
                    field: "example_galaxies".to_string(),
                    reason: format!("galaxy '{}' needs an id and finite coordinates", galaxy.id),
                });
            }
        }
        Ok(())
    }

    /// Whether sessions write to the state store.
    pub fn persists(&self) -> bool {
        self.update_db && !self.force_demo
    }

    /// Default log filter directive for this configuration.
    pub fn log_level(&self) -> &'static str {
        if self.debug_mode {
            "debug"
        } else {
            "info"
        }
    }
}
