//! Element lookup and solver settings.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthError};
use crate::mapping::NewtonSettings;

fn default_k_nearest() -> usize {
    6
}

fn default_tolerance() -> f64 {
    1e-3
}

fn default_newton_max_iterations() -> usize {
    25
}

fn default_newton_tolerance() -> f64 {
    1e-12
}

/// Settings shared by every query against a database handle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SynthConfig {
    /// Number of nearest elements tried before giving up
    #[serde(default = "default_k_nearest")]
    pub k_nearest: usize,
    /// Slack on the reference square [-1, 1]² when testing containment
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Iteration cap of the curved-element inverse mapping
    #[serde(default = "default_newton_max_iterations")]
    pub newton_max_iterations: usize,
    /// Step size below which the curved-element inverse mapping has converged
    #[serde(default = "default_newton_tolerance")]
    pub newton_tolerance: f64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            k_nearest: default_k_nearest(),
            tolerance: default_tolerance(),
            newton_max_iterations: default_newton_max_iterations(),
            newton_tolerance: default_newton_tolerance(),
        }
    }
}

impl SynthConfig {
    /// Parse a JSON document; absent fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SynthError::Configuration(format!("Invalid settings: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            SynthError::Configuration(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.k_nearest == 0 {
            return Err(SynthError::Configuration(
                "k_nearest must be at least 1".to_string(),
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(SynthError::Configuration(format!(
                "tolerance must be a finite non-negative number, got {}",
                self.tolerance
            )));
        }
        if self.newton_max_iterations == 0 {
            return Err(SynthError::Configuration(
                "newton_max_iterations must be at least 1".to_string(),
            ));
        }
        if !self.newton_tolerance.is_finite() || self.newton_tolerance <= 0.0 {
            return Err(SynthError::Configuration(format!(
                "newton_tolerance must be a finite positive number, got {}",
                self.newton_tolerance
            )));
        }
        Ok(())
    }

    pub fn newton(&self) -> NewtonSettings {
        NewtonSettings {
            max_iterations: self.newton_max_iterations,
            tolerance: self.newton_tolerance,
        }
    }
}
