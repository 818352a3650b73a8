//! Configuration for the probe network and its optimiser.

use std::{fs, path::Path};

use candle_core::Device;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Width of the probe's hidden layer.
pub const DEFAULT_HIDDEN_UNITS: usize = 512;

/// Device the probe runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    #[default]
    Cpu,
    Cuda,
    Metal,
}

impl DeviceKind {
    /// Resolve to a candle device (ordinal 0 for accelerators).
    pub fn device(self) -> Result<Device> {
        match self {
            DeviceKind::Cpu => Ok(Device::Cpu),
            DeviceKind::Cuda => Ok(Device::new_cuda(0)?),
            DeviceKind::Metal => Ok(Device::new_metal(0)?),
        }
    }
}

/// Configuration for the goal ordering prediction metric.
///
/// # Examples
///
/// ```
/// use comaze_probe::config::MetricConfig;
///
/// let config = MetricConfig::new()
///     .with_hidden_units(128)
///     .with_learning_rate(1e-3);
/// assert_eq!(config.hidden_units, 128);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricConfig {
    /// Width of the probe's hidden ReLU layer
    pub hidden_units: usize,
    /// AdamW learning rate used by the probe trainer
    pub learning_rate: f64,
    /// AdamW weight decay used by the probe trainer
    pub weight_decay: f64,
    /// Device the probe parameters live on
    pub device: DeviceKind,
}

impl MetricConfig {
    /// Create a configuration with default values:
    /// - Hidden units: 512
    /// - Learning rate: 3e-4
    /// - Weight decay: 0.0
    /// - Device: CPU
    pub fn new() -> Self {
        Self {
            hidden_units: DEFAULT_HIDDEN_UNITS,
            learning_rate: 3e-4,
            weight_decay: 0.0,
            device: DeviceKind::Cpu,
        }
    }

    pub fn with_hidden_units(mut self, hidden_units: usize) -> Self {
        self.hidden_units = hidden_units;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_weight_decay(mut self, weight_decay: f64) -> Self {
        self.weight_decay = weight_decay;
        self
    }

    pub fn with_device(mut self, device: DeviceKind) -> Self {
        self.device = device;
        self
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] for a zero-width hidden layer or
    /// a non-positive or non-finite learning rate.
    pub fn validate(&self) -> Result<()> {
        if self.hidden_units == 0 {
            return Err(Error::InvalidConfiguration {
                message: "hidden_units must be at least 1".to_string(),
            });
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfiguration {
                message: format!("learning_rate {} must be positive", self.learning_rate),
            });
        }
        if !(self.weight_decay.is_finite() && self.weight_decay >= 0.0) {
            return Err(Error::InvalidConfiguration {
                message: format!("weight_decay {} must be non-negative", self.weight_decay),
            });
        }
        Ok(())
    }

    /// Load and validate a configuration from a JSON file. Missing fields take
    /// their default values.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| Error::Io {
            operation: format!("read config {path:?}"),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for MetricConfig {
    fn default() -> Self {
        Self::new()
    }
}
