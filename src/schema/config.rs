//! Configuration for timeline behaviour.

use serde::{Deserialize, Serialize};

use super::InterpolationKind;

/// Default kind used when `Inherit` has nothing to inherit from.
fn default_kind() -> InterpolationKind {
    InterpolationKind::Symmetric
}

/// Default step for finite-difference derivatives, in seconds.
fn default_derivative_step() -> f64 {
    0.01
}

/// Per-timeline settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// Kind given to a point inserted with `Inherit` into an empty timeline.
    #[serde(default = "default_kind")]
    pub default_kind: InterpolationKind,
    /// Step `h` used by `Timeline::derivative`.
    #[serde(default = "default_derivative_step")]
    pub derivative_step: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            default_kind: default_kind(),
            derivative_step: default_derivative_step(),
        }
    }
}

impl TimelineConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.derivative_step.is_finite() || self.derivative_step <= 0.0 {
            return Err(ConfigError::InvalidDerivativeStep(self.derivative_step));
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Derivative step must be finite and positive, got {0}")]
    InvalidDerivativeStep(f64),
}
