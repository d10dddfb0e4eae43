//! Engine configuration: how long each kind of step is shown to an observer.
//!
//! Durations are per pacing class in milliseconds, multiplied by `scale`.
//! Sinks that do not sleep (tests, benchmarks) ignore pacing entirely, so
//! [`EngineConfig::headless`] exists mostly to make intent explicit.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Upper bound for [`Pacing::scale`].
pub const MAX_SCALE: f64 = 100.0;

/// Which pacing duration a step uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacingClass {
    Intro,
    Discover,
    Edge,
    Finish,
    Consider,
    Accept,
    Reject,
    Inspect,
    Round,
    Warning,
    Summary,
    /// Highlight/reset bookkeeping: never paced.
    Silent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pacing {
    pub intro_ms: u64,
    pub discover_ms: u64,
    pub edge_ms: u64,
    pub finish_ms: u64,
    pub consider_ms: u64,
    pub accept_ms: u64,
    pub reject_ms: u64,
    pub inspect_ms: u64,
    pub round_ms: u64,
    pub warning_ms: u64,
    pub summary_ms: u64,
    pub scale: f64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            intro_ms: 1000,
            discover_ms: 800,
            edge_ms: 500,
            finish_ms: 800,
            consider_ms: 500,
            accept_ms: 800,
            reject_ms: 200,
            inspect_ms: 300,
            round_ms: 700,
            warning_ms: 1500,
            summary_ms: 0,
            scale: 1.0,
        }
    }
}

impl Pacing {
    /// All durations zero.
    pub fn none() -> Self {
        Self {
            scale: 0.0,
            ..Self::default()
        }
    }

    pub fn millis(&self, class: PacingClass) -> u64 {
        match class {
            PacingClass::Intro => self.intro_ms,
            PacingClass::Discover => self.discover_ms,
            PacingClass::Edge => self.edge_ms,
            PacingClass::Finish => self.finish_ms,
            PacingClass::Consider => self.consider_ms,
            PacingClass::Accept => self.accept_ms,
            PacingClass::Reject => self.reject_ms,
            PacingClass::Inspect => self.inspect_ms,
            PacingClass::Round => self.round_ms,
            PacingClass::Warning => self.warning_ms,
            PacingClass::Summary => self.summary_ms,
            PacingClass::Silent => 0,
        }
    }

    pub fn duration(&self, class: PacingClass) -> Duration {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Duration::ZERO;
        }
        let micros = self.millis(class) as f64 * self.scale.min(MAX_SCALE) * 1000.0;
        Duration::from_micros(micros.round() as u64)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub pacing: Pacing,
}

impl EngineConfig {
    /// No pacing at all, for tests and benchmarks.
    pub fn headless() -> Self {
        Self {
            pacing: Pacing::none(),
        }
    }

    /// Parse JSON (missing fields take their defaults) and validate.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let scale = self.pacing.scale;
        if !scale.is_finite() || !(0.0..=MAX_SCALE).contains(&scale) {
            return Err(Error::InvalidConfig(format!(
                "pacing.scale must be within 0..={MAX_SCALE}, got {scale}"
            )));
        }
        Ok(())
    }
}
