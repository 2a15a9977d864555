//! Compile-time presets for the three sketches.
//!
//! Everything here is a constant baked into the firmware. The structs derive
//! serde so a host (the simulator) can load an override for experiments.

use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use crate::metrics::{DEFAULT_TOLERANCE, FixedThresholds, MIN_QUARTILE_SPAN};
use crate::sensors::{NATIVE_FULL_SCALE, Reading};
use crate::timing::{MS_PER_DAY, MS_PER_HOUR, MS_PER_SECOND};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),
    #[error("{window} ({window_ms} ms) is shorter than the sample interval")]
    WindowTooShort { window: &'static str, window_ms: u32 },
    #[error("fixed thresholds must be strictly ascending (got {t1}, {t2}, {t3})")]
    ThresholdsNotAscending { t1: Reading, t2: Reading, t3: Reading },
    #[error("full scale must be greater than zero")]
    ZeroFullScale,
    #[error("tolerance {tolerance} must be at least {min}")]
    ToleranceTooSmall { tolerance: Reading, min: Reading },
}

fn non_zero(value: u32, name: &'static str) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::ZeroInterval(name));
    }
    Ok(())
}

fn covers_sample(window_ms: u32, sample_ms: u32, window: &'static str) -> Result<(), ConfigError> {
    if window_ms < sample_ms {
        return Err(ConfigError::WindowTooShort { window, window_ms });
    }
    Ok(())
}

/// Buzzer pulse shape.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct BeepConfig {
    pub tone_hz: u32,
    pub pulse_ms: u32,
    pub gap_ms: u32,
}

impl BeepConfig {
    pub const DEFAULT: Self = Self {
        tone_hz: 1_000,
        pulse_ms: 200,
        gap_ms: 200,
    };

    pub fn validate(&self) -> Result<(), ConfigError> {
        non_zero(self.tone_hz, "tone_hz")?;
        non_zero(self.pulse_ms, "pulse_ms")
    }
}

impl Default for BeepConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// LED bar cadence.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct BlinkConfig {
    pub on_ms: u32,
    pub off_ms: u32,
}

impl BlinkConfig {
    pub const DEFAULT: Self = Self {
        on_ms: 500,
        off_ms: 500,
    };

    pub fn validate(&self) -> Result<(), ConfigError> {
        non_zero(self.on_ms, "on_ms")
    }
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Hourly average against manually calibrated thresholds, reported by beeps.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct FixedBeepConfig {
    pub sample_interval_ms: u32,
    pub report_interval_ms: u32,
    /// Breakpoints calibrated by watching the per-sample log under each
    /// lighting condition.
    pub thresholds: FixedThresholds,
    pub beep: BeepConfig,
    /// Log every sample, not just the reports.
    pub verbose: bool,
}

impl FixedBeepConfig {
    pub const DEFAULT: Self = Self {
        sample_interval_ms: MS_PER_SECOND,
        report_interval_ms: MS_PER_HOUR,
        thresholds: FixedThresholds::DEFAULT,
        beep: BeepConfig::DEFAULT,
        verbose: true,
    };

    pub fn validate(&self) -> Result<(), ConfigError> {
        non_zero(self.sample_interval_ms, "sample_interval_ms")?;
        covers_sample(
            self.report_interval_ms,
            self.sample_interval_ms,
            "report_interval_ms",
        )?;
        let FixedThresholds { t1, t2, t3 } = self.thresholds;
        if !self.thresholds.is_ascending() {
            return Err(ConfigError::ThresholdsNotAscending { t1, t2, t3 });
        }
        self.beep.validate()
    }
}

impl Default for FixedBeepConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Hourly average against the range learned since the last daily reset.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct AdaptiveBeepConfig {
    pub sample_interval_ms: u32,
    pub report_interval_ms: u32,
    pub reset_interval_ms: u32,
    /// Top of the sensor's native range; also the `min` sentinel.
    pub full_scale: Reading,
    /// Learned spans at or below this fall back to equal banding.
    pub tolerance: Reading,
    pub beep: BeepConfig,
    pub verbose: bool,
}

impl AdaptiveBeepConfig {
    pub const DEFAULT: Self = Self {
        sample_interval_ms: MS_PER_SECOND,
        report_interval_ms: MS_PER_HOUR,
        reset_interval_ms: MS_PER_DAY,
        full_scale: NATIVE_FULL_SCALE,
        tolerance: DEFAULT_TOLERANCE,
        beep: BeepConfig::DEFAULT,
        verbose: false,
    };

    pub fn validate(&self) -> Result<(), ConfigError> {
        non_zero(self.sample_interval_ms, "sample_interval_ms")?;
        covers_sample(
            self.report_interval_ms,
            self.sample_interval_ms,
            "report_interval_ms",
        )?;
        covers_sample(
            self.reset_interval_ms,
            self.sample_interval_ms,
            "reset_interval_ms",
        )?;
        if self.full_scale == 0 {
            return Err(ConfigError::ZeroFullScale);
        }
        let min = MIN_QUARTILE_SPAN - 1;
        if self.tolerance < min {
            return Err(ConfigError::ToleranceTooSmall {
                tolerance: self.tolerance,
                min,
            });
        }
        self.beep.validate()
    }
}

impl Default for AdaptiveBeepConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Learn min/median/max for a day, then blink the activity level forever.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct LearnBlinkConfig {
    pub sample_interval_ms: u32,
    /// How long to sample before switching to classification. Sampling also
    /// ends early once the buffer is full.
    pub learning_ms: u32,
    pub blink: BlinkConfig,
    pub verbose: bool,
}

impl LearnBlinkConfig {
    pub const DEFAULT: Self = Self {
        sample_interval_ms: 10 * MS_PER_SECOND,
        learning_ms: MS_PER_DAY,
        blink: BlinkConfig::DEFAULT,
        verbose: true,
    };

    pub fn validate(&self) -> Result<(), ConfigError> {
        non_zero(self.sample_interval_ms, "sample_interval_ms")?;
        covers_sample(self.learning_ms, self.sample_interval_ms, "learning_ms")?;
        self.blink.validate()
    }
}

impl Default for LearnBlinkConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
