//! Band and level classification for sensor readings
//!
//! This module maps raw readings onto the small ordinal scales the actuators
//! understand: a 0-3 [`Estimate`] (how many of three lamps look lit, or how
//! loud the room is) and a 3-step [`ActivityLevel`].

use serde::{Deserialize, Serialize};

use crate::sensors::{NATIVE_FULL_SCALE, Reading};
use crate::stats::Spread;

/// Smallest learned span, in raw units, trusted for adaptive banding.
pub const DEFAULT_TOLERANCE: Reading = 5;

/// Narrowest span whose floored quartiles all sit strictly inside
/// `(min, max)`. Below this the lowest breakpoint collapses onto `min`.
pub const MIN_QUARTILE_SPAN: Reading = BAND_COUNT as Reading;

/// Number of bands an [`Estimate`] can take.
pub const BAND_COUNT: u8 = 4;

/// Ordinal estimate in `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Estimate(u8);

impl Estimate {
    pub const MAX: Self = Self(BAND_COUNT - 1);

    /// Build an estimate, clamping anything above 3.
    pub const fn clamped(band: u32) -> Self {
        if band >= (BAND_COUNT - 1) as u32 {
            Self::MAX
        } else {
            Self(band as u8)
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

/// Anything that can bucket a reading into an [`Estimate`].
pub trait BandClassifier {
    fn estimate(&self, reading: Reading) -> Estimate;
}

/// Walk the `value < t1 < t2 < t3` ladder.
fn ladder(reading: Reading, [t1, t2, t3]: [Reading; 3]) -> Estimate {
    if reading < t1 {
        Estimate(0)
    } else if reading < t2 {
        Estimate(1)
    } else if reading < t3 {
        Estimate(2)
    } else {
        Estimate(3)
    }
}

/// Three manually calibrated breakpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedThresholds {
    pub t1: Reading,
    pub t2: Reading,
    pub t3: Reading,
}

impl FixedThresholds {
    /// Calibration for the reference LDR divider on the 10-bit scale.
    pub const DEFAULT: Self = Self::new(150, 400, 700);

    pub const fn new(t1: Reading, t2: Reading, t3: Reading) -> Self {
        Self { t1, t2, t3 }
    }

    pub const fn is_ascending(&self) -> bool {
        self.t1 < self.t2 && self.t2 < self.t3
    }
}

impl Default for FixedThresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl BandClassifier for FixedThresholds {
    fn estimate(&self, reading: Reading) -> Estimate {
        ladder(reading, [self.t1, self.t2, self.t3])
    }
}

/// Minimum and maximum seen since the last reset.
///
/// Starts at the sentinel extremes `(full_scale, 0)`, so the first observed
/// reading establishes both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    min: Reading,
    max: Reading,
    full_scale: Reading,
}

impl Default for DayRange {
    fn default() -> Self {
        Self::new(NATIVE_FULL_SCALE)
    }
}

impl DayRange {
    pub const fn new(full_scale: Reading) -> Self {
        Self {
            min: full_scale,
            max: 0,
            full_scale,
        }
    }

    pub fn observe(&mut self, reading: Reading) {
        self.min = self.min.min(reading);
        self.max = self.max.max(reading);
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.full_scale);
    }

    pub const fn min(&self) -> Reading {
        self.min
    }

    pub const fn max(&self) -> Reading {
        self.max
    }

    /// `max - min`, or `None` while the range is still inverted.
    pub const fn span(&self) -> Option<Reading> {
        self.max.checked_sub(self.min)
    }
}

/// Quartile bands over a learned range, with an equal-banding fallback over
/// the full native scale when the range is too narrow to trust.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdaptiveThresholds {
    pub range: DayRange,
    pub tolerance: Reading,
}

impl AdaptiveThresholds {
    pub const fn new(range: DayRange, tolerance: Reading) -> Self {
        Self { range, tolerance }
    }

    /// Quartile breakpoints, or `None` when the span is within tolerance or
    /// narrower than [`MIN_QUARTILE_SPAN`].
    pub fn breakpoints(&self) -> Option<[Reading; 3]> {
        let span = self
            .range
            .span()
            .filter(|&span| span > self.tolerance && span >= MIN_QUARTILE_SPAN)?
            as u32;
        let min = self.range.min() as u32;
        Some([
            (min + span / 4) as Reading,
            (min + span / 2) as Reading,
            (min + 3 * span / 4) as Reading,
        ])
    }

    fn fallback(&self, reading: Reading) -> Estimate {
        let scale = self.range.full_scale as u32 + 1;
        Estimate::clamped(reading as u32 * BAND_COUNT as u32 / scale)
    }
}

impl BandClassifier for AdaptiveThresholds {
    fn estimate(&self, reading: Reading) -> Estimate {
        match self.breakpoints() {
            Some(breakpoints) => ladder(reading, breakpoints),
            None => self.fallback(reading),
        }
    }
}

/// Activity level driving the LED bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ActivityLevel {
    /// Below the learned median
    Low,
    /// Between median and maximum
    Medium,
    /// At or above the learned maximum
    High,
}

impl ActivityLevel {
    /// How many LEDs of the bar are lit.
    pub const fn lit_count(self) -> usize {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Breakpoints learned once from a full sampling window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelThresholds {
    pub spread: Spread,
}

impl LevelThresholds {
    pub const fn new(spread: Spread) -> Self {
        Self { spread }
    }

    pub fn assess(&self, reading: Reading) -> ActivityLevel {
        if reading < self.spread.median {
            ActivityLevel::Low
        } else if reading < self.spread.max {
            ActivityLevel::Medium
        } else {
            ActivityLevel::High
        }
    }
}
