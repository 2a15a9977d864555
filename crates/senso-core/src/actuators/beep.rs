use embedded_hal::delay::DelayNs;
use log::{debug, error};

use super::{ActuatorError, ToneOutput};
use crate::config::BeepConfig;
use crate::metrics::{BAND_COUNT, Estimate};

/// Most pulses a single report can emit.
const MAX_PULSES: i32 = (BAND_COUNT - 1) as i32;

/// Counts an estimate out as short beeps.
pub struct BeepDriver<T, D> {
    tone: T,
    delay: D,
    config: BeepConfig,
}

impl<T: ToneOutput, D: DelayNs> BeepDriver<T, D> {
    pub const fn new(tone: T, delay: D, config: BeepConfig) -> Self {
        Self {
            tone,
            delay,
            config,
        }
    }

    /// Emit `count` pulses, clamped to `0..=3`. Pulses are separated by one
    /// gap; there is no trailing gap after the last pulse.
    pub fn beep_count(&mut self, count: i32) -> Result<(), ActuatorError> {
        let pulses = count.clamp(0, MAX_PULSES);
        debug!("beep x{} (requested {})", pulses, count);

        for pulse in 0..pulses {
            if pulse > 0 {
                self.delay.delay_ms(self.config.gap_ms);
            }
            self.pulse()?;
        }
        Ok(())
    }

    pub fn tone_mut(&mut self) -> &mut T {
        &mut self.tone
    }

    pub fn beep_estimate(&mut self, estimate: Estimate) -> Result<(), ActuatorError> {
        self.beep_count(estimate.get() as i32)
    }

    fn pulse(&mut self) -> Result<(), ActuatorError> {
        self.tone.tone(self.config.tone_hz).map_err(|e| {
            error!("tone({} Hz) failed: {:?}", self.config.tone_hz, e);
            ActuatorError::Tone
        })?;
        self.delay.delay_ms(self.config.pulse_ms);
        self.tone.no_tone().map_err(|e| {
            error!("no_tone failed: {:?}", e);
            ActuatorError::Tone
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingTone, ToneCall};
    use crate::timing::{Clock, VirtualClock, VirtualDelay};

    fn driver(clock: &VirtualClock) -> BeepDriver<RecordingTone<'_>, VirtualDelay<'_>> {
        BeepDriver::new(
            RecordingTone::new(clock),
            VirtualDelay::new(clock),
            BeepConfig::DEFAULT,
        )
    }

    #[test]
    fn test_two_beeps_timing() {
        let clock = VirtualClock::new();
        let mut beeper = driver(&clock);

        beeper.beep_count(2).unwrap();

        assert_eq!(
            beeper.tone.calls,
            [
                (0, ToneCall::On(1_000)),
                (200, ToneCall::Off),
                (400, ToneCall::On(1_000)),
                (600, ToneCall::Off),
            ]
        );
        assert_eq!(clock.now_ms(), 600, "no trailing gap after the last pulse");
    }

    #[test]
    fn test_zero_and_negative_are_silent() {
        let clock = VirtualClock::new();
        let mut beeper = driver(&clock);

        beeper.beep_count(0).unwrap();
        beeper.beep_count(-4).unwrap();

        assert!(beeper.tone.calls.is_empty());
        assert_eq!(clock.now_ms(), 0);
    }

    #[test]
    fn test_count_clamps_to_three() {
        let clock = VirtualClock::new();
        let mut beeper = driver(&clock);

        beeper.beep_count(5).unwrap();

        assert_eq!(beeper.tone.pulses(), 3);
        assert_eq!(clock.now_ms(), 3 * 200 + 2 * 200);
    }

    #[test]
    fn test_beep_estimate() {
        let clock = VirtualClock::new();
        let mut beeper = driver(&clock);

        beeper.beep_estimate(Estimate::clamped(1)).unwrap();
        assert_eq!(beeper.tone.pulses(), 1);
        assert_eq!(clock.now_ms(), 200);
    }

    #[test]
    fn test_tone_failure_surfaces() {
        let clock = VirtualClock::new();
        let mut beeper = driver(&clock);
        beeper.tone.fail = true;

        assert_eq!(beeper.beep_count(1), Err(ActuatorError::Tone));
    }
}
