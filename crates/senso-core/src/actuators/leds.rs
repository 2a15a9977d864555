use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error as _, OutputPin, PinState};

use super::ActuatorError;
use crate::config::BlinkConfig;
use crate::metrics::ActivityLevel;

/// LEDs in the activity bar.
pub const LED_COUNT: usize = 3;

/// Three-LED bar blinking the current activity level.
pub struct LedBlinker<P, D> {
    leds: [P; LED_COUNT],
    delay: D,
    config: BlinkConfig,
}

impl<P: OutputPin, D: DelayNs> LedBlinker<P, D> {
    pub const fn new(leds: [P; LED_COUNT], delay: D, config: BlinkConfig) -> Self {
        Self {
            leds,
            delay,
            config,
        }
    }

    /// One full on/off cycle: light the first `level.lit_count()` LEDs for
    /// the on period, then everything off for the off period.
    pub fn blink(&mut self, level: ActivityLevel) -> Result<(), ActuatorError> {
        self.show(level.lit_count())?;
        self.delay.delay_ms(self.config.on_ms);
        self.show(0)?;
        self.delay.delay_ms(self.config.off_ms);
        Ok(())
    }

    /// Wait out one blink cycle with the bar dark.
    pub fn pause(&mut self) {
        self.delay.delay_ms(self.config.on_ms);
        self.delay.delay_ms(self.config.off_ms);
    }

    pub fn leds_mut(&mut self) -> &mut [P; LED_COUNT] {
        &mut self.leds
    }

    /// Light the first `lit` LEDs and turn the rest off.
    pub fn show(&mut self, lit: usize) -> Result<(), ActuatorError> {
        for (index, led) in self.leds.iter_mut().enumerate() {
            led.set_state(PinState::from(index < lit))
                .map_err(|e| ActuatorError::Pin(e.kind()))?;
        }
        Ok(())
    }
}
