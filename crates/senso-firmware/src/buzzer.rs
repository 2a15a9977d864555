//! Passive buzzer on an LEDC PWM channel.

use esp_hal::ledc::LowSpeed;
use esp_hal::ledc::channel::{self, Channel, ChannelIFace};
use log::warn;
use senso_core::actuators::ToneOutput;

/// Square wave from an LEDC channel whose timer was configured at
/// `frequency_hz`. Sounding is 50% duty, silence is 0%.
pub struct LedcBuzzer<'a> {
    channel: Channel<'a, LowSpeed>,
    frequency_hz: u32,
}

impl<'a> LedcBuzzer<'a> {
    /// `channel` must already be configured against a timer running at
    /// `frequency_hz`, with 0% duty.
    pub fn new(channel: Channel<'a, LowSpeed>, frequency_hz: u32) -> Self {
        Self {
            channel,
            frequency_hz,
        }
    }
}

impl ToneOutput for LedcBuzzer<'_> {
    type Error = channel::Error;

    fn tone(&mut self, frequency_hz: u32) -> Result<(), channel::Error> {
        if frequency_hz != self.frequency_hz {
            // The LEDC timer is shared and fixed at start-up.
            warn!(
                "tone {} Hz requested, timer runs at {} Hz",
                frequency_hz, self.frequency_hz
            );
        }
        self.channel.set_duty(50)
    }

    fn no_tone(&mut self) -> Result<(), channel::Error> {
        self.channel.set_duty(0)
    }
}
