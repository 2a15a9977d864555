//! Buzzer and LED drivers.
//!
//! Both drivers block for the whole pulse train through an
//! [`embedded_hal::delay::DelayNs`]; nothing is sampled while they run.

mod beep;
mod leds;

pub use beep::BeepDriver;
pub use leds::{LED_COUNT, LedBlinker};

use core::fmt::Debug;

use embedded_hal::digital::ErrorKind;
use thiserror_no_std::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    #[error("LED output failed: {0:?}")]
    Pin(ErrorKind),
    #[error("tone output failed")]
    Tone,
}

/// A square-wave output driving a passive buzzer.
pub trait ToneOutput {
    type Error: Debug;

    /// Start a tone at `frequency_hz`; keeps sounding until [`no_tone`](Self::no_tone).
    fn tone(&mut self, frequency_hz: u32) -> Result<(), Self::Error>;

    fn no_tone(&mut self) -> Result<(), Self::Error>;
}

impl<T: ToneOutput + ?Sized> ToneOutput for &mut T {
    type Error = T::Error;

    fn tone(&mut self, frequency_hz: u32) -> Result<(), Self::Error> {
        (**self).tone(frequency_hz)
    }

    fn no_tone(&mut self) -> Result<(), Self::Error> {
        (**self).no_tone()
    }
}
