//! Analog inputs polled by the sketches
//!
//! A sensor is anything that yields one [`Reading`] per call on the 10-bit
//! native scale. Wider converters go through [`Downscaled`].

use core::fmt::Debug;

use log::error;
use thiserror_no_std::Error;

/// One raw analog reading in the sensor's native range.
pub type Reading = u16;

/// Full scale of the native 10-bit range the thresholds are calibrated for.
pub const NATIVE_FULL_SCALE: Reading = 1023;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    #[error("{sensor}: read failed")]
    ReadFailed { sensor: &'static str },
}

/// A polled analog input: light-dependent resistor, electret microphone, ...
pub trait AnalogSensor {
    type Error: Debug;

    /// Take one conversion. Never waits longer than the conversion itself.
    fn read(&mut self) -> Result<Reading, Self::Error>;

    /// Name used in diagnostics.
    fn name(&self) -> &'static str {
        "analog"
    }
}

impl<S: AnalogSensor + ?Sized> AnalogSensor for &mut S {
    type Error = S::Error;

    fn read(&mut self) -> Result<Reading, Self::Error> {
        (**self).read()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Read `sensor` and fold its driver error into [`SensorError`].
pub(crate) fn sample<S: AnalogSensor>(sensor: &mut S) -> Result<Reading, SensorError> {
    sensor.read().map_err(|e| {
        error!("{}: read failed: {:?}", sensor.name(), e);
        SensorError::ReadFailed {
            sensor: sensor.name(),
        }
    })
}

/// Wraps a wider ADC (e.g. the ESP32's 12 bits) and shifts its readings down
/// to the 10-bit native range.
pub struct Downscaled<S> {
    sensor: S,
    shift: u32,
}

impl<S: AnalogSensor> Downscaled<S> {
    /// `adc_bits` is the width of the wrapped converter; must be at least 10.
    pub const fn new(sensor: S, adc_bits: u32) -> Self {
        Self {
            sensor,
            shift: adc_bits.saturating_sub(10),
        }
    }
}

impl<S: AnalogSensor> AnalogSensor for Downscaled<S> {
    type Error = S::Error;

    fn read(&mut self) -> Result<Reading, Self::Error> {
        let raw = self.sensor.read()?;
        Ok((raw >> self.shift).min(NATIVE_FULL_SCALE))
    }

    fn name(&self) -> &'static str {
        self.sensor.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedSensor;

    #[test]
    fn test_downscale_twelve_bit() {
        let mut sensor = Downscaled::new(ScriptedSensor::new(&[0, 4, 2048, 4095]), 12);
        assert_eq!(sensor.read(), Ok(0));
        assert_eq!(sensor.read(), Ok(1));
        assert_eq!(sensor.read(), Ok(512));
        assert_eq!(sensor.read(), Ok(1023));
    }

    #[test]
    fn test_downscale_clamps_out_of_range() {
        let mut sensor = Downscaled::new(ScriptedSensor::new(&[2000]), 10);
        assert_eq!(sensor.read(), Ok(1023));
    }

    #[test]
    fn test_sample_maps_driver_errors() {
        let mut sensor = ScriptedSensor::failing();
        assert_eq!(
            sample(&mut sensor),
            Err(SensorError::ReadFailed { sensor: "scripted" })
        );
    }
}
