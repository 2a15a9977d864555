//! One-shot ADC reads for the light/sound sensor divider.

use esp_hal::Blocking;
use esp_hal::analog::adc::{
    Adc, AdcCalBasic, AdcCalScheme, AdcChannel, AdcPin, RegisterAccess,
};
use esp_hal::peripherals::{ADC1, GPIO4};
use senso_core::sensors::{AnalogSensor, Downscaled, Reading};

/// Width of the ESP32-S3 SAR ADC.
pub const ADC_BITS: u32 = 12;

/// The sensor divider on GPIO4, scaled down to the sketches' 10-bit range.
pub type BoardSensor =
    Downscaled<AdcSensor<'static, ADC1<'static>, GPIO4<'static>, AdcCalBasic<ADC1<'static>>>>;

/// Blocking one-shot reads on a single ADC pin.
pub struct AdcSensor<'d, ADCI, PIN, CS> {
    adc: Adc<'d, ADCI, Blocking>,
    pin: AdcPin<PIN, ADCI, CS>,
    name: &'static str,
}

impl<'d, ADCI, PIN, CS> AdcSensor<'d, ADCI, PIN, CS>
where
    ADCI: RegisterAccess + 'd,
    PIN: AdcChannel,
    CS: AdcCalScheme<ADCI>,
{
    pub fn new(adc: Adc<'d, ADCI, Blocking>, pin: AdcPin<PIN, ADCI, CS>, name: &'static str) -> Self {
        Self { adc, pin, name }
    }
}

impl<'d, ADCI, PIN, CS> AnalogSensor for AdcSensor<'d, ADCI, PIN, CS>
where
    ADCI: RegisterAccess + 'd,
    PIN: AdcChannel,
    CS: AdcCalScheme<ADCI>,
{
    type Error = ();

    fn read(&mut self) -> Result<Reading, ()> {
        // nb::block! waits until the conversion is complete
        nb::block!(self.adc.read_oneshot(&mut self.pin))
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
