//! Learn a day of light/sound readings, then blink the activity level.
//!
//! The LED bar shows 1, 2 or 3 lit LEDs for readings below the learned
//! median, below the learned max, and at or above it. Learning restarts only
//! on power cycle.

#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]

use embassy_executor::Spawner;
use embassy_time::Delay;
use esp_hal::analog::adc::{Adc, AdcCalBasic, AdcConfig, Attenuation};
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::peripherals::ADC1;
use esp_hal::timer::timg::TimerGroup;
use log::info;
use static_cell::StaticCell;

use senso_core::actuators::LedBlinker;
use senso_core::config::LearnBlinkConfig;
use senso_core::sensors::Downscaled;
use senso_core::sketches::{LearnBlink, Sketch};
use senso_firmware::adc_sensor::{ADC_BITS, AdcSensor, BoardSensor};
use senso_firmware::clock::EmbassyClock;

const CONFIG: LearnBlinkConfig = LearnBlinkConfig::DEFAULT;

type Firmware = LearnBlink<BoardSensor, Output<'static>, Delay, EmbassyClock>;

// A day of samples is too large for the main task's stack.
static SKETCH: StaticCell<Firmware> = StaticCell::new();

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rtt_target::rprintln!("PANIC: {}", info);
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    rtt_target::rtt_init_log!();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    CONFIG.validate().expect("Invalid learn-blink configuration");

    let leds = [
        Output::new(peripherals.GPIO1, Level::Low, OutputConfig::default()),
        Output::new(peripherals.GPIO2, Level::Low, OutputConfig::default()),
        Output::new(peripherals.GPIO3, Level::Low, OutputConfig::default()),
    ];

    let mut adc_config = AdcConfig::new();
    let adc_pin = adc_config
        .enable_pin_with_cal::<_, AdcCalBasic<ADC1<'static>>>(peripherals.GPIO4, Attenuation::_11dB);
    let adc = Adc::new(peripherals.ADC1, adc_config);
    let sensor = Downscaled::new(AdcSensor::new(adc, adc_pin, "ldr"), ADC_BITS);

    info!(
        "learn-blink: sampling every {} ms for {} ms",
        CONFIG.sample_interval_ms, CONFIG.learning_ms
    );

    let sketch = SKETCH.init(LearnBlink::new(
        sensor,
        LedBlinker::new(leds, Delay, CONFIG.blink),
        EmbassyClock,
        CONFIG,
    ));
    sketch.run()
}
