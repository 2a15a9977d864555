//! Hourly light/sound estimate against the range learned over the day.
//!
//! No calibration needed: the day's min/max are relearned every 24 hours and
//! the hourly average is announced by its quartile.

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
use esp_hal::ledc::channel::{self, ChannelIFace};
use esp_hal::ledc::timer::{self, TimerIFace};
use esp_hal::ledc::{LSGlobalClkSource, Ledc, LowSpeed};
use esp_hal::peripherals::ADC1;
use esp_hal::time::Rate;
use esp_hal::timer::timg::TimerGroup;
use log::info;

use senso_core::actuators::BeepDriver;
use senso_core::config::AdaptiveBeepConfig;
use senso_core::sensors::Downscaled;
use senso_core::sketches::{AdaptiveBeep, Sketch};
use senso_firmware::adc_sensor::{ADC_BITS, AdcSensor};
use senso_firmware::buzzer::LedcBuzzer;
use senso_firmware::clock::EmbassyClock;

const CONFIG: AdaptiveBeepConfig = AdaptiveBeepConfig::DEFAULT;

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

    CONFIG.validate().expect("Invalid adaptive-beep configuration");

    // Buzzer: LEDC timer fixed at the tone frequency, duty toggled 0%/50%
    let mut ledc = Ledc::new(peripherals.LEDC);
    ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);

    let mut buzzer_timer = ledc.timer::<LowSpeed>(timer::Number::Timer0);
    buzzer_timer
        .configure(timer::config::Config {
            duty: timer::config::Duty::Duty10Bit,
            clock_source: timer::LSClockSource::APBClk,
            frequency: Rate::from_hz(CONFIG.beep.tone_hz),
        })
        .expect("Failed to configure buzzer timer");

    let mut buzzer_channel = ledc.channel(channel::Number::Channel0, peripherals.GPIO5);
    buzzer_channel
        .configure(channel::config::Config {
            timer: &buzzer_timer,
            duty_pct: 0,
            pin_config: channel::config::PinConfig::PushPull,
        })
        .expect("Failed to configure buzzer channel");

    // Sensor: divider on GPIO4, 11dB attenuation for the full 0-3.3V swing
    let mut adc_config = AdcConfig::new();
    let adc_pin = adc_config
        .enable_pin_with_cal::<_, AdcCalBasic<ADC1<'static>>>(peripherals.GPIO4, Attenuation::_11dB);
    let adc = Adc::new(peripherals.ADC1, adc_config);
    let sensor = Downscaled::new(AdcSensor::new(adc, adc_pin, "ldr"), ADC_BITS);

    let beeper = BeepDriver::new(
        LedcBuzzer::new(buzzer_channel, CONFIG.beep.tone_hz),
        Delay,
        CONFIG.beep,
    );

    info!(
        "adaptive-beep: sampling every {} ms, reporting every {} ms, range reset every {} ms",
        CONFIG.sample_interval_ms,
        CONFIG.report_interval_ms,
        CONFIG.reset_interval_ms
    );

    // HOURLY_CAPACITY samples: one per second for the report interval
    let mut sketch: AdaptiveBeep<_, _, _, _> =
        AdaptiveBeep::new(sensor, beeper, EmbassyClock, CONFIG);
    sketch.run()
}
