//! ESP32-S3 firmware-specific modules for senso-rs
//!
//! This crate contains hardware-specific code that cannot compile on desktop
//! targets: the ADC-backed sensor, the LEDC-backed buzzer and the
//! embassy-time clock the sketches poll.
//!
//! Pin assignment shared by the binaries:
//!
//! | Signal  | GPIO |
//! |---------|------|
//! | Sensor  | 4    |
//! | LED 1-3 | 1-3  |
//! | Buzzer  | 5    |

#![no_std]

pub mod adc_sensor;
pub mod buzzer;
pub mod clock;
