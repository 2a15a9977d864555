//! Hardware-independent core library for senso-rs
//!
//! This crate contains all platform-agnostic logic for the light and sound
//! sketches: periodic timers, sample buffers, aggregation, threshold
//! classification, actuator drivers written against `embedded-hal` traits, and
//! the three sketch control loops themselves.
//!
//! It is `#![no_std]` so it compiles on both embedded targets (ESP32-S3) and
//! desktop hosts (for the simulator and tests).

#![cfg_attr(not(test), no_std)]

pub mod actuators;
pub mod buffer;
pub mod config;
pub mod metrics;
pub mod sensors;
pub mod sketches;
pub mod stats;
pub mod timing;

#[cfg(test)]
pub(crate) mod test_support;
