//! Desktop simulator for the senso-rs light and sound sketches.
//!
//! Runs a sketch from `senso-core` against a synthetic day/night sensor on a
//! virtual clock. Delays advance the clock and idle stretches are skipped, so
//! days of operation finish in seconds. The buzzer and LEDs are logged rather
//! than driven.
//!
//! ```text
//! senso-simulator --sketch adaptive --hours 48
//! RUST_LOG=debug senso-simulator --sketch learn --config learn.json
//! ```
//!
//! A `--config` file is JSON for the chosen sketch's config struct; missing
//! fields keep the preset value.

use std::convert::Infallible;
use std::f64::consts::TAU;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, anyhow};
use clap::{Parser, ValueEnum};
use embedded_hal::digital::{ErrorType, OutputPin};
use log::{debug, error, info};
use serde::de::DeserializeOwned;

use senso_core::actuators::{BeepDriver, LedBlinker, ToneOutput};
use senso_core::config::{AdaptiveBeepConfig, FixedBeepConfig, LearnBlinkConfig};
use senso_core::metrics::BAND_COUNT;
use senso_core::sensors::{AnalogSensor, NATIVE_FULL_SCALE, Reading};
use senso_core::sketches::{AdaptiveBeep, Event, FixedBeep, LearnBlink, Sketch};
use senso_core::stats::Spread;
use senso_core::timing::{Clock, MS_PER_DAY, MS_PER_HOUR, MS_PER_SECOND, VirtualClock, VirtualDelay};

/// Longest run that fits the 32-bit millisecond counter without wrapping
/// past the start.
const MAX_HOURS: u32 = u32::MAX / MS_PER_HOUR;

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "senso-simulator")]
#[command(about = "Run a senso-rs sketch against a synthetic sensor", long_about = None)]
struct Args {
    /// Sketch to run
    #[arg(long, value_enum)]
    sketch: SketchKind,

    /// Simulated hours to run for
    #[arg(long, default_value = "24", value_parser = clap::value_parser!(u32).range(1..=MAX_HOURS as i64))]
    hours: u32,

    /// JSON override for the sketch's preset
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SketchKind {
    /// Running hourly average against fixed thresholds
    Fixed,
    /// Hourly buffer against the range learned each day
    Adaptive,
    /// Learn one day, then blink the activity level
    Learn,
}

// ---------------------------------------------------------------------------
// Simulated hardware
// ---------------------------------------------------------------------------

/// Light level following the sun: dark at midnight, brightest at noon, with a
/// small fast flicker on top.
struct DaylightSensor<'a> {
    clock: &'a VirtualClock,
}

impl<'a> DaylightSensor<'a> {
    fn new(clock: &'a VirtualClock) -> Self {
        Self { clock }
    }

    fn level_at(ms: u32) -> Reading {
        let t = ms as f64 / MS_PER_SECOND as f64;
        let day_phase = TAU * (ms % MS_PER_DAY) as f64 / MS_PER_DAY as f64;

        // 0.1 at midnight, 0.9 at noon
        let daylight = 0.5 - 0.4 * day_phase.cos();
        let flicker = 0.03 * (t / 7.0).sin();

        let level = (daylight + flicker).clamp(0.0, 1.0);
        (level * NATIVE_FULL_SCALE as f64).round() as Reading
    }
}

impl AnalogSensor for DaylightSensor<'_> {
    type Error = Infallible;

    fn read(&mut self) -> Result<Reading, Infallible> {
        Ok(Self::level_at(self.clock.now_ms()))
    }

    fn name(&self) -> &'static str {
        "daylight"
    }
}

/// Buzzer that logs instead of sounding.
struct LoggedBuzzer<'a> {
    clock: &'a VirtualClock,
}

impl ToneOutput for LoggedBuzzer<'_> {
    type Error = Infallible;

    fn tone(&mut self, frequency_hz: u32) -> Result<(), Infallible> {
        debug!("[{}] buzzer on, {} Hz", timestamp(self.clock.now_ms()), frequency_hz);
        Ok(())
    }

    fn no_tone(&mut self) -> Result<(), Infallible> {
        debug!("[{}] buzzer off", timestamp(self.clock.now_ms()));
        Ok(())
    }
}

/// LED pin that logs its level changes.
struct LoggedLed<'a> {
    index: usize,
    clock: &'a VirtualClock,
    high: bool,
}

impl<'a> LoggedLed<'a> {
    fn bar(clock: &'a VirtualClock) -> [Self; 3] {
        [0, 1, 2].map(|index| Self {
            index,
            clock,
            high: false,
        })
    }

    fn set(&mut self, high: bool) {
        if high != self.high {
            debug!(
                "[{}] led {} {}",
                timestamp(self.clock.now_ms()),
                self.index + 1,
                if high { "on" } else { "off" }
            );
        }
        self.high = high;
    }
}

impl ErrorType for LoggedLed<'_> {
    type Error = Infallible;
}

impl OutputPin for LoggedLed<'_> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(true);
        Ok(())
    }
}

/// `d<day> hh:mm:ss` on the virtual clock.
fn timestamp(ms: u32) -> String {
    let secs = ms / MS_PER_SECOND;
    format!(
        "d{} {:02}:{:02}:{:02}",
        ms / MS_PER_DAY,
        secs / 3600 % 24,
        secs / 60 % 60,
        secs % 60
    )
}

// ---------------------------------------------------------------------------
// Run summary
// ---------------------------------------------------------------------------

#[derive(Debug, Default, PartialEq)]
struct Summary {
    samples: u32,
    dropped: u32,
    reports: u32,
    silent_reports: u32,
    /// Reports per announced estimate, indexed by band.
    estimates: [u32; BAND_COUNT as usize],
    daily_resets: u32,
    learned: Option<(u32, Option<Spread>)>,
    /// Blinks per activity level, low to high.
    blinks: [u32; 3],
    errors: u32,
}

impl Summary {
    fn record(&mut self, event: &Event) {
        match event {
            Event::Sampled { .. } => self.samples += 1,
            Event::Dropped { .. } => self.dropped += 1,
            Event::Report(report) => {
                self.reports += 1;
                match report.estimate {
                    Some(estimate) => self.estimates[estimate.get() as usize] += 1,
                    None => self.silent_reports += 1,
                }
            }
            Event::DailyReset { .. } => self.daily_resets += 1,
            Event::LearningComplete { samples, spread } => {
                self.learned = Some((*samples, *spread));
            }
            Event::Blink { level, .. } => self.blinks[level.lit_count() - 1] += 1,
        }
    }

    fn print(&self, kind: SketchKind, hours: u32) {
        println!("{kind:?} sketch, {hours} simulated hours");
        println!("  samples stored:   {}", self.samples);
        println!("  samples dropped:  {}", self.dropped);
        if self.reports > 0 {
            println!(
                "  hourly reports:   {} ({} silent)",
                self.reports, self.silent_reports
            );
            for (band, count) in self.estimates.iter().enumerate() {
                println!("    estimate {band}:     {count}");
            }
        }
        if self.daily_resets > 0 {
            println!("  daily resets:     {}", self.daily_resets);
        }
        match self.learned {
            Some((samples, Some(Spread { min, median, max }))) => println!(
                "  learned:          {samples} samples, min {min}, median {median}, max {max}"
            ),
            Some((_, None)) => println!("  learned:          nothing"),
            None => {}
        }
        if self.blinks.iter().any(|&count| count > 0) {
            let [low, medium, high] = self.blinks;
            println!("  blinks:           {low} low, {medium} medium, {high} high");
        }
        if self.errors > 0 {
            println!("  step errors:      {}", self.errors);
        }
    }
}

/// Step `sketch` until `until_ms`, skipping whatever time it reports idle.
fn simulate(sketch: &mut dyn Sketch, clock: &VirtualClock, until_ms: u32) -> Summary {
    let mut summary = Summary::default();
    loop {
        match sketch.step() {
            Ok(events) => events.iter().for_each(|event| summary.record(event)),
            Err(e) => {
                error!("[{}] step failed: {}", timestamp(clock.now_ms()), e);
                summary.errors += 1;
            }
        }

        let now = clock.now_ms();
        if now >= until_ms {
            return summary;
        }
        clock.advance_ms(sketch.idle_ms().min(until_ms - now));
    }
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

/// The preset, or the preset overlaid with the JSON file at `path`.
fn load_config<T: DeserializeOwned>(path: Option<&Path>, preset: T) -> anyhow::Result<T> {
    let Some(path) = path else {
        return Ok(preset);
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    info!("Loaded config override from {}", path.display());
    Ok(config)
}

fn run(args: &Args) -> anyhow::Result<Summary> {
    let clock = VirtualClock::new();
    let until_ms = args.hours * MS_PER_HOUR;
    let path = args.config.as_deref();
    let sensor = DaylightSensor::new(&clock);

    let mut sketch: Box<dyn Sketch + '_> = match args.sketch {
        SketchKind::Fixed => {
            let config = load_config(path, FixedBeepConfig::DEFAULT)?;
            config.validate().map_err(|e| anyhow!("invalid config: {e}"))?;
            let beeper = BeepDriver::new(
                LoggedBuzzer { clock: &clock },
                VirtualDelay::new(&clock),
                config.beep,
            );
            Box::new(FixedBeep::new(sensor, beeper, &clock, config))
        }
        SketchKind::Adaptive => {
            let config = load_config(path, AdaptiveBeepConfig::DEFAULT)?;
            config.validate().map_err(|e| anyhow!("invalid config: {e}"))?;
            let beeper = BeepDriver::new(
                LoggedBuzzer { clock: &clock },
                VirtualDelay::new(&clock),
                config.beep,
            );
            let sketch: AdaptiveBeep<_, _, _, _> =
                AdaptiveBeep::new(sensor, beeper, &clock, config);
            Box::new(sketch)
        }
        SketchKind::Learn => {
            let config = load_config(path, LearnBlinkConfig::DEFAULT)?;
            config.validate().map_err(|e| anyhow!("invalid config: {e}"))?;
            let leds = LedBlinker::new(
                LoggedLed::bar(&clock),
                VirtualDelay::new(&clock),
                config.blink,
            );
            let sketch: LearnBlink<_, _, _, _> = LearnBlink::new(sensor, leds, &clock, config);
            Box::new(sketch)
        }
    };

    info!("Simulating {} hours of the {:?} sketch", args.hours, args.sketch);
    Ok(simulate(sketch.as_mut(), &clock, until_ms))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(&args) {
        Ok(summary) => {
            summary.print(args.sketch, args.hours);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
