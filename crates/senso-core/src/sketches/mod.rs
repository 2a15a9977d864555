//! The three sample → bucket → act control loops
//!
//! Each sketch owns its sensor, actuator, clock and every piece of mutable
//! state. [`Sketch::step`] runs one pass of the polling loop and returns what
//! happened as [`Event`]s, which is what the simulator and the tests observe.
//!
//! ## Sketches
//!
//! - [`FixedBeep`]: running hourly average, fixed thresholds, beeps
//! - [`AdaptiveBeep`]: hourly buffer, daily learned range, beeps
//! - [`LearnBlink`]: one day of learning, then blinks the activity level

mod adaptive_beep;
mod fixed_beep;
mod learn_blink;

pub use adaptive_beep::AdaptiveBeep;
pub use fixed_beep::FixedBeep;
pub use learn_blink::{LearnBlink, Phase};

use heapless::Vec;
use log::error;
use thiserror_no_std::Error;

use crate::actuators::ActuatorError;
use crate::metrics::{ActivityLevel, DayRange, Estimate};
use crate::sensors::{Reading, SensorError};
use crate::stats::Spread;

/// Upper bound on events a single step can produce.
pub const MAX_EVENTS_PER_STEP: usize = 4;

pub type Events = Vec<Event, MAX_EVENTS_PER_STEP>;

/// Summary of one closed aggregation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    /// Samples folded into the window.
    pub samples: u32,
    /// Window average, 0 when no samples arrived.
    pub average: Reading,
    /// `None` when the window was empty and nothing was announced.
    pub estimate: Option<Estimate>,
}

/// Things a step did, in the order it did them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A reading was stored; `count` is the window size after storing it.
    Sampled { reading: Reading, count: u32 },
    /// The buffer was full and the reading was discarded.
    Dropped { reading: Reading },
    /// An aggregation window closed.
    Report(Report),
    /// The learned range was cleared back to its sentinels.
    DailyReset { previous: DayRange },
    /// Sampling phase finished; thresholds are fixed from here on.
    LearningComplete { samples: u32, spread: Option<Spread> },
    /// One blink cycle was shown.
    Blink {
        reading: Reading,
        level: ActivityLevel,
    },
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SketchError {
    #[error("sensor: {0}")]
    Sensor(#[from] SensorError),
    #[error("actuator: {0}")]
    Actuator(#[from] ActuatorError),
}

/// A polling control loop.
pub trait Sketch {
    /// Run one iteration of the loop.
    ///
    /// On `Err` the events gathered earlier in the same step are discarded,
    /// but their state changes stand: a sample already taken stays in the
    /// window, and a report whose beep failed has still closed and cleared
    /// its window.
    fn step(&mut self) -> Result<Events, SketchError>;

    /// Milliseconds until the next timer is due; 0 when the next step has
    /// work to do immediately.
    fn idle_ms(&self) -> u32;

    /// Poll forever. Errors are logged and the loop carries on; there is no
    /// caller to hand them to.
    fn run(&mut self) -> ! {
        loop {
            if let Err(e) = self.step() {
                error!("step failed: {}", e);
            }
        }
    }
}

/// Record an event. Overflowing [`MAX_EVENTS_PER_STEP`] is a bug in the
/// sketch.
fn emit(events: &mut Events, event: Event) {
    if events.push(event).is_err() {
        error!("too many events in one step, dropping {:?}", event);
    }
}
