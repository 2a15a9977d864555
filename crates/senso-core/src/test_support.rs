//! Fakes for exercising sketches on the host against a [`VirtualClock`].

use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};

use crate::actuators::ToneOutput;
use crate::sensors::{AnalogSensor, Reading};
use crate::sketches::{Event, Sketch};
use crate::timing::{Clock, VirtualClock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fault;

/// Sensor replaying a fixed script of readings.
pub struct ScriptedSensor {
    script: Vec<Reading>,
    position: usize,
    repeat: bool,
    fail: bool,
}

impl ScriptedSensor {
    /// Play `script` once, then keep returning its last reading.
    pub fn new(script: &[Reading]) -> Self {
        Self {
            script: script.to_vec(),
            position: 0,
            repeat: false,
            fail: false,
        }
    }

    /// Play `script` in a loop.
    pub fn cycle(script: &[Reading]) -> Self {
        Self {
            repeat: true,
            ..Self::new(script)
        }
    }

    pub fn constant(reading: Reading) -> Self {
        Self::new(&[reading])
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(&[])
        }
    }
}

impl AnalogSensor for ScriptedSensor {
    type Error = Fault;

    fn read(&mut self) -> Result<Reading, Fault> {
        if self.fail || self.script.is_empty() {
            return Err(Fault);
        }
        let index = if self.repeat {
            self.position % self.script.len()
        } else {
            self.position.min(self.script.len() - 1)
        };
        self.position += 1;
        Ok(self.script[index])
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneCall {
    On(u32),
    Off,
}

/// Buzzer that timestamps every call.
pub struct RecordingTone<'a> {
    clock: &'a VirtualClock,
    pub calls: Vec<(u32, ToneCall)>,
    pub fail: bool,
}

impl<'a> RecordingTone<'a> {
    pub fn new(clock: &'a VirtualClock) -> Self {
        Self {
            clock,
            calls: Vec::new(),
            fail: false,
        }
    }

    pub fn pulses(&self) -> usize {
        self.calls
            .iter()
            .filter(|(_, call)| matches!(call, ToneCall::On(_)))
            .count()
    }
}

impl ToneOutput for RecordingTone<'_> {
    type Error = Fault;

    fn tone(&mut self, frequency_hz: u32) -> Result<(), Fault> {
        if self.fail {
            return Err(Fault);
        }
        self.calls.push((self.clock.now_ms(), ToneCall::On(frequency_hz)));
        Ok(())
    }

    fn no_tone(&mut self) -> Result<(), Fault> {
        if self.fail {
            return Err(Fault);
        }
        self.calls.push((self.clock.now_ms(), ToneCall::Off));
        Ok(())
    }
}

/// Output pin that timestamps every transition.
pub struct RecordingPin<'a> {
    clock: &'a VirtualClock,
    pub transitions: Vec<(u32, bool)>,
    pub fail: bool,
}

impl<'a> RecordingPin<'a> {
    pub fn new(clock: &'a VirtualClock) -> Self {
        Self {
            clock,
            transitions: Vec::new(),
            fail: false,
        }
    }

    /// Level the pin held at `at_ms`, i.e. after the last write at or before it.
    pub fn state_at(&self, at_ms: u32) -> Option<bool> {
        self.transitions
            .iter()
            .rev()
            .find(|(t, _)| *t <= at_ms)
            .map(|(_, high)| *high)
    }

    fn record(&mut self, high: bool) -> Result<(), ErrorKind> {
        if self.fail {
            return Err(ErrorKind::Other);
        }
        self.transitions.push((self.clock.now_ms(), high));
        Ok(())
    }
}

impl ErrorType for RecordingPin<'_> {
    type Error = ErrorKind;
}

impl OutputPin for RecordingPin<'_> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.record(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.record(true)
    }
}

/// Step `sketch` until the clock reaches `until_ms`, skipping idle time.
///
/// The final step runs at (or, after a blocking actuation, past) `until_ms`.
pub fn run_until<K: Sketch>(sketch: &mut K, clock: &VirtualClock, until_ms: u32) -> Vec<Event> {
    let mut events = Vec::new();
    loop {
        events.extend(sketch.step().expect("step failed"));
        let now = clock.now_ms();
        if now >= until_ms {
            return events;
        }
        clock.advance_ms(sketch.idle_ms().min(until_ms - now));
    }
}
