use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{debug, info, warn};

use super::{Event, Events, Sketch, SketchError, emit};
use crate::actuators::LedBlinker;
use crate::buffer::{LEARNING_CAPACITY, SampleBuffer};
use crate::config::LearnBlinkConfig;
use crate::metrics::LevelThresholds;
use crate::sensors::{AnalogSensor, sample};
use crate::stats::Spread;
use crate::timing::{Clock, PeriodicTimer};

/// Where the sketch is in its one-way life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Collecting the learning window
    Sampling,
    /// Thresholds fixed; reading and blinking on every step
    Classifying(LevelThresholds),
}

/// Learn a day's min/median/max, then blink the activity level forever.
///
/// The transition out of [`Phase::Sampling`] happens once per power cycle,
/// when the learning window elapses or the buffer fills, whichever is first.
pub struct LearnBlink<S, P, D, C, const N: usize = LEARNING_CAPACITY> {
    sensor: S,
    leds: LedBlinker<P, D>,
    clock: C,
    config: LearnBlinkConfig,
    sample_timer: PeriodicTimer,
    learning_timer: PeriodicTimer,
    buffer: SampleBuffer<N>,
    phase: Phase,
}

impl<S, P, D, C, const N: usize> LearnBlink<S, P, D, C, N>
where
    S: AnalogSensor,
    P: OutputPin,
    D: DelayNs,
    C: Clock,
{
    pub fn new(sensor: S, leds: LedBlinker<P, D>, clock: C, config: LearnBlinkConfig) -> Self {
        let now = clock.now_ms();
        Self {
            sensor,
            leds,
            clock,
            config,
            sample_timer: PeriodicTimer::starting_at(config.sample_interval_ms, now),
            learning_timer: PeriodicTimer::starting_at(config.learning_ms, now),
            buffer: SampleBuffer::new(),
            phase: Phase::Sampling,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn buffer(&self) -> &SampleBuffer<N> {
        &self.buffer
    }

    fn learn(&mut self, now: u32, events: &mut Events) -> Result<(), SketchError> {
        if self.sample_timer.poll(now) {
            let reading = sample(&mut self.sensor)?;
            if self.buffer.push(reading) {
                if self.config.verbose {
                    info!("sample {} ({}/{})", reading, self.buffer.len(), N);
                }
                emit(
                    events,
                    Event::Sampled {
                        reading,
                        count: self.buffer.len() as u32,
                    },
                );
            } else {
                debug!("buffer full, dropped {}", reading);
                emit(events, Event::Dropped { reading });
            }
        }

        if self.learning_timer.is_due(now) || self.buffer.is_full() {
            let samples = self.buffer.len() as u32;
            let spread = Spread::from_samples(self.buffer.as_mut_slice());
            let thresholds = LevelThresholds::new(spread.unwrap_or_default());

            match spread {
                Some(Spread { min, median, max }) => info!(
                    "sampling complete: {} samples, min {}, median {}, max {}",
                    samples, min, median, max
                ),
                None => warn!("sampling complete: no samples, every reading will show high"),
            }

            self.phase = Phase::Classifying(thresholds);
            emit(events, Event::LearningComplete { samples, spread });
        }
        Ok(())
    }

    fn classify(&mut self, thresholds: LevelThresholds, events: &mut Events) -> Result<(), SketchError> {
        // A failed read still takes one blink cycle, so the loop keeps its
        // cadence instead of spinning on the sensor.
        let reading = match sample(&mut self.sensor) {
            Ok(reading) => reading,
            Err(e) => {
                self.leds.pause();
                return Err(e.into());
            }
        };
        let level = thresholds.assess(reading);
        if self.config.verbose {
            info!("reading {} -> {}", reading, level.label());
        }
        self.leds.blink(level)?;
        emit(events, Event::Blink { reading, level });
        Ok(())
    }
}

impl<S, P, D, C, const N: usize> Sketch for LearnBlink<S, P, D, C, N>
where
    S: AnalogSensor,
    P: OutputPin,
    D: DelayNs,
    C: Clock,
{
    fn step(&mut self) -> Result<Events, SketchError> {
        let mut events = Events::new();
        match self.phase {
            Phase::Sampling => {
                let now = self.clock.now_ms();
                self.learn(now, &mut events)?;
            }
            Phase::Classifying(thresholds) => self.classify(thresholds, &mut events)?,
        }
        Ok(events)
    }

    fn idle_ms(&self) -> u32 {
        match self.phase {
            Phase::Sampling => {
                let now = self.clock.now_ms();
                self.sample_timer
                    .remaining(now)
                    .min(self.learning_timer.remaining(now))
            }
            Phase::Classifying(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuators::LedBlinker;
    use crate::metrics::ActivityLevel;
    use crate::test_support::{RecordingPin, ScriptedSensor, run_until};
    use crate::timing::{MS_PER_DAY, VirtualClock, VirtualDelay};

    type TestSketch<'a, const N: usize> =
        LearnBlink<ScriptedSensor, RecordingPin<'a>, VirtualDelay<'a>, &'a VirtualClock, N>;

    fn sketch<const N: usize>(
        clock: &VirtualClock,
        sensor: ScriptedSensor,
        config: LearnBlinkConfig,
    ) -> TestSketch<'_, N> {
        let leds = LedBlinker::new(
            [
                RecordingPin::new(clock),
                RecordingPin::new(clock),
                RecordingPin::new(clock),
            ],
            VirtualDelay::new(clock),
            config.blink,
        );
        LearnBlink::new(sensor, leds, clock, config)
    }

    fn short_config() -> LearnBlinkConfig {
        LearnBlinkConfig {
            sample_interval_ms: 1_000,
            learning_ms: 5_000,
            verbose: false,
            ..LearnBlinkConfig::DEFAULT
        }
    }

    #[test]
    fn test_learns_then_classifies() {
        let clock = VirtualClock::new();
        // learning window: 5, 1, 3, 9, 7 -> min 1, median 5, max 9
        let sensor = ScriptedSensor::new(&[5, 1, 3, 9, 7, 2, 5, 9]);
        let mut sketch = sketch::<64>(&clock, sensor, short_config());

        let events = run_until(&mut sketch, &clock, 5_000);
        assert_eq!(
            events.last(),
            Some(&Event::LearningComplete {
                samples: 5,
                spread: Some(Spread { min: 1, median: 5, max: 9 })
            })
        );
        assert!(matches!(sketch.phase(), Phase::Classifying(_)));

        let mut levels = Vec::new();
        for _ in 0..3 {
            for event in sketch.step().unwrap() {
                if let Event::Blink { level, .. } = event {
                    levels.push(level);
                }
            }
        }
        assert_eq!(
            levels,
            [ActivityLevel::Low, ActivityLevel::Medium, ActivityLevel::High]
        );
        assert_eq!(clock.now_ms(), 5_000 + 3 * 1_000, "each blink is one 500/500 cycle");
    }

    #[test]
    fn test_full_buffer_ends_learning_early() {
        let clock = VirtualClock::new();
        let mut sketch = sketch::<3>(&clock, ScriptedSensor::cycle(&[10, 20, 30]), short_config());

        let events = run_until(&mut sketch, &clock, 3_000);
        assert_eq!(clock.now_ms(), 3_000);
        assert_eq!(
            events.last(),
            Some(&Event::LearningComplete {
                samples: 3,
                spread: Some(Spread { min: 10, median: 20, max: 30 })
            })
        );
    }

    #[test]
    fn test_transition_happens_once() {
        let clock = VirtualClock::new();
        let mut sketch = sketch::<64>(&clock, ScriptedSensor::constant(400), short_config());

        let events = run_until(&mut sketch, &clock, 20_000);
        let completions = events
            .iter()
            .filter(|e| matches!(e, Event::LearningComplete { .. }))
            .count();
        assert_eq!(completions, 1);
        assert!(events.iter().any(|e| matches!(e, Event::Blink { .. })));
        assert_eq!(sketch.idle_ms(), 0);
    }

    #[test]
    fn test_empty_window_falls_back_to_zero_thresholds() {
        let clock = VirtualClock::new();
        let config = LearnBlinkConfig {
            sample_interval_ms: 10_000,
            learning_ms: 5_000,
            ..short_config()
        };
        let mut sketch = sketch::<8>(&clock, ScriptedSensor::constant(0), config);

        let events = run_until(&mut sketch, &clock, 5_000);
        assert_eq!(
            events.as_slice(),
            [Event::LearningComplete {
                samples: 0,
                spread: None
            }]
        );
        assert_eq!(
            sketch.phase(),
            Phase::Classifying(LevelThresholds::default())
        );

        let events = sketch.step().unwrap();
        assert_eq!(
            events.as_slice(),
            &[Event::Blink {
                reading: 0,
                level: ActivityLevel::High
            }]
        );
    }

    #[test]
    fn test_failed_read_while_classifying_still_takes_a_cycle() {
        let clock = VirtualClock::new();
        // the learning window closes before the first sample is due
        let config = LearnBlinkConfig {
            sample_interval_ms: 10_000,
            learning_ms: 5_000,
            ..short_config()
        };
        let mut sketch = sketch::<8>(&clock, ScriptedSensor::failing(), config);

        run_until(&mut sketch, &clock, 5_000);
        assert!(matches!(sketch.phase(), Phase::Classifying(_)));

        for cycle in 1..=3 {
            assert!(matches!(sketch.step(), Err(SketchError::Sensor(_))));
            assert_eq!(clock.now_ms(), 5_000 + cycle * 1_000);
        }
        assert!(
            sketch.leds.leds_mut().iter().all(|led| led.transitions.is_empty()),
            "no LED lit without a reading"
        );
    }

    #[test]
    fn test_blink_lights_level_prefix() {
        let clock = VirtualClock::new();
        let mut sketch = sketch::<2>(&clock, ScriptedSensor::new(&[100, 500, 300]), short_config());

        run_until(&mut sketch, &clock, 2_000);
        // median 300, max 500; 300 -> medium
        let start = clock.now_ms();
        sketch.step().unwrap();

        let leds = sketch.leds.leds_mut();
        assert_eq!(leds[0].state_at(start), Some(true));
        assert_eq!(leds[1].state_at(start), Some(true));
        assert_eq!(leds[2].state_at(start), Some(false));
        assert!(leds.iter().all(|led| led.state_at(start + 500) == Some(false)));
    }

    #[test]
    fn test_default_learning_window_is_one_day() {
        let clock = VirtualClock::new();
        let mut sketch = sketch::<LEARNING_CAPACITY>(
            &clock,
            ScriptedSensor::cycle(&[100, 200, 300]),
            LearnBlinkConfig {
                verbose: false,
                ..LearnBlinkConfig::DEFAULT
            },
        );

        run_until(&mut sketch, &clock, MS_PER_DAY - 1);
        assert_eq!(sketch.phase(), Phase::Sampling);
        assert_eq!(sketch.buffer().len(), LEARNING_CAPACITY - 1);

        let events = run_until(&mut sketch, &clock, MS_PER_DAY);
        assert_eq!(
            events.last(),
            Some(&Event::LearningComplete {
                samples: LEARNING_CAPACITY as u32,
                spread: Some(Spread { min: 100, median: 200, max: 300 })
            })
        );
    }
}
