use embedded_hal::delay::DelayNs;
use log::info;

use super::{Event, Events, Report, Sketch, SketchError, emit};
use crate::actuators::{BeepDriver, ToneOutput};
use crate::buffer::RunningSum;
use crate::config::FixedBeepConfig;
use crate::metrics::BandClassifier;
use crate::sensors::{AnalogSensor, sample};
use crate::timing::{Clock, PeriodicTimer};

/// Hourly beeps from a running average and fixed thresholds.
///
/// Keeps no buffer: each sample is folded into a [`RunningSum`] and the sum is
/// reset once the hour has been announced.
pub struct FixedBeep<S, T, D, C> {
    sensor: S,
    beeper: BeepDriver<T, D>,
    clock: C,
    config: FixedBeepConfig,
    sample_timer: PeriodicTimer,
    report_timer: PeriodicTimer,
    window: RunningSum,
}

impl<S, T, D, C> FixedBeep<S, T, D, C>
where
    S: AnalogSensor,
    T: ToneOutput,
    D: DelayNs,
    C: Clock,
{
    /// Timers are armed at the clock's current time.
    pub fn new(sensor: S, beeper: BeepDriver<T, D>, clock: C, config: FixedBeepConfig) -> Self {
        let now = clock.now_ms();
        Self {
            sensor,
            beeper,
            clock,
            config,
            sample_timer: PeriodicTimer::starting_at(config.sample_interval_ms, now),
            report_timer: PeriodicTimer::starting_at(config.report_interval_ms, now),
            window: RunningSum::new(),
        }
    }

    pub fn window(&self) -> &RunningSum {
        &self.window
    }

    fn report(&mut self) -> Result<Report, SketchError> {
        let samples = self.window.count();
        let average = self.window.average();
        self.window.reset();

        if samples == 0 {
            info!("hour: no samples");
            return Ok(Report {
                samples,
                average,
                estimate: None,
            });
        }

        let estimate = self.config.thresholds.estimate(average);
        info!(
            "hour: {} samples, average {}, estimate {}",
            samples,
            average,
            estimate.get()
        );
        self.beeper.beep_estimate(estimate)?;

        Ok(Report {
            samples,
            average,
            estimate: Some(estimate),
        })
    }
}

impl<S, T, D, C> Sketch for FixedBeep<S, T, D, C>
where
    S: AnalogSensor,
    T: ToneOutput,
    D: DelayNs,
    C: Clock,
{
    fn step(&mut self) -> Result<Events, SketchError> {
        let mut events = Events::new();
        let now = self.clock.now_ms();

        if self.sample_timer.poll(now) {
            let reading = sample(&mut self.sensor)?;
            self.window.add(reading);
            if self.config.verbose {
                info!("sample {} ({} this hour)", reading, self.window.count());
            }
            emit(
                &mut events,
                Event::Sampled {
                    reading,
                    count: self.window.count(),
                },
            );
        }

        if self.report_timer.poll(now) {
            let report = self.report()?;
            emit(&mut events, Event::Report(report));
        }

        Ok(events)
    }

    fn idle_ms(&self) -> u32 {
        let now = self.clock.now_ms();
        self.sample_timer
            .remaining(now)
            .min(self.report_timer.remaining(now))
    }
}
