use embedded_hal::delay::DelayNs;
use log::{debug, info};

use super::{Event, Events, Report, Sketch, SketchError, emit};
use crate::actuators::{BeepDriver, ToneOutput};
use crate::buffer::{HOURLY_CAPACITY, SampleBuffer};
use crate::config::AdaptiveBeepConfig;
use crate::metrics::{AdaptiveThresholds, BandClassifier, DayRange};
use crate::sensors::{AnalogSensor, sample};
use crate::timing::{Clock, PeriodicTimer};

/// Hourly beeps classified against the range learned since the last daily
/// reset.
///
/// Each stored sample widens the day's `[min, max]`. On the hour the buffer is
/// averaged, bucketed into quartiles of that range and announced; at the day
/// boundary the range goes back to its sentinels and is relearned.
pub struct AdaptiveBeep<S, T, D, C, const N: usize = HOURLY_CAPACITY> {
    sensor: S,
    beeper: BeepDriver<T, D>,
    clock: C,
    config: AdaptiveBeepConfig,
    sample_timer: PeriodicTimer,
    report_timer: PeriodicTimer,
    reset_timer: PeriodicTimer,
    buffer: SampleBuffer<N>,
    range: DayRange,
}

impl<S, T, D, C, const N: usize> AdaptiveBeep<S, T, D, C, N>
where
    S: AnalogSensor,
    T: ToneOutput,
    D: DelayNs,
    C: Clock,
{
    pub fn new(
        sensor: S,
        beeper: BeepDriver<T, D>,
        clock: C,
        config: AdaptiveBeepConfig,
    ) -> Self {
        let now = clock.now_ms();
        Self {
            sensor,
            beeper,
            clock,
            config,
            sample_timer: PeriodicTimer::starting_at(config.sample_interval_ms, now),
            report_timer: PeriodicTimer::starting_at(config.report_interval_ms, now),
            reset_timer: PeriodicTimer::starting_at(config.reset_interval_ms, now),
            buffer: SampleBuffer::new(),
            range: DayRange::new(config.full_scale),
        }
    }

    pub fn buffer(&self) -> &SampleBuffer<N> {
        &self.buffer
    }

    pub fn range(&self) -> &DayRange {
        &self.range
    }

    pub fn thresholds(&self) -> AdaptiveThresholds {
        AdaptiveThresholds::new(self.range, self.config.tolerance)
    }

    fn take_sample(&mut self) -> Result<Event, SketchError> {
        let reading = sample(&mut self.sensor)?;
        if !self.buffer.push(reading) {
            debug!("buffer full ({}), dropped {}", N, reading);
            return Ok(Event::Dropped { reading });
        }

        self.range.observe(reading);
        if self.config.verbose {
            info!(
                "sample {} (day {}..{}, {} this hour)",
                reading,
                self.range.min(),
                self.range.max(),
                self.buffer.len()
            );
        }
        Ok(Event::Sampled {
            reading,
            count: self.buffer.len() as u32,
        })
    }

    fn report(&mut self) -> Result<Report, SketchError> {
        let samples = self.buffer.len() as u32;
        let average = self.buffer.average();
        self.buffer.clear();

        if samples == 0 {
            info!("hour: no samples");
            return Ok(Report {
                samples,
                average,
                estimate: None,
            });
        }

        let thresholds = self.thresholds();
        let estimate = thresholds.estimate(average);
        match thresholds.breakpoints() {
            Some([t1, t2, t3]) => info!(
                "hour: {} samples, average {}, bands {}/{}/{}, estimate {}",
                samples,
                average,
                t1,
                t2,
                t3,
                estimate.get()
            ),
            None => info!(
                "hour: {} samples, average {}, range {}..{} too narrow, estimate {}",
                samples,
                average,
                self.range.min(),
                self.range.max(),
                estimate.get()
            ),
        }
        self.beeper.beep_estimate(estimate)?;

        Ok(Report {
            samples,
            average,
            estimate: Some(estimate),
        })
    }
}

impl<S, T, D, C, const N: usize> Sketch for AdaptiveBeep<S, T, D, C, N>
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
            let event = self.take_sample()?;
            emit(&mut events, event);
        }

        // The reset runs before the report, so an hour that closes exactly on
        // the day boundary is classified against the freshly reset range.
        if self.reset_timer.poll(now) {
            let previous = self.range;
            self.range.reset();
            info!(
                "day: range {}..{} reset",
                previous.min(),
                previous.max()
            );
            emit(&mut events, Event::DailyReset { previous });
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
            .min(self.reset_timer.remaining(now))
    }
}
