//! Bounded sample storage for one aggregation window.

use heapless::Vec;

use crate::sensors::Reading;
use crate::stats;

/// One hour of samples at 1 s.
pub const HOURLY_CAPACITY: usize = 3600;

/// One day of samples at 10 s.
pub const LEARNING_CAPACITY: usize = 8640;

/// Fixed-capacity buffer of raw readings.
///
/// Pushing into a full buffer drops the reading and leaves the contents
/// untouched; the window owner is expected to [`clear`](Self::clear) it when
/// the window closes.
#[derive(Debug, Clone)]
pub struct SampleBuffer<const N: usize> {
    samples: Vec<Reading, N>,
}

impl<const N: usize> Default for SampleBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SampleBuffer<N> {
    pub const fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    /// Append a reading. Returns `false` when the buffer was full and the
    /// reading was dropped.
    pub fn push(&mut self, reading: Reading) -> bool {
        self.samples.push(reading).is_ok()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.samples.is_full()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn as_slice(&self) -> &[Reading] {
        &self.samples
    }

    /// Mutable view, used to sort the window in place before taking a median.
    pub fn as_mut_slice(&mut self) -> &mut [Reading] {
        &mut self.samples
    }

    /// Integer mean of the buffered readings, 0 when empty.
    pub fn average(&self) -> Reading {
        stats::average(&self.samples)
    }
}

/// Running `(sum, count)` for windows that only need an average.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunningSum {
    sum: u32,
    count: u32,
}

impl RunningSum {
    pub const fn new() -> Self {
        Self { sum: 0, count: 0 }
    }

    pub fn add(&mut self, reading: Reading) {
        self.sum = self.sum.saturating_add(reading as u32);
        self.count += 1;
    }

    pub const fn count(&self) -> u32 {
        self.count
    }

    pub const fn sum(&self) -> u32 {
        self.sum
    }

    /// Floor of `sum / count`; 0 when nothing was added.
    pub const fn average(&self) -> Reading {
        if self.count == 0 {
            return 0;
        }
        (self.sum / self.count) as Reading
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hourly_buffer_fills_then_drops() {
        let mut buffer = SampleBuffer::<HOURLY_CAPACITY>::new();

        for second in 0..3600u32 {
            assert!(buffer.push((second % 1024) as Reading));
        }
        assert!(buffer.is_full());
        assert_eq!(buffer.len(), 3600);

        assert!(!buffer.push(42), "the 3601st sample must be dropped");
        assert_eq!(buffer.len(), 3600);
        assert_eq!(buffer.as_slice()[3599], (3599 % 1024) as Reading);
    }

    #[test]
    fn test_clear_reopens_the_window() {
        let mut buffer = SampleBuffer::<2>::new();
        buffer.push(1);
        buffer.push(2);
        assert!(!buffer.push(3));

        buffer.clear();
        assert!(buffer.is_empty());
        assert!(buffer.push(3));
        assert_eq!(buffer.as_slice(), &[3]);
    }

    #[test]
    fn test_buffer_average() {
        let mut buffer = SampleBuffer::<4>::new();
        assert_eq!(buffer.average(), 0, "empty window averages to 0");

        buffer.push(10);
        buffer.push(11);
        assert_eq!(buffer.average(), 10, "integer division floors");
    }

    #[test]
    fn test_running_sum() {
        let mut sum = RunningSum::new();
        assert_eq!(sum.average(), 0);

        for reading in [100, 200, 301] {
            sum.add(reading);
        }
        assert_eq!(sum.count(), 3);
        assert_eq!(sum.sum(), 601);
        assert_eq!(sum.average(), 200);

        sum.reset();
        assert_eq!(sum, RunningSum::default());
    }
}
