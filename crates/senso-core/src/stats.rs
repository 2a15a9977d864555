//! Window statistics: average, in-place sort and min/median/max.

use crate::sensors::Reading;

/// Integer mean of `samples`, 0 for an empty slice.
pub fn average(samples: &[Reading]) -> Reading {
    if samples.is_empty() {
        return 0;
    }
    let sum: u32 = samples.iter().map(|&r| r as u32).sum();
    (sum / samples.len() as u32) as Reading
}

/// Stable ascending insertion sort, in place.
pub fn insertion_sort(samples: &mut [Reading]) {
    for i in 1..samples.len() {
        let value = samples[i];
        let mut j = i;
        while j > 0 && samples[j - 1] > value {
            samples[j] = samples[j - 1];
            j -= 1;
        }
        samples[j] = value;
    }
}

/// Median of an already sorted slice.
///
/// Even lengths average the two middle values with floor division.
pub fn median(sorted: &[Reading]) -> Option<Reading> {
    let len = sorted.len();
    if len == 0 {
        return None;
    }
    let mid = len / 2;
    if len % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some(((sorted[mid - 1] as u32 + sorted[mid] as u32) / 2) as Reading)
    }
}

/// Minimum, median and maximum of one window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Spread {
    pub min: Reading,
    pub median: Reading,
    pub max: Reading,
}

impl Spread {
    /// Sort `samples` in place and read off the spread. `None` for an empty
    /// window; callers fall back to [`Spread::default`].
    pub fn from_samples(samples: &mut [Reading]) -> Option<Self> {
        insertion_sort(samples);
        let median = median(samples)?;
        Some(Self {
            min: *samples.first()?,
            median,
            max: *samples.last()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_of_empty_window_is_zero() {
        assert_eq!(average(&[]), 0);
    }

    #[test]
    fn test_average_floors() {
        assert_eq!(average(&[1, 2]), 1);
        assert_eq!(average(&[1023, 1023, 1023]), 1023);
    }

    #[test]
    fn test_insertion_sort() {
        let mut samples = [9, 3, 7, 3, 0, 1023, 5];
        insertion_sort(&mut samples);
        assert_eq!(samples, [0, 3, 3, 5, 7, 9, 1023]);

        let mut single = [4];
        insertion_sort(&mut single);
        assert_eq!(single, [4]);

        let mut empty: [Reading; 0] = [];
        insertion_sort(&mut empty);
    }

    #[test]
    fn test_median_odd() {
        let mut samples = [5, 1, 3];
        let spread = Spread::from_samples(&mut samples).unwrap();
        assert_eq!(samples, [1, 3, 5], "window is sorted in place");
        assert_eq!(spread.median, 3);
    }

    #[test]
    fn test_median_even() {
        let mut samples = [4, 2, 6, 8];
        let spread = Spread::from_samples(&mut samples).unwrap();
        assert_eq!(spread.median, 5); // (4+6)/2
        assert_eq!(spread.min, 2);
        assert_eq!(spread.max, 8);
    }

    #[test]
    fn test_median_even_floors() {
        assert_eq!(median(&[1, 2]), Some(1));
        assert_eq!(median(&[1022, 1023]), Some(1022));
    }

    #[test]
    fn test_spread_of_empty_window() {
        assert_eq!(median(&[]), None);
        assert_eq!(Spread::from_samples(&mut []), None);
        assert_eq!(Spread::default(), Spread { min: 0, median: 0, max: 0 });
    }

    #[test]
    fn test_spread_over_a_full_day() {
        let mut samples = [0 as Reading; 8640];
        for (i, s) in samples.iter_mut().enumerate() {
            // descending input is the insertion-sort worst case
            *s = (8639 - i) as Reading % 1000;
        }
        let spread = Spread::from_samples(&mut samples).unwrap();
        assert_eq!(spread.min, 0);
        assert_eq!(spread.max, 999);
        assert!(samples.windows(2).all(|w| w[0] <= w[1]));
    }
}
