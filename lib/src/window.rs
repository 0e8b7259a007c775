//! Sliding time windows over an ordered record sequence.
//!
//! Density statistics and epoch analysis both look at every maximal run of
//! records that fits in a fixed time span. One window is anchored at every
//! record, so trailing windows shrink toward a single element.

use crate::errors::ConfigError;

/// Anything carrying a capture timestamp in seconds.
pub trait Timestamped {
    fn timestamp(&self) -> f64;
}

impl<T: Timestamped> Timestamped for &T {
    fn timestamp(&self) -> f64 {
        (**self).timestamp()
    }
}

/// Lazy iterator over the windows of a record sequence.
///
/// Created by [`sliding_windows`]. Yields one read-only view per record.
pub struct SlidingWindows<'a, T> {
    records: &'a [T],
    window_length: f64,
    start: usize,
    end: usize,
}

/// Iterate over every maximal window of at most `window_length` seconds.
///
/// For each index i the emitted window is the longest contiguous run
/// starting at i whose timestamps all lie within `window_length` of
/// `records[i]`. The input must be sorted ascending by timestamp; the
/// result is unspecified otherwise (callers guarantee ordering at the
/// ingestion boundary).
pub fn sliding_windows<T: Timestamped>(
    records: &[T],
    window_length: f64,
) -> Result<SlidingWindows<'_, T>, ConfigError> {
    if window_length <= 0.0 {
        return Err(ConfigError::NonPositiveWindowLength(window_length));
    }
    Ok(SlidingWindows {
        records,
        window_length,
        start: 0,
        end: 0,
    })
}

impl<'a, T: Timestamped> Iterator for SlidingWindows<'a, T> {
    type Item = &'a [T];

    fn next(&mut self) -> Option<Self::Item> {
        if self.start >= self.records.len() {
            return None;
        }
        // On sorted input the window end never moves backward between
        // anchors, so the forward scan is shared across all of them. The
        // emitted windows are identical to re-scanning from each anchor.
        let anchor = self.records[self.start].timestamp();
        if self.end < self.start {
            self.end = self.start;
        }
        while self.end < self.records.len()
            && self.records[self.end].timestamp() - anchor <= self.window_length
        {
            self.end += 1;
        }
        let window = &self.records[self.start..self.end];
        self.start += 1;
        Some(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl Timestamped for (f64, char) {
        fn timestamp(&self) -> f64 {
            self.0
        }
    }

    /// Reference definition: re-scan the maximal run from every anchor.
    fn naive_windows(records: &[(f64, char)], window_length: f64) -> Vec<&[(f64, char)]> {
        (0..records.len())
            .map(|start| {
                let mut end = start;
                while end < records.len()
                    && records[end].0 - records[start].0 <= window_length
                {
                    end += 1;
                }
                &records[start..end]
            })
            .collect()
    }

    #[test]
    fn maximal_windows_per_record() {
        let rows = [
            (0.0, 'A'),
            (0.0, 'B'),
            (1.0, 'C'),
            (2.0, 'D'),
            (4.0, 'E'),
            (7.0, 'F'),
        ];

        let windows: Vec<_> = sliding_windows(&rows, 3.0).unwrap().collect();

        assert_eq!(windows.len(), 6);
        assert_eq!(windows[0], &rows[..4]);
        assert_eq!(windows[1], &rows[1..4]);
        assert_eq!(windows[2], &rows[2..5]);
        assert_eq!(windows[3], &rows[3..5]);
        assert_eq!(windows[4], &rows[4..]);
        assert_eq!(windows[5], &rows[5..]);
    }

    #[test]
    fn one_window_per_record() {
        let rows: Vec<(f64, char)> = (0..50).map(|i| ((i * i % 83) as f64 / 7.0, 'x')).collect();
        let mut sorted = rows.clone();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let count = sliding_windows(&sorted, 1.5).unwrap().count();
        assert_eq!(count, sorted.len());
    }

    #[test]
    fn matches_naive_rescan() {
        // Uneven density, duplicate timestamps, and a large gap.
        let rows = [
            (0.0, 'a'),
            (0.1, 'b'),
            (0.1, 'c'),
            (0.9, 'd'),
            (1.0, 'e'),
            (5.0, 'f'),
            (5.2, 'g'),
            (11.0, 'h'),
        ];

        for length in [0.1, 0.5, 1.0, 4.0, 20.0] {
            let scanned: Vec<_> = sliding_windows(&rows, length).unwrap().collect();
            assert_eq!(scanned, naive_windows(&rows, length), "length {length}");
        }
    }

    #[test]
    fn empty_input_yields_no_windows() {
        let rows: [(f64, char); 0] = [];
        assert_eq!(sliding_windows(&rows, 3.0).unwrap().count(), 0);
    }

    #[test]
    fn non_positive_length_is_rejected() {
        let rows = [(0.0, 'a')];
        assert!(matches!(
            sliding_windows(&rows, 0.0),
            Err(ConfigError::NonPositiveWindowLength(_))
        ));
        assert!(matches!(
            sliding_windows(&rows, -1.0),
            Err(ConfigError::NonPositiveWindowLength(_))
        ));
    }
}
