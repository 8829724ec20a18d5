use std::collections::HashMap;

use super::circular_buffer::CircularBuffer;

/// Capacity used by the dashboard views: one minute of once-per-second pushes.
pub const DEFAULT_SERIES_CAPACITY: usize = 60;

/// One point of a metric series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub value: f64,
    /// Unix epoch milliseconds as reported by the server.
    pub timestamp: i64,
}

/// Destination for metric samples extracted by the router.
pub trait SampleSink: Send + 'static {
    fn record(&mut self, series: &str, value: f64, timestamp: i64);

    /// Current contents of `series`, oldest first. Empty when the series is unknown.
    fn snapshot(&self, series: &str) -> Vec<Sample>;

    /// Drop the history of `series`.
    fn forget(&mut self, _series: &str) {}
}

/// Rolling per-series window of recent samples.
///
/// Every series shares the capacity fixed at construction; once full, recording evicts
/// the oldest sample before appending.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    capacity: usize,
    series: HashMap<String, CircularBuffer<Sample>>,
}

impl SampleBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            series: HashMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn record(&mut self, series: &str, value: f64, timestamp: i64) {
        let sample = Sample { value, timestamp };
        // Avoid allocating the key for the common "series already exists" path.
        if let Some(buffer) = self.series.get_mut(series) {
            buffer.push(sample);
            return;
        }
        let mut buffer = CircularBuffer::new(self.capacity);
        buffer.push(sample);
        self.series.insert(series.to_string(), buffer);
    }

    pub fn snapshot(&self, series: &str) -> Vec<Sample> {
        self.series
            .get(series)
            .map(CircularBuffer::to_vec)
            .unwrap_or_default()
    }

    /// Minimum and maximum value over the current contents, `None` for an empty series.
    ///
    /// NaN samples are skipped; a series holding only NaN yields `None`.
    pub fn min_max(&self, series: &str) -> Option<(f64, f64)> {
        self.series
            .get(series)?
            .iter()
            .map(|sample| sample.value)
            .filter(|value| !value.is_nan())
            .fold(None, |range, value| match range {
                None => Some((value, value)),
                Some((min, max)) => Some((min.min(value), max.max(value))),
            })
    }

    pub fn latest(&self, series: &str) -> Option<Sample> {
        self.series.get(series)?.back().copied()
    }

    pub fn len(&self, series: &str) -> usize {
        self.series.get(series).map_or(0, CircularBuffer::len)
    }

    pub fn is_empty(&self, series: &str) -> bool {
        self.len(series) == 0
    }

    pub fn series_names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn forget(&mut self, series: &str) {
        self.series.remove(series);
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_SERIES_CAPACITY)
    }
}

impl SampleSink for SampleBuffer {
    fn record(&mut self, series: &str, value: f64, timestamp: i64) {
        SampleBuffer::record(self, series, value, timestamp);
    }

    fn snapshot(&self, series: &str) -> Vec<Sample> {
        SampleBuffer::snapshot(self, series)
    }

    fn forget(&mut self, series: &str) {
        SampleBuffer::forget(self, series);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_creates_series_on_first_sample() {
        let mut buffer = SampleBuffer::default();
        assert!(buffer.is_empty("cpu"));
        buffer.record("cpu", 42.5, 1_000);
        assert_eq!(
            buffer.snapshot("cpu"),
            vec![Sample {
                value: 42.5,
                timestamp: 1_000
            }]
        );
        assert_eq!(buffer.series_names().collect::<Vec<_>>(), vec!["cpu"]);
    }

    #[test]
    fn snapshot_keeps_last_capacity_samples_in_order() {
        let mut buffer = SampleBuffer::default();
        for i in 0..75 {
            buffer.record("temperature", i as f64, 1_000 + i);
        }
        let snapshot = buffer.snapshot("temperature");
        assert_eq!(snapshot.len(), DEFAULT_SERIES_CAPACITY);
        let values: Vec<f64> = snapshot.iter().map(|s| s.value).collect();
        let expected: Vec<f64> = (15..75).map(|i| i as f64).collect();
        assert_eq!(values, expected);
        assert_eq!(buffer.latest("temperature").map(|s| s.timestamp), Some(1_074));
    }

    #[test]
    fn series_are_independent() {
        let mut buffer = SampleBuffer::new(2);
        buffer.record("cpu", 1.0, 1);
        buffer.record("stock", 100.0, 1);
        buffer.record("cpu", 2.0, 2);
        buffer.record("cpu", 3.0, 3);
        assert_eq!(buffer.len("cpu"), 2);
        assert_eq!(buffer.len("stock"), 1);
    }

    #[test]
    fn min_max_tracks_current_window() {
        let mut buffer = SampleBuffer::new(3);
        assert_eq!(buffer.min_max("cpu"), None);
        for (i, v) in [50.0, 10.0, 30.0, 40.0].into_iter().enumerate() {
            buffer.record("cpu", v, i as i64);
        }
        // 50.0 has been evicted.
        assert_eq!(buffer.min_max("cpu"), Some((10.0, 40.0)));
    }

    #[test]
    fn min_max_skips_nan() {
        let mut buffer = SampleBuffer::new(4);
        buffer.record("cpu", f64::NAN, 0);
        assert_eq!(buffer.min_max("cpu"), None);
        buffer.record("cpu", 3.0, 1);
        assert_eq!(buffer.min_max("cpu"), Some((3.0, 3.0)));
    }

    #[test]
    fn snapshot_is_a_copy() {
        let mut buffer = SampleBuffer::new(4);
        buffer.record("cpu", 1.0, 0);
        let before = buffer.snapshot("cpu");
        buffer.record("cpu", 2.0, 1);
        assert_eq!(before.len(), 1);
        assert_eq!(buffer.len("cpu"), 2);
    }

    #[test]
    fn forget_drops_history() {
        let mut buffer = SampleBuffer::default();
        buffer.record("stock", 101.0, 0);
        buffer.forget("stock");
        assert!(buffer.snapshot("stock").is_empty());
    }
}
