//! Per-tick throughput derived from consecutive cumulative samples.

use chrono::TimeDelta;
use tracing::debug;

use super::{Sample, TimeSeries};

/// Delta between two cumulative counter readings, `None` on counter
/// regression (interface re-created or counters reset).
pub fn counter_delta(curr: u64, prev: u64) -> Option<u64> {
    curr.checked_sub(prev)
}

/// Receive and transmit histories fed from one sampler.
#[derive(Debug, Clone)]
pub struct Throughput {
    rx: TimeSeries,
    tx: TimeSeries,
    prev: Sample,
}

impl Throughput {
    /// Starts tracking from `baseline`. Both series share `interval` and the
    /// baseline's timestamp as their start epoch.
    pub fn new(baseline: Sample, interval: TimeDelta, capacity: usize) -> Self {
        Self {
            rx: TimeSeries::new(interval, baseline.timestamp, capacity),
            tx: TimeSeries::new(interval, baseline.timestamp, capacity),
            prev: baseline,
        }
    }

    /// Feeds a new sample into both series and makes it the new baseline.
    ///
    /// A direction whose counter went backwards records 0 for this tick.
    pub fn record(&mut self, sample: Sample) {
        let rx = counter_delta(sample.received_bytes, self.prev.received_bytes);
        let tx = counter_delta(sample.transmitted_bytes, self.prev.transmitted_bytes);

        if rx.is_none() || tx.is_none() {
            debug!(
                "Counter reset detected (rx {} -> {}, tx {} -> {})",
                self.prev.received_bytes,
                sample.received_bytes,
                self.prev.transmitted_bytes,
                sample.transmitted_bytes
            );
        }

        self.rx.set(sample.timestamp, rx.unwrap_or(0));
        self.tx.set(sample.timestamp, tx.unwrap_or(0));
        self.prev = sample;
    }

    pub fn received(&self) -> &TimeSeries {
        &self.rx
    }

    pub fn transmitted(&self) -> &TimeSeries {
        &self.tx
    }
}
