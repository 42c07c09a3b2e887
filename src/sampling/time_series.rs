//! Fixed-capacity ring of per-tick magnitudes keyed by elapsed time.
//!
//! Tick `k` covers `[start + k*interval, start + (k+1)*interval)`. The ring
//! slot for tick `k` is `k % capacity`, so older ticks are silently
//! overwritten once the timeline is longer than the ring.

use chrono::TimeDelta;

use super::TimePoint;

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    /// Absolute tick index whose value this slot holds.
    index: u64,
    value: u64,
    written: bool,
}

/// Bounded, time-keyed history of one direction's throughput.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    interval: TimeDelta,
    start: TimePoint,
    slots: Vec<Slot>,
    size: usize,
    oldest: Option<u64>,
    newest: Option<u64>,
}

impl TimeSeries {
    /// Creates an empty series. A zero capacity is raised to one slot and
    /// an interval below one millisecond to one millisecond.
    pub fn new(interval: TimeDelta, start: TimePoint, capacity: usize) -> Self {
        Self {
            interval: interval.max(TimeDelta::milliseconds(1)),
            start,
            slots: vec![Slot::default(); capacity.max(1)],
            size: 0,
            oldest: None,
            newest: None,
        }
    }

    /// Absolute tick index containing `tp`. Times before the start epoch map
    /// to tick 0.
    pub fn calculate_index(&self, tp: TimePoint) -> u64 {
        let elapsed = tp - self.start;
        if elapsed <= TimeDelta::zero() {
            return 0;
        }
        let ms = elapsed.num_milliseconds();
        let interval_ms = self.interval.num_milliseconds();
        (ms / interval_ms) as u64
    }

    /// Start of tick `index`; the inverse of [`calculate_index`](Self::calculate_index)
    /// up to truncation to the tick boundary. `None` when the offset does not
    /// fit a timestamp.
    pub fn index_start(&self, index: u64) -> Option<TimePoint> {
        self.tick_start(i64::try_from(index).ok()?)
    }

    fn tick_start(&self, ticks: i64) -> Option<TimePoint> {
        let offset_ms = self.interval.num_milliseconds().checked_mul(ticks)?;
        self.start
            .checked_add_signed(TimeDelta::try_milliseconds(offset_ms)?)
    }

    fn slot_of(&self, index: u64) -> usize {
        (index % self.slots.len() as u64) as usize
    }

    /// Stores `value` for the tick containing `tp`. Last writer wins.
    pub fn set(&mut self, tp: TimePoint, value: u64) {
        let index = self.calculate_index(tp);
        self.set_index(index, value);
    }

    /// Stores `value` for absolute tick `index`.
    pub fn set_index(&mut self, index: u64, value: u64) {
        let slot_idx = self.slot_of(index);
        let slot = &mut self.slots[slot_idx];
        if !slot.written {
            self.size += 1;
        }
        *slot = Slot {
            index,
            value,
            written: true,
        };
        self.oldest = Some(self.oldest.map_or(index, |o| o.min(index)));
        self.newest = Some(self.newest.map_or(index, |n| n.max(index)));
    }

    /// Value stored for the tick containing `tp`, 0 if that tick was never
    /// written or has been overwritten.
    pub fn get(&self, tp: TimePoint) -> u64 {
        self.get_index(self.calculate_index(tp))
    }

    pub fn get_index(&self, index: u64) -> u64 {
        let slot = &self.slots[self.slot_of(index)];
        if slot.written && slot.index == index {
            slot.value
        } else {
            0
        }
    }

    /// The `len` most recent values ending at the newest written tick, oldest
    /// first. Ticks that were never written (or fell out of the ring) read as 0.
    pub fn get_slice_from_end(&self, len: usize) -> Vec<u64> {
        self.indices_from_end(len)
            .map(|index| index.map_or(0, |i| self.get_index(i)))
            .collect()
    }

    /// Tick start times aligned with [`get_slice_from_end`](Self::get_slice_from_end).
    pub fn times_from_end(&self, len: usize) -> Vec<TimePoint> {
        let newest = self
            .newest
            .and_then(|n| i64::try_from(n).ok())
            .unwrap_or(0);
        (0..len)
            .map(|offset| {
                let ticks = newest.saturating_sub((len - 1 - offset) as i64);
                // Ticks come from real timestamps, so only a forged index
                // can leave the representable range.
                self.tick_start(ticks).unwrap_or(self.start)
            })
            .collect()
    }

    /// Absolute indices for the last `len` ticks; `None` before tick 0 or
    /// before anything was written.
    fn indices_from_end(&self, len: usize) -> impl Iterator<Item = Option<u64>> + '_ {
        (0..len).map(move |offset| {
            let back = (len - 1 - offset) as u64;
            self.newest.and_then(|n| n.checked_sub(back))
        })
    }

    /// Ticks from the oldest value still held to the newest, inclusive.
    /// Skipped ticks inside that range count, so a slice of this length
    /// always reaches back to the oldest real value.
    pub fn span(&self) -> usize {
        match (self.oldest, self.newest) {
            (Some(oldest), Some(newest)) => {
                let capacity = self.slots.len() as u64;
                let first = oldest.max((newest + 1).saturating_sub(capacity));
                (newest - first + 1) as usize
            }
            _ => 0,
        }
    }

    /// Number of ring slots written at least once.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn interval(&self) -> TimeDelta {
        self.interval
    }
}
