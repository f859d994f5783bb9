//! Quantization of continuous time into ordered integer keys.
//!
//! A point's key is `floor(time * 4096)`. This allows 4096 distinct points
//! per second of timeline and a usable time range of +/- 524287 seconds
//! (about 145 hours). Two times closer than [`time_quantum`] may share a
//! key; the timeline treats such points as the same point.

use serde::{Deserialize, Serialize};

/// Number of discrete key slots per second.
pub const TIME_QUANTA_PER_SECOND: f64 = 4096.0;

/// Largest absolute time, in seconds, for which key order is guaranteed to
/// match time order.
pub const MAX_TIME: f64 = 524_287.0;

/// Smallest representable change in time.
#[inline]
pub fn time_quantum() -> f64 {
    1.0 / TIME_QUANTA_PER_SECOND
}

/// Quantized time index used to order and look up points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeKey(i64);

impl TimeKey {
    /// Key for a time in seconds.
    #[inline]
    pub fn from_time(time: f64) -> Self {
        Self((time * TIME_QUANTA_PER_SECOND).floor() as i64)
    }

    #[inline]
    pub fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> i64 {
        self.0
    }

    /// Start of this key's slot, in seconds.
    #[inline]
    pub fn start_time(self) -> f64 {
        self.0 as f64 / TIME_QUANTA_PER_SECOND
    }

    /// Neighbouring key, saturating at the ends of the range.
    #[inline]
    pub fn offset(self, delta: i64) -> Self {
        Self(self.0.saturating_add(delta))
    }

    /// Whether `time` is inside the range where key order is guaranteed.
    #[inline]
    pub fn in_range(time: f64) -> bool {
        time.is_finite() && time.abs() <= MAX_TIME
    }
}
