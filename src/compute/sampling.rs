//! Batch evaluation and summary statistics.

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

use super::{Timeline, ValueVector};

/// Batches at least this large are evaluated in parallel on native targets.
pub const PARALLEL_SAMPLE_THRESHOLD: usize = 4096;

/// Evenly spaced times from `start` to `end` inclusive.
pub fn sample_times(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| if i + 1 == count { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

impl Timeline {
    /// Limited values at each of `times`, in order.
    pub fn sample_many(&self, times: &[f64]) -> Vec<ValueVector> {
        #[cfg(not(target_arch = "wasm32"))]
        {
            if times.len() >= PARALLEL_SAMPLE_THRESHOLD {
                return times.par_iter().map(|&t| self.get(t)).collect();
            }
        }

        times.iter().map(|&t| self.get(t)).collect()
    }

    /// `count` evenly spaced samples from `start` to `end` inclusive.
    pub fn sample_range(&self, start: f64, end: f64, count: usize) -> Vec<ValueVector> {
        self.sample_many(&sample_times(start, end, count))
    }
}

/// Summary of a timeline, as printed by the command line tool.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimelineStats {
    pub points: usize,
    pub dimensions: usize,
    pub time_min: f64,
    pub time_max: f64,
    /// Componentwise minimum over all point values, limits applied.
    pub value_min: ValueVector,
    /// Componentwise maximum over all point values, limits applied.
    pub value_max: ValueVector,
    /// Number of points per interpolation kind, keyed by persistent name.
    pub kinds: Vec<(String, usize)>,
}

impl TimelineStats {
    /// Compute statistics from a timeline.
    pub fn from_timeline(timeline: &Timeline) -> Self {
        let (value_min, value_max) = timeline
            .min_max(timeline.time_min(), timeline.time_max())
            .unwrap_or_else(|| {
                let zeros = ValueVector::zeros(timeline.dimensions());
                (zeros.clone(), zeros)
            });

        let kinds = crate::schema::InterpolationKind::ALL
            .iter()
            .map(|kind| {
                let count = timeline.points().filter(|p| p.kind == *kind).count();
                (kind.persistent_name().to_string(), count)
            })
            .filter(|(_, count)| *count > 0)
            .collect();

        Self {
            points: timeline.len(),
            dimensions: timeline.dimensions(),
            time_min: timeline.time_min(),
            time_max: timeline.time_max(),
            value_min,
            value_max,
            kinds,
        }
    }
}
