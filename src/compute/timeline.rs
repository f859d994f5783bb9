//! Timeline - keyframes of a multi-component value over time.
//!
//! Composes the point store, the interpolation and derivative engines and
//! the output limits behind one API. The timeline holds no locks; share it
//! across threads through [`TimelineCell`](super::TimelineCell) snapshots.

use log::{debug, warn};

use super::{
    LimitPolicy, Point, PointHandle, PointStore, TimeKey, ValueVector, derivative,
    evaluate_into,
};
use crate::schema::{ConfigError, InterpolationKind, KindRequest, TimelineConfig};

/// Errors raised by timeline mutation.
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    #[error("Expected a vector with {expected} components, got {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Keyframe timeline mapping seconds to vectors of `dimensions` components.
///
/// Point times are quantized to [`TimeKey`]s; at most one point exists per
/// key neighbourhood and the first point added wins.
#[derive(Debug, Clone)]
pub struct Timeline {
    dimensions: usize,
    points: PointStore,
    limits: LimitPolicy,
    config: TimelineConfig,
}

impl Timeline {
    /// Create an empty timeline.
    pub fn new(dimensions: usize) -> Self {
        Self::with_config(dimensions, TimelineConfig::default())
    }

    /// Create an empty timeline with explicit configuration.
    pub fn with_config(dimensions: usize, config: TimelineConfig) -> Self {
        Self {
            dimensions,
            points: PointStore::new(),
            limits: LimitPolicy::default(),
            config,
        }
    }

    // ------------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------------

    #[inline]
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: TimelineConfig) -> Result<(), TimelineError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in ascending time order.
    pub fn points(&self) -> impl DoubleEndedIterator<Item = &Point> + ExactSizeIterator + '_ {
        self.points.iter()
    }

    /// The underlying point store.
    pub fn store(&self) -> &PointStore {
        &self.points
    }

    /// Time of the first point, or 0.0 when empty.
    pub fn time_min(&self) -> f64 {
        self.points.first().map_or(0.0, |p| p.time)
    }

    /// Time of the last point, or 0.0 when empty.
    pub fn time_max(&self) -> f64 {
        self.points.last().map_or(0.0, |p| p.time)
    }

    /// Point at `time`, tolerating round-off of one key.
    pub fn find(&self, time: f64) -> Option<&Point> {
        self.points.find(time)
    }

    /// Handle for the point at `time`.
    pub fn handle_at(&self, time: f64) -> Option<PointHandle> {
        self.points
            .find_key(time)
            .and_then(|key| self.points.handle(key))
    }

    /// Point referenced by `handle`, if it is still stored.
    pub fn point(&self, handle: PointHandle) -> Option<&Point> {
        self.points.resolve(handle)
    }

    /// Point closest to `time`. Ties prefer the earlier point.
    pub fn closest(&self, time: f64) -> Option<&Point> {
        self.points.closest(time)
    }

    /// First point strictly after the key of `time`.
    pub fn next_after(&self, time: f64) -> Option<&Point> {
        self.points.next_after(time)
    }

    /// First point at or after the key of `time`.
    pub fn first_at_or_after(&self, time: f64) -> Option<&Point> {
        self.points.first_at_or_after(time)
    }

    pub fn lower_limit(&self) -> Option<&ValueVector> {
        self.limits.lower.as_ref()
    }

    pub fn upper_limit(&self) -> Option<&ValueVector> {
        self.limits.upper.as_ref()
    }

    pub fn limits(&self) -> &LimitPolicy {
        &self.limits
    }

    // ------------------------------------------------------------------------
    // Evaluation
    // ------------------------------------------------------------------------

    /// Value at `time` with limits applied.
    pub fn get(&self, time: f64) -> ValueVector {
        let mut out = ValueVector::zeros(self.dimensions);
        self.get_into(time, &mut out);
        out
    }

    /// Value at `time` without limits.
    pub fn get_raw(&self, time: f64) -> ValueVector {
        let mut out = ValueVector::zeros(self.dimensions);
        self.get_raw_into(time, &mut out);
        out
    }

    /// Limited value at `time` written into `out`. Does not allocate.
    #[inline]
    pub fn get_into(&self, time: f64, out: &mut [f64]) {
        evaluate_into(&self.points, time, out);
        self.limits.apply(out);
    }

    /// Unlimited value at `time` written into `out`. Does not allocate.
    #[inline]
    pub fn get_raw_into(&self, time: f64, out: &mut [f64]) {
        evaluate_into(&self.points, time, out);
    }

    /// Single limited component at `time`; 0.0 for an out-of-range
    /// component.
    pub fn get_scalar(&self, time: f64, component: usize) -> f64 {
        self.get(time).get(component).copied().unwrap_or(0.0)
    }

    /// Derivative at `time` using the configured step.
    pub fn derivative(&self, time: f64) -> ValueVector {
        self.derivative_at(time, self.config.derivative_step)
    }

    /// Central-difference derivative of the unlimited curve with step `h`.
    /// Steps smaller than one time quantum are raised to it.
    pub fn derivative_at(&self, time: f64, h: f64) -> ValueVector {
        derivative::derivative_at(&self.points, time, h, self.dimensions)
    }

    /// Componentwise minimum and maximum of the point values between the
    /// points closest to `start` and `end`, limits applied. The curve between
    /// points is not inspected.
    pub fn min_max(&self, start: f64, end: f64) -> Option<(ValueVector, ValueVector)> {
        let first = self.points.closest(start)?;
        let last = self.points.closest(end)?;

        let mut min = first.value.clone();
        self.limits.apply(&mut min);
        let mut max = min.clone();

        if first.time >= last.time {
            return Some((min, max));
        }

        let mut scratch = ValueVector::zeros(self.dimensions);
        for point in self.points.after(first.key()) {
            if point.time > last.time {
                break;
            }
            scratch.clone_from(&point.value);
            self.limits.apply(&mut scratch);
            min.min_assign(&scratch);
            max.max_assign(&scratch);
        }

        Some((min, max))
    }

    // ------------------------------------------------------------------------
    // Limits
    // ------------------------------------------------------------------------

    fn check_dimensions(&self, v: &ValueVector) -> Result<(), TimelineError> {
        if v.dimensions() != self.dimensions {
            return Err(TimelineError::DimensionMismatch {
                expected: self.dimensions,
                found: v.dimensions(),
            });
        }
        Ok(())
    }

    pub fn set_lower_limit(&mut self, lower: impl Into<ValueVector>) -> Result<(), TimelineError> {
        let lower = lower.into();
        self.check_dimensions(&lower)?;
        self.limits.lower = Some(lower);
        Ok(())
    }

    pub fn set_upper_limit(&mut self, upper: impl Into<ValueVector>) -> Result<(), TimelineError> {
        let upper = upper.into();
        self.check_dimensions(&upper)?;
        self.limits.upper = Some(upper);
        Ok(())
    }

    /// Set both limits. Nothing changes if either vector is rejected.
    pub fn set_limits(
        &mut self,
        lower: impl Into<ValueVector>,
        upper: impl Into<ValueVector>,
    ) -> Result<(), TimelineError> {
        let (lower, upper) = (lower.into(), upper.into());
        self.check_dimensions(&lower)?;
        self.check_dimensions(&upper)?;
        self.limits.lower = Some(lower);
        self.limits.upper = Some(upper);
        Ok(())
    }

    /// Install an already conformed limit policy.
    pub(super) fn set_limit_policy(&mut self, limits: LimitPolicy) {
        debug_assert!(
            limits.lower.as_ref().is_none_or(|v| v.dimensions() == self.dimensions)
                && limits.upper.as_ref().is_none_or(|v| v.dimensions() == self.dimensions)
        );
        self.limits = limits;
    }

    pub fn clear_lower_limit(&mut self) {
        self.limits.lower = None;
    }

    pub fn clear_upper_limit(&mut self) {
        self.limits.upper = None;
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Remove all points.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    fn conform(&self, v: &mut ValueVector) {
        if v.dimensions() != self.dimensions {
            debug!(
                "Resizing {}-component vector to timeline dimensions {}",
                v.dimensions(),
                self.dimensions
            );
            v.set_dimensions(self.dimensions);
        }
    }

    fn resolve_kind(&self, time: f64, request: KindRequest) -> InterpolationKind {
        match request {
            KindRequest::Kind(kind) => kind,
            KindRequest::Inherit => self
                .points
                .preceding_kind(TimeKey::from_time(time))
                .unwrap_or(self.config.default_kind),
        }
    }

    /// Add a point unless one already exists at `time`.
    ///
    /// `Inherit` takes the kind of the preceding point (or of the first point
    /// when none precedes, or the configured default on an empty timeline).
    /// Returns `None` and leaves the timeline unchanged when the time is
    /// occupied within one key or is not finite. Tangent kinds get an
    /// automatic tangent.
    pub fn add(
        &mut self,
        time: f64,
        value: impl Into<ValueVector>,
        kind: impl Into<KindRequest>,
    ) -> Option<PointHandle> {
        if !time.is_finite() {
            warn!("Ignoring point at non-finite time {}", time);
            return None;
        }
        if !TimeKey::in_range(time) {
            warn!("Point time {}s is outside the ordered key range", time);
        }

        let kind = self.resolve_kind(time, kind.into());
        let mut value = value.into();
        self.conform(&mut value);

        let handle = self.points.insert(Point::new(time, value, kind));
        match handle {
            Some(handle) => {
                derivative::refresh_tangent(&mut self.points, handle.key());
            }
            None => debug!("Point at {}s already present, keeping existing", time),
        }
        handle
    }

    /// Add a point only where the curve differs from `value` by more than
    /// `threshold` in some component. Returns `None` when the curve already
    /// passes within `threshold` of `value`, and otherwise behaves like
    /// [`add`](Self::add).
    pub fn add_beyond_threshold(
        &mut self,
        time: f64,
        value: impl Into<ValueVector>,
        threshold: f64,
        kind: impl Into<KindRequest>,
    ) -> Option<PointHandle> {
        let mut value = value.into();
        self.conform(&mut value);

        let current = self.get_raw(time);
        let within = current
            .iter()
            .zip(value.iter())
            .all(|(&c, &v)| v >= c - threshold && v <= c + threshold);
        if within {
            debug!("Curve at {}s already within {} of value", time, threshold);
            return None;
        }
        self.add(time, value, kind)
    }

    /// Add a fully specified point, keeping its tangent as given. Same
    /// collision rule as [`add`](Self::add).
    pub fn add_point(&mut self, mut point: Point) -> Option<PointHandle> {
        if !point.time.is_finite() {
            warn!("Ignoring point at non-finite time {}", point.time);
            return None;
        }
        self.conform(&mut point.value);
        self.conform(&mut point.tangent);
        self.points.insert(point)
    }

    /// Remove the point at `time` (within one key).
    pub fn remove(&mut self, time: f64) -> Option<Point> {
        self.points.remove_time(time)
    }

    /// Remove the point with exactly this key.
    pub fn remove_key(&mut self, key: TimeKey) -> Option<Point> {
        self.points.remove_key(key)
    }

    /// Remove the point referenced by `handle`, if still valid.
    pub fn remove_handle(&mut self, handle: PointHandle) -> Option<Point> {
        self.points.remove_handle(handle)
    }

    /// Remove every point whose key lies in `[key(start), key(end))`.
    pub fn remove_range(&mut self, start: f64, end: f64) -> usize {
        self.points
            .remove_range(TimeKey::from_time(start), TimeKey::from_time(end))
    }

    /// Replace a point's value; tangent kinds get a fresh automatic tangent.
    pub fn set_value(&mut self, handle: PointHandle, value: impl Into<ValueVector>) -> bool {
        let mut value = value.into();
        self.conform(&mut value);
        let Some(point) = self.points.resolve_mut(handle) else {
            return false;
        };
        point.value = value;
        derivative::refresh_tangent(&mut self.points, handle.key());
        true
    }

    /// Set a user tangent. It stays until the point's value changes or
    /// tangents are recomputed.
    pub fn set_tangent(&mut self, handle: PointHandle, tangent: impl Into<ValueVector>) -> bool {
        let mut tangent = tangent.into();
        self.conform(&mut tangent);
        let Some(point) = self.points.resolve_mut(handle) else {
            return false;
        };
        point.tangent = tangent;
        true
    }

    /// Change a point's interpolation kind.
    pub fn set_kind(&mut self, handle: PointHandle, kind: InterpolationKind) -> bool {
        let Some(point) = self.points.resolve_mut(handle) else {
            return false;
        };
        point.kind = kind;
        derivative::refresh_tangent(&mut self.points, handle.key());
        true
    }

    /// Move a point to `time`. Returns the new handle, or `None` when the
    /// handle is stale or the target time is occupied; the timeline is
    /// unchanged in that case.
    pub fn move_point(&mut self, handle: PointHandle, time: f64) -> Option<PointHandle> {
        if !time.is_finite() {
            return None;
        }
        let Some(moved) = self.points.relocate(handle, time) else {
            debug!("Cannot move point to {}s", time);
            return None;
        };
        derivative::refresh_tangent(&mut self.points, moved.key());
        Some(moved)
    }

    /// Recompute the automatic tangent of every tangent-kind point.
    pub fn recompute_tangents(&mut self) -> usize {
        derivative::recompute_tangents(&mut self.points)
    }

    /// Scale all values and tangents so the largest absolute component
    /// equals `amplitude`. Returns the applied factor, or `None` when the
    /// timeline holds no nonzero value or `amplitude` is not finite.
    pub fn normalize(&mut self, amplitude: f64) -> Option<f64> {
        if !amplitude.is_finite() {
            warn!("Ignoring normalization to non-finite amplitude {}", amplitude);
            return None;
        }

        let peak = self
            .points
            .iter()
            .flat_map(|p| p.value.iter())
            .fold(0.0_f64, |peak, v| peak.max(v.abs()));
        if !(peak > 0.0 && peak.is_finite()) {
            return None;
        }

        let factor = amplitude / peak;
        for point in self.points.points_mut() {
            point.value.iter_mut().for_each(|v| *v *= factor);
            point.tangent.iter_mut().for_each(|d| *d *= factor);
        }
        Some(factor)
    }

    /// Move every point by `offset` seconds.
    ///
    /// Points are reinserted in time order under the collision rule of
    /// [`add`](Self::add), so a point landing on an occupied key after
    /// quantization is dropped. Returns the number of dropped points.
    /// Tangents are kept as they are.
    pub fn shift_time(&mut self, offset: f64) -> usize {
        if !offset.is_finite() {
            warn!("Ignoring non-finite time shift {}", offset);
            return 0;
        }

        let mut dropped = 0;
        for mut point in self.points.drain() {
            point.time += offset;
            if self.points.insert(point).is_none() {
                dropped += 1;
            }
        }

        if dropped > 0 {
            debug!(
                "Time shift by {}s dropped {} colliding point(s)",
                offset, dropped
            );
        }
        dropped
    }

    /// Change the number of components. Values, tangents and limits are
    /// zero-extended or truncated.
    pub fn set_dimensions(&mut self, dimensions: usize) {
        if dimensions == self.dimensions {
            return;
        }
        debug!(
            "Timeline dimensions {} -> {}",
            self.dimensions, dimensions
        );
        self.dimensions = dimensions;
        self.points.set_dimensions(dimensions);
        self.limits.set_dimensions(dimensions);
    }

    /// Copy the points of `other`, shifted by `offset`, into this timeline.
    /// Occupied times keep their existing point. Returns the number of
    /// points added.
    pub fn add_timeline(&mut self, other: &Timeline, offset: f64) -> usize {
        let mut added = 0;
        for point in other.points() {
            let mut point = point.clone();
            point.time += offset;
            if self.add_point(point).is_some() {
                added += 1;
            }
        }
        added
    }

    /// Like [`add_timeline`](Self::add_timeline) but first removes every
    /// point within the shifted span of `other`.
    pub fn overwrite_timeline(&mut self, other: &Timeline, offset: f64) -> usize {
        if !other.is_empty() {
            let start = TimeKey::from_time(other.time_min() + offset);
            let end = TimeKey::from_time(other.time_max() + offset).offset(1);
            self.points.remove_range(start, end);
        }
        self.add_timeline(other, offset)
    }
}
