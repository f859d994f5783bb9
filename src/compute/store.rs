//! Ordered point storage keyed by quantized time.

use std::collections::BTreeMap;
use std::ops::Bound;

use serde::{Deserialize, Serialize};

use super::{TimeKey, ValueVector};
use crate::schema::InterpolationKind;

/// One keyframe of a timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Time in seconds.
    pub time: f64,
    /// Value at this point.
    pub value: ValueVector,
    /// First derivative at this point. Read only by tangent kinds.
    pub tangent: ValueVector,
    /// Interpolation from this point to the next one.
    pub kind: InterpolationKind,
}

impl Point {
    /// Point with a zero tangent.
    pub fn new(time: f64, value: impl Into<ValueVector>, kind: InterpolationKind) -> Self {
        let value = value.into();
        let tangent = ValueVector::zeros(value.dimensions());
        Self {
            time,
            value,
            tangent,
            kind,
        }
    }

    /// Builder: set the tangent.
    pub fn with_tangent(mut self, tangent: impl Into<ValueVector>) -> Self {
        self.tangent = tangent.into();
        self
    }

    #[inline]
    pub fn key(&self) -> TimeKey {
        TimeKey::from_time(self.time)
    }

    /// Resize value and tangent to `dimensions`.
    pub fn set_dimensions(&mut self, dimensions: usize) {
        self.value.set_dimensions(dimensions);
        self.tangent.set_dimensions(dimensions);
    }
}

/// Stable reference to a stored point.
///
/// A handle resolves only while the exact point it was issued for is still
/// stored. Removing the point, or replacing it by another point at the same
/// key, invalidates the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointHandle {
    key: TimeKey,
    serial: u64,
}

impl PointHandle {
    /// Key of the referenced point.
    #[inline]
    pub fn key(&self) -> TimeKey {
        self.key
    }
}

#[derive(Debug, Clone)]
struct Entry {
    serial: u64,
    point: Point,
}

/// Points ordered by [`TimeKey`].
#[derive(Debug, Clone, Default)]
pub struct PointStore {
    entries: BTreeMap<TimeKey, Entry>,
    next_serial: u64,
}

impl PointStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Points in ascending time order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Point> + ExactSizeIterator + '_ {
        self.entries.values().map(|e| &e.point)
    }

    /// Keys and points in ascending time order.
    pub fn iter_keyed(&self) -> impl DoubleEndedIterator<Item = (TimeKey, &Point)> + '_ {
        self.entries.iter().map(|(k, e)| (*k, &e.point))
    }

    /// Mutable access to every point. Callers must not change `time`.
    pub(crate) fn points_mut(&mut self) -> impl Iterator<Item = &mut Point> + '_ {
        self.entries.values_mut().map(|e| &mut e.point)
    }

    // ------------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------------

    /// Key of the point stored at `time`, tolerating round-off by probing
    /// the neighbouring keys as well.
    pub fn find_key(&self, time: f64) -> Option<TimeKey> {
        let key = TimeKey::from_time(time);
        [key, key.offset(1), key.offset(-1)]
            .into_iter()
            .find(|k| self.entries.contains_key(k))
    }

    /// Point stored at `time`, see [`find_key`](Self::find_key).
    pub fn find(&self, time: f64) -> Option<&Point> {
        self.find_key(time).and_then(|k| self.get(k))
    }

    pub fn get(&self, key: TimeKey) -> Option<&Point> {
        self.entries.get(&key).map(|e| &e.point)
    }

    pub(crate) fn get_mut(&mut self, key: TimeKey) -> Option<&mut Point> {
        self.entries.get_mut(&key).map(|e| &mut e.point)
    }

    /// Handle for the point currently stored at `key`.
    pub fn handle(&self, key: TimeKey) -> Option<PointHandle> {
        self.entries.get(&key).map(|e| PointHandle {
            key,
            serial: e.serial,
        })
    }

    pub fn resolve(&self, handle: PointHandle) -> Option<&Point> {
        self.entries
            .get(&handle.key)
            .filter(|e| e.serial == handle.serial)
            .map(|e| &e.point)
    }

    pub(crate) fn resolve_mut(&mut self, handle: PointHandle) -> Option<&mut Point> {
        self.entries
            .get_mut(&handle.key)
            .filter(|e| e.serial == handle.serial)
            .map(|e| &mut e.point)
    }

    pub fn first(&self) -> Option<&Point> {
        self.entries.values().next().map(|e| &e.point)
    }

    pub fn last(&self) -> Option<&Point> {
        self.entries.values().next_back().map(|e| &e.point)
    }

    /// Last point whose key is `<= key`.
    pub fn at_or_before(&self, key: TimeKey) -> Option<(TimeKey, &Point)> {
        self.entries
            .range(..=key)
            .next_back()
            .map(|(k, e)| (*k, &e.point))
    }

    /// Points strictly before `key`, nearest first.
    pub fn before(&self, key: TimeKey) -> impl Iterator<Item = &Point> + '_ {
        self.entries.range(..key).rev().map(|(_, e)| &e.point)
    }

    /// Points strictly after `key`, nearest first.
    pub fn after(&self, key: TimeKey) -> impl Iterator<Item = &Point> + '_ {
        self.entries
            .range((Bound::Excluded(key), Bound::Unbounded))
            .map(|(_, e)| &e.point)
    }

    /// First point whose key is strictly greater than the key of `time`,
    /// even when a point exists at `time`.
    pub fn next_after(&self, time: f64) -> Option<&Point> {
        self.after(TimeKey::from_time(time)).next()
    }

    /// First point whose key is `>=` the key of `time`.
    pub fn first_at_or_after(&self, time: f64) -> Option<&Point> {
        self.entries
            .range(TimeKey::from_time(time)..)
            .next()
            .map(|(_, e)| &e.point)
    }

    /// Point closest to `time`. Ties prefer the earlier point.
    pub fn closest(&self, time: f64) -> Option<&Point> {
        let last = self.last()?;
        if last.time <= time {
            return Some(last);
        }

        let key = TimeKey::from_time(time);
        let (next_key, next) = self
            .entries
            .range(key..)
            .next()
            .map(|(k, e)| (*k, &e.point))?;

        match self.before(next_key).next() {
            Some(prev) if time - prev.time <= next.time - time => Some(prev),
            _ => Some(next),
        }
    }

    /// Kind of the nearest point before `key`, or of the first point when
    /// nothing precedes it.
    pub fn preceding_kind(&self, key: TimeKey) -> Option<InterpolationKind> {
        self.before(key)
            .next()
            .or_else(|| self.first())
            .map(|p| p.kind)
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Insert `point` unless a point already occupies its time (see
    /// [`find_key`](Self::find_key)). The first stored point wins.
    pub fn insert(&mut self, point: Point) -> Option<PointHandle> {
        if self.find_key(point.time).is_some() {
            return None;
        }

        let key = point.key();
        let serial = self.next_serial;
        self.next_serial += 1;
        self.entries.insert(key, Entry { serial, point });
        Some(PointHandle { key, serial })
    }

    pub fn remove_key(&mut self, key: TimeKey) -> Option<Point> {
        self.entries.remove(&key).map(|e| e.point)
    }

    pub fn remove_time(&mut self, time: f64) -> Option<Point> {
        let key = self.find_key(time)?;
        self.remove_key(key)
    }

    pub fn remove_handle(&mut self, handle: PointHandle) -> Option<Point> {
        self.resolve(handle)?;
        self.remove_key(handle.key)
    }

    /// Move the point behind `handle` to `time`. The store is left unchanged
    /// when the handle is stale or another point occupies `time`.
    pub fn relocate(&mut self, handle: PointHandle, time: f64) -> Option<PointHandle> {
        self.resolve(handle)?;
        let entry = self.entries.remove(&handle.key)?;
        if self.find_key(time).is_some() {
            self.entries.insert(handle.key, entry);
            return None;
        }

        let Entry { serial, mut point } = entry;
        point.time = time;
        let key = point.key();
        self.entries.insert(key, Entry { serial, point });
        Some(PointHandle { key, serial })
    }

    /// Remove all points with `start <= key < end`. Returns the number of
    /// removed points.
    pub fn remove_range(&mut self, start: TimeKey, end: TimeKey) -> usize {
        if start >= end {
            return 0;
        }

        let mut tail = self.entries.split_off(&start);
        let mut kept = tail.split_off(&end);
        let removed = tail.len();
        self.entries.append(&mut kept);
        removed
    }

    /// Remove and return every point in ascending order.
    pub fn drain(&mut self) -> Vec<Point> {
        std::mem::take(&mut self.entries)
            .into_values()
            .map(|e| e.point)
            .collect()
    }

    /// Resize every stored value and tangent.
    pub fn set_dimensions(&mut self, dimensions: usize) {
        for point in self.points_mut() {
            point.set_dimensions(dimensions);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::time_quantum;

    fn store_with(times: &[f64]) -> PointStore {
        let mut store = PointStore::new();
        for &t in times {
            store
                .insert(Point::new(t, t * 10.0, InterpolationKind::Linear))
                .unwrap();
        }
        store
    }

    fn times(store: &PointStore) -> Vec<f64> {
        store.iter().map(|p| p.time).collect()
    }

    #[test]
    fn test_ascending_order() {
        let store = store_with(&[3.0, 1.0, 2.0, -1.0]);
        assert_eq!(times(&store), vec![-1.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_first_insert_wins() {
        let mut store = store_with(&[5.0]);
        let dup = store.insert(Point::new(5.0, 99.0, InterpolationKind::Constant));
        assert!(dup.is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(store.find(5.0).unwrap().value[0], 50.0);
    }

    #[test]
    fn test_find_tolerates_round_off() {
        let store = store_with(&[1.0]);
        assert!(store.find(1.0 - time_quantum() * 0.5).is_some());
        assert!(store.find(1.0 + time_quantum() * 1.5).is_some());
        assert!(store.find(1.0 + time_quantum() * 3.0).is_none());
    }

    #[test]
    fn test_neighbouring_key_counts_as_occupied() {
        let mut store = store_with(&[1.0]);
        let near = Point::new(1.0 + time_quantum(), 0.0, InterpolationKind::Linear);
        assert!(store.insert(near).is_none());
    }

    #[test]
    fn test_handles_invalidate_on_remove() {
        let mut store = PointStore::new();
        let h = store
            .insert(Point::new(1.0, 1.0, InterpolationKind::Linear))
            .unwrap();
        assert!(store.resolve(h).is_some());

        store.remove_time(1.0);
        assert!(store.resolve(h).is_none());

        // A new point at the same key does not revive the old handle.
        let h2 = store
            .insert(Point::new(1.0, 2.0, InterpolationKind::Linear))
            .unwrap();
        assert!(store.resolve(h).is_none());
        assert_eq!(store.resolve(h2).unwrap().value[0], 2.0);
        assert!(store.remove_handle(h).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_range_half_open() {
        let mut store = store_with(&[0.0, 1.0, 2.0, 3.0, 4.0]);
        let removed =
            store.remove_range(TimeKey::from_time(1.0), TimeKey::from_time(3.0));
        assert_eq!(removed, 2);
        assert_eq!(times(&store), vec![0.0, 3.0, 4.0]);
    }

    #[test]
    fn test_remove_range_empty_interval() {
        let mut store = store_with(&[0.0, 1.0]);
        assert_eq!(
            store.remove_range(TimeKey::from_time(1.0), TimeKey::from_time(1.0)),
            0
        );
        assert_eq!(
            store.remove_range(TimeKey::from_time(2.0), TimeKey::from_time(0.0)),
            0
        );
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_adjacent_queries() {
        let store = store_with(&[0.0, 1.0, 2.0]);
        assert_eq!(store.next_after(1.0).unwrap().time, 2.0);
        assert_eq!(store.first_at_or_after(1.0).unwrap().time, 1.0);
        assert_eq!(store.first_at_or_after(1.5).unwrap().time, 2.0);
        assert!(store.next_after(2.0).is_none());

        let key = TimeKey::from_time(1.0);
        let before: Vec<f64> = store.before(key).map(|p| p.time).collect();
        let after: Vec<f64> = store.after(key).map(|p| p.time).collect();
        assert_eq!(before, vec![0.0]);
        assert_eq!(after, vec![2.0]);
    }

    #[test]
    fn test_closest() {
        let store = store_with(&[0.0, 1.0, 3.0]);
        assert_eq!(store.closest(-5.0).unwrap().time, 0.0);
        assert_eq!(store.closest(0.4).unwrap().time, 0.0);
        assert_eq!(store.closest(0.5).unwrap().time, 0.0);
        assert_eq!(store.closest(0.6).unwrap().time, 1.0);
        assert_eq!(store.closest(2.5).unwrap().time, 3.0);
        assert_eq!(store.closest(10.0).unwrap().time, 3.0);
        assert!(PointStore::new().closest(0.0).is_none());
    }

    #[test]
    fn test_preceding_kind() {
        let mut store = PointStore::new();
        store.insert(Point::new(1.0, 0.0, InterpolationKind::Smooth));
        store.insert(Point::new(2.0, 0.0, InterpolationKind::Constant));

        assert_eq!(
            store.preceding_kind(TimeKey::from_time(1.5)),
            Some(InterpolationKind::Smooth)
        );
        assert_eq!(
            store.preceding_kind(TimeKey::from_time(9.0)),
            Some(InterpolationKind::Constant)
        );
        // Nothing before: falls back to the first point.
        assert_eq!(
            store.preceding_kind(TimeKey::from_time(0.0)),
            Some(InterpolationKind::Smooth)
        );
        assert_eq!(PointStore::new().preceding_kind(TimeKey::from_time(0.0)), None);
    }

    #[test]
    fn test_set_dimensions() {
        let mut store = store_with(&[0.0, 1.0]);
        store.set_dimensions(3);
        for p in store.iter() {
            assert_eq!(p.value.dimensions(), 3);
            assert_eq!(p.tangent.dimensions(), 3);
            assert_eq!(p.value[1], 0.0);
        }
    }

    #[test]
    fn test_relocate() {
        let mut store = store_with(&[0.0, 1.0, 2.0]);
        let h = store.handle(TimeKey::from_time(1.0)).unwrap();

        assert!(store.relocate(h, 2.0).is_none());
        assert_eq!(store.resolve(h).unwrap().time, 1.0);

        let moved = store.relocate(h, 1.5).unwrap();
        assert!(store.resolve(h).is_none());
        assert_eq!(store.resolve(moved).unwrap().time, 1.5);
        assert_eq!(times(&store), vec![0.0, 1.5, 2.0]);
    }

    #[test]
    fn test_drain_empties_in_order() {
        let mut store = store_with(&[2.0, 0.0, 1.0]);
        let drained: Vec<f64> = store.drain().into_iter().map(|p| p.time).collect();
        assert_eq!(drained, vec![0.0, 1.0, 2.0]);
        assert!(store.is_empty());
    }
}
