//! Tangent synthesis and finite-difference derivatives.

use super::{PointStore, TimeKey, ValueVector, evaluate_into, time_quantum};

/// Distance of the synthetic neighbour used when a point has no real
/// neighbour on one side.
const OPEN_BOUNDARY_OFFSET: f64 = 1.0;

/// Automatic tangent for the point at `key`:
/// `(v_next - v_prev) / (t_next - t_prev)`.
///
/// A missing neighbour is replaced by a copy of the point itself placed one
/// second away, so an open end contributes zero slope.
pub fn auto_tangent(store: &PointStore, key: TimeKey) -> Option<ValueVector> {
    let point = store.get(key)?;

    let (t_prev, v_prev) = store
        .before(key)
        .next()
        .map_or((point.time - OPEN_BOUNDARY_OFFSET, &point.value), |p| {
            (p.time, &p.value)
        });
    let (t_next, v_next) = store
        .after(key)
        .next()
        .map_or((point.time + OPEN_BOUNDARY_OFFSET, &point.value), |p| {
            (p.time, &p.value)
        });

    Some((v_next - v_prev) / (t_next - t_prev))
}

/// Recompute the tangent of the point at `key` if its kind uses tangents.
/// Returns whether the tangent was updated.
pub fn refresh_tangent(store: &mut PointStore, key: TimeKey) -> bool {
    let uses_tangent = store.get(key).is_some_and(|p| p.kind.uses_tangent());
    if !uses_tangent {
        return false;
    }

    match (auto_tangent(store, key), store.get_mut(key)) {
        (Some(tangent), Some(point)) => {
            point.tangent = tangent;
            true
        }
        _ => false,
    }
}

/// Recompute the tangents of every tangent-using point from the current
/// values. Idempotent: tangents never feed back into the computation.
/// Returns the number of updated points.
pub fn recompute_tangents(store: &mut PointStore) -> usize {
    let updates: Vec<(TimeKey, ValueVector)> = store
        .iter_keyed()
        .filter(|(_, p)| p.kind.uses_tangent())
        .filter_map(|(key, _)| auto_tangent(store, key).map(|t| (key, t)))
        .collect();

    let count = updates.len();
    for (key, tangent) in updates {
        if let Some(point) = store.get_mut(key) {
            point.tangent = tangent;
        }
    }
    count
}

/// Clamp a finite-difference step to the smallest meaningful value.
#[inline]
pub fn clamp_step(h: f64) -> f64 {
    // NaN falls through to the quantum as well
    h.max(time_quantum())
}

/// Central difference `(f(t + h/2) - f(t - h/2)) / h` of the unlimited
/// curve. Steps below [`time_quantum`] are raised to it.
pub fn derivative_at(store: &PointStore, time: f64, h: f64, dimensions: usize) -> ValueVector {
    let h = clamp_step(h);
    let mut ahead = ValueVector::zeros(dimensions);
    let mut behind = ValueVector::zeros(dimensions);
    evaluate_into(store, time + h * 0.5, &mut ahead);
    evaluate_into(store, time - h * 0.5, &mut behind);
    ahead -= &behind;
    ahead /= h;
    ahead
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::Point;
    use crate::schema::InterpolationKind;

    fn store(points: &[(f64, f64, InterpolationKind)]) -> PointStore {
        let mut store = PointStore::new();
        for &(t, v, kind) in points {
            store.insert(Point::new(t, v, kind)).unwrap();
        }
        store
    }

    #[test]
    fn test_auto_tangent_interior() {
        let s = store(&[
            (0.0, 0.0, InterpolationKind::Symmetric),
            (1.0, 5.0, InterpolationKind::Symmetric),
            (3.0, 8.0, InterpolationKind::Symmetric),
        ]);
        let t = auto_tangent(&s, TimeKey::from_time(1.0)).unwrap();
        assert!((t[0] - 8.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_auto_tangent_open_boundaries() {
        let s = store(&[
            (0.0, 0.0, InterpolationKind::Symmetric),
            (1.0, 4.0, InterpolationKind::Symmetric),
        ]);
        // First point: synthetic previous at t = -1 with value 0.
        let first = auto_tangent(&s, TimeKey::from_time(0.0)).unwrap();
        assert!((first[0] - 2.0).abs() < 1e-12);
        // Last point: synthetic next at t = 2 with value 4.
        let last = auto_tangent(&s, TimeKey::from_time(1.0)).unwrap();
        assert!((last[0] - 2.0).abs() < 1e-12);

        let single = store(&[(0.0, 3.0, InterpolationKind::Hermite)]);
        assert_eq!(
            auto_tangent(&single, TimeKey::from_time(0.0)).unwrap()[0],
            0.0
        );
    }

    #[test]
    fn test_refresh_skips_non_tangent_kinds() {
        let mut s = store(&[
            (0.0, 0.0, InterpolationKind::Linear),
            (1.0, 1.0, InterpolationKind::Linear),
        ]);
        assert!(!refresh_tangent(&mut s, TimeKey::from_time(0.0)));
        assert_eq!(s.find(0.0).unwrap().tangent[0], 0.0);
    }

    #[test]
    fn test_recompute_idempotent() {
        let mut s = store(&[
            (0.0, 1.0, InterpolationKind::Symmetric),
            (0.5, 3.0, InterpolationKind::Hermite),
            (2.0, -1.0, InterpolationKind::Linear),
            (2.5, 0.0, InterpolationKind::Symmetric),
        ]);
        assert_eq!(recompute_tangents(&mut s), 3);
        let once: Vec<Point> = s.iter().cloned().collect();
        recompute_tangents(&mut s);
        let twice: Vec<Point> = s.iter().cloned().collect();
        assert_eq!(once, twice);
        // The linear point keeps its zero tangent.
        assert_eq!(s.find(2.0).unwrap().tangent[0], 0.0);
    }

    #[test]
    fn test_derivative_of_linear() {
        let s = store(&[
            (0.0, 0.0, InterpolationKind::Linear),
            (2.0, 10.0, InterpolationKind::Linear),
        ]);
        let d = derivative_at(&s, 1.0, 0.01, 1);
        assert!((d[0] - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_derivative_constant_region_is_zero() {
        let s = store(&[
            (0.0, 2.0, InterpolationKind::Constant),
            (1.0, 7.0, InterpolationKind::Constant),
            (2.0, 7.0, InterpolationKind::Constant),
        ]);
        for t in [0.3, 0.5, 1.4] {
            assert!(derivative_at(&s, t, 0.01, 1)[0].abs() < 1e-12);
        }
    }

    #[test]
    fn test_step_is_clamped() {
        assert_eq!(clamp_step(0.0), time_quantum());
        assert_eq!(clamp_step(-1.0), time_quantum());
        assert_eq!(clamp_step(f64::NAN), time_quantum());
        assert_eq!(clamp_step(0.5), 0.5);

        let s = store(&[
            (0.0, 0.0, InterpolationKind::Linear),
            (1.0, 1.0, InterpolationKind::Linear),
        ]);
        let d = derivative_at(&s, 0.5, 1e-12, 1);
        assert!((d[0] - 1.0).abs() < 1e-9);
    }
}
