//! Dimensional projection - extract a sub-range of components as a new timeline.

use super::{Point, Timeline};

/// Clamp a component range against `dimensions`.
///
/// `first` is limited to `dimensions - 1` and `count` to the components
/// remaining after it. A zero-dimensional source yields an empty range.
pub fn clamp_projection(dimensions: usize, first: usize, count: usize) -> (usize, usize) {
    if dimensions == 0 {
        return (0, 0);
    }
    let first = first.min(dimensions - 1);
    let count = count.min(dimensions - first);
    (first, count)
}

impl Timeline {
    /// New timeline holding components `first..first + count` of every
    /// point, with the same times, kinds and sliced tangents and limits.
    /// Arguments are clamped with [`clamp_projection`].
    pub fn project(&self, first: usize, count: usize) -> Timeline {
        let (first, count) = clamp_projection(self.dimensions(), first, count);

        let mut projected = Timeline::with_config(count, *self.config());
        for point in self.points() {
            let sliced = Point {
                time: point.time,
                value: point.value.slice(first, count),
                tangent: point.tangent.slice(first, count),
                kind: point.kind,
            };
            projected.add_point(sliced);
        }

        projected.set_limit_policy(self.limits().slice(first, count));
        projected
    }

    /// One-component projection of `component`.
    pub fn project_scalar(&self, component: usize) -> Timeline {
        self.project(component, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::ValueVector;
    use crate::schema::InterpolationKind;

    fn sample() -> Timeline {
        let mut tl = Timeline::new(3);
        tl.add(0.0, [1.0, 2.0, 3.0], InterpolationKind::Symmetric)
            .unwrap();
        tl.add(1.0, [4.0, 5.0, 6.0], InterpolationKind::Linear)
            .unwrap();
        tl.add(2.5, [-1.0, 0.0, 9.0], InterpolationKind::Spline4)
            .unwrap();
        tl.recompute_tangents();
        tl
    }

    #[test]
    fn test_clamp_projection() {
        assert_eq!(clamp_projection(3, 1, 5), (1, 2));
        assert_eq!(clamp_projection(3, 7, 2), (2, 1));
        assert_eq!(clamp_projection(3, 0, 3), (0, 3));
        assert_eq!(clamp_projection(0, 2, 2), (0, 0));
    }

    #[test]
    fn test_project_matches_source_components() {
        let tl = sample();
        let proj = tl.project(1, 2);
        assert_eq!(proj.dimensions(), 2);
        assert_eq!(proj.len(), tl.len());

        for t in [-1.0, 0.0, 0.3, 1.0, 1.7, 2.5, 4.0] {
            let full = tl.get(t);
            let part = proj.get(t);
            assert!(
                part.approx_eq(&ValueVector::from(&full[1..3]), 1e-12),
                "mismatch at {t}"
            );
        }
    }

    #[test]
    fn test_project_keeps_kinds_and_tangents() {
        let tl = sample();
        let proj = tl.project_scalar(2);
        for (a, b) in tl.points().zip(proj.points()) {
            assert_eq!(a.time, b.time);
            assert_eq!(a.kind, b.kind);
            assert_eq!(a.tangent[2], b.tangent[0]);
        }
    }

    #[test]
    fn test_project_slices_limits() {
        let mut tl = sample();
        tl.set_lower_limit([0.0, 1.0, 2.0]).unwrap();
        let proj = tl.project(2, 1);
        assert_eq!(proj.lower_limit(), Some(&ValueVector::from([2.0])));
        assert!(proj.upper_limit().is_none());
    }

    #[test]
    fn test_project_slices_both_limits_and_clamps() {
        let mut tl = sample();
        tl.set_limits([0.0, 1.0, 2.0], [3.0, 4.5, 8.0]).unwrap();
        let proj = tl.project(1, 2);
        assert_eq!(proj.lower_limit(), Some(&ValueVector::from([1.0, 2.0])));
        assert_eq!(proj.upper_limit(), Some(&ValueVector::from([4.5, 8.0])));

        // Component 1 peaks at 5.0 at t=1 and is held to 4.5
        assert_eq!(proj.get(1.0), ValueVector::from([4.5, 6.0]));
        assert_eq!(proj.get(2.5), ValueVector::from([1.0, 8.0]));
    }

    #[test]
    fn test_project_out_of_range_clamps() {
        let tl = sample();
        let proj = tl.project(10, 10);
        assert_eq!(proj.dimensions(), 1);
        assert_eq!(proj.get(1.0), ValueVector::from([6.0]));

        let empty = Timeline::new(0).project(1, 1);
        assert_eq!(empty.dimensions(), 0);
    }
}
