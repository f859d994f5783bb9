//! Optional lower/upper clamping of evaluated values.

use serde::{Deserialize, Serialize};

use super::ValueVector;

/// Per-component output limits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LimitPolicy {
    pub lower: Option<ValueVector>,
    pub upper: Option<ValueVector>,
}

impl LimitPolicy {
    /// Whether any limit is set.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.lower.is_some() || self.upper.is_some()
    }

    /// Clamp `values` in place: lower limit first, then upper limit.
    #[inline]
    pub fn apply(&self, values: &mut [f64]) {
        if let Some(lower) = &self.lower {
            for (v, &lo) in values.iter_mut().zip(lower.iter()) {
                *v = v.max(lo);
            }
        }
        if let Some(upper) = &self.upper {
            for (v, &hi) in values.iter_mut().zip(upper.iter()) {
                *v = v.min(hi);
            }
        }
    }

    /// Resize both limits, zero-filling new components.
    pub fn set_dimensions(&mut self, dimensions: usize) {
        for limit in [&mut self.lower, &mut self.upper].into_iter().flatten() {
            limit.set_dimensions(dimensions);
        }
    }

    /// Limits restricted to the components `first..first + count`.
    pub fn slice(&self, first: usize, count: usize) -> Self {
        Self {
            lower: self.lower.as_ref().map(|v| v.slice(first, count)),
            upper: self.upper.as_ref().map(|v| v.slice(first, count)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inactive_is_identity() {
        let policy = LimitPolicy::default();
        let mut v = [-5.0, 5.0];
        policy.apply(&mut v);
        assert_eq!(v, [-5.0, 5.0]);
        assert!(!policy.is_active());
    }

    #[test]
    fn test_clamps_per_component() {
        let policy = LimitPolicy {
            lower: Some(ValueVector::from([0.0, -1.0])),
            upper: Some(ValueVector::from([1.0, 1.0])),
        };
        let mut v = [-5.0, 0.5];
        policy.apply(&mut v);
        assert_eq!(v, [0.0, 0.5]);

        let mut v = [3.0, -3.0];
        policy.apply(&mut v);
        assert_eq!(v, [1.0, -1.0]);
    }

    #[test]
    fn test_upper_wins_when_limits_cross() {
        let policy = LimitPolicy {
            lower: Some(ValueVector::from([2.0])),
            upper: Some(ValueVector::from([1.0])),
        };
        let mut v = [0.0];
        policy.apply(&mut v);
        assert_eq!(v, [1.0]);
    }

    #[test]
    fn test_slice() {
        let policy = LimitPolicy {
            lower: Some(ValueVector::from([0.0, 1.0, 2.0])),
            upper: None,
        };
        let sliced = policy.slice(1, 2);
        assert_eq!(sliced.lower, Some(ValueVector::from([1.0, 2.0])));
        assert!(sliced.upper.is_none());
    }
}
