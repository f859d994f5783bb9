//! Dimension-generic value vectors.
//!
//! Every component is handled independently; all arithmetic is elementwise.
//! Binary operations on vectors of different length operate on the common
//! prefix and keep the length of the left operand.

use std::ops::{
    Add, AddAssign, Deref, DerefMut, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign,
};

use serde::{Deserialize, Serialize};

/// Fixed-length vector of `f64` components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueVector(Vec<f64>);

impl ValueVector {
    /// Zero vector with `dimensions` components.
    pub fn zeros(dimensions: usize) -> Self {
        Self(vec![0.0; dimensions])
    }

    /// Vector with every component set to `value`.
    pub fn splat(dimensions: usize, value: f64) -> Self {
        Self(vec![value; dimensions])
    }

    /// Number of components.
    #[inline]
    pub fn dimensions(&self) -> usize {
        self.0.len()
    }

    /// Resize to `dimensions`, zero-filling new components and truncating
    /// removed ones.
    pub fn set_dimensions(&mut self, dimensions: usize) {
        self.0.resize(dimensions, 0.0);
    }

    /// Set every component to `value`.
    pub fn fill(&mut self, value: f64) {
        self.0.fill(value);
    }

    /// Copy of the components `first..first + count`.
    pub fn slice(&self, first: usize, count: usize) -> Self {
        Self(self.0[first..first + count].to_vec())
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.0
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }

    /// Elementwise minimum, in place.
    pub fn min_assign(&mut self, other: &ValueVector) {
        for (a, &b) in self.0.iter_mut().zip(other.0.iter()) {
            *a = a.min(b);
        }
    }

    /// Elementwise maximum, in place.
    pub fn max_assign(&mut self, other: &ValueVector) {
        for (a, &b) in self.0.iter_mut().zip(other.0.iter()) {
            *a = a.max(b);
        }
    }

    /// Elementwise minimum.
    pub fn min(&self, other: &ValueVector) -> ValueVector {
        let mut out = self.clone();
        out.min_assign(other);
        out
    }

    /// Elementwise maximum.
    pub fn max(&self, other: &ValueVector) -> ValueVector {
        let mut out = self.clone();
        out.max_assign(other);
        out
    }

    /// Linear blend `self * (1 - f) + other * f`.
    pub fn lerp(&self, other: &ValueVector, f: f64) -> ValueVector {
        let mut out = self.clone();
        for (a, &b) in out.0.iter_mut().zip(other.0.iter()) {
            *a = *a * (1.0 - f) + f * b;
        }
        out
    }

    /// Whether every component is within `epsilon` of `other`.
    pub fn approx_eq(&self, other: &ValueVector, epsilon: f64) -> bool {
        self.0.len() == other.0.len()
            && self
                .0
                .iter()
                .zip(other.0.iter())
                .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

impl Deref for ValueVector {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

impl DerefMut for ValueVector {
    fn deref_mut(&mut self) -> &mut [f64] {
        &mut self.0
    }
}

impl From<Vec<f64>> for ValueVector {
    fn from(v: Vec<f64>) -> Self {
        Self(v)
    }
}

impl From<&[f64]> for ValueVector {
    fn from(v: &[f64]) -> Self {
        Self(v.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for ValueVector {
    fn from(v: [f64; N]) -> Self {
        Self(v.to_vec())
    }
}

impl From<f64> for ValueVector {
    fn from(v: f64) -> Self {
        Self(vec![v])
    }
}

impl FromIterator<f64> for ValueVector {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ============================================================================
// Elementwise operators
// ============================================================================

impl AddAssign<&ValueVector> for ValueVector {
    fn add_assign(&mut self, rhs: &ValueVector) {
        for (a, &b) in self.0.iter_mut().zip(rhs.0.iter()) {
            *a += b;
        }
    }
}

impl SubAssign<&ValueVector> for ValueVector {
    fn sub_assign(&mut self, rhs: &ValueVector) {
        for (a, &b) in self.0.iter_mut().zip(rhs.0.iter()) {
            *a -= b;
        }
    }
}

impl MulAssign<f64> for ValueVector {
    fn mul_assign(&mut self, rhs: f64) {
        for a in self.0.iter_mut() {
            *a *= rhs;
        }
    }
}

impl DivAssign<f64> for ValueVector {
    fn div_assign(&mut self, rhs: f64) {
        for a in self.0.iter_mut() {
            *a /= rhs;
        }
    }
}

impl Add<&ValueVector> for &ValueVector {
    type Output = ValueVector;

    fn add(self, rhs: &ValueVector) -> ValueVector {
        let mut out = self.clone();
        out += rhs;
        out
    }
}

impl Add<&ValueVector> for ValueVector {
    type Output = ValueVector;

    fn add(mut self, rhs: &ValueVector) -> ValueVector {
        self += rhs;
        self
    }
}

impl Sub<&ValueVector> for &ValueVector {
    type Output = ValueVector;

    fn sub(self, rhs: &ValueVector) -> ValueVector {
        let mut out = self.clone();
        out -= rhs;
        out
    }
}

impl Sub<&ValueVector> for ValueVector {
    type Output = ValueVector;

    fn sub(mut self, rhs: &ValueVector) -> ValueVector {
        self -= rhs;
        self
    }
}

impl Mul<f64> for &ValueVector {
    type Output = ValueVector;

    fn mul(self, rhs: f64) -> ValueVector {
        let mut out = self.clone();
        out *= rhs;
        out
    }
}

impl Mul<f64> for ValueVector {
    type Output = ValueVector;

    fn mul(mut self, rhs: f64) -> ValueVector {
        self *= rhs;
        self
    }
}

impl Div<f64> for &ValueVector {
    type Output = ValueVector;

    fn div(self, rhs: f64) -> ValueVector {
        let mut out = self.clone();
        out /= rhs;
        out
    }
}

impl Div<f64> for ValueVector {
    type Output = ValueVector;

    fn div(mut self, rhs: f64) -> ValueVector {
        self /= rhs;
        self
    }
}

impl Neg for ValueVector {
    type Output = ValueVector;

    fn neg(mut self) -> ValueVector {
        for a in self.0.iter_mut() {
            *a = -*a;
        }
        self
    }
}
