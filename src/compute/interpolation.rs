//! Curve evaluation between timeline points.
//!
//! The segment containing a query time is located by ordered search, then
//! the kind of the segment's first point picks the interpolation. Outside
//! the first/last point the curve is flat. Every formula is applied to each
//! component independently, writing into a caller-supplied buffer so the
//! evaluation itself never allocates.

use super::{PointStore, TimeKey, ValueVector};
use crate::schema::InterpolationKind;

/// Evaluate the curve at `time` into a new vector of `dimensions` components.
pub fn evaluate(store: &PointStore, time: f64, dimensions: usize) -> ValueVector {
    let mut out = ValueVector::zeros(dimensions);
    evaluate_into(store, time, &mut out);
    out
}

/// Evaluate the curve at `time` into `out`.
///
/// An empty store yields zeros. Slots of `out` beyond the points'
/// dimensions are zeroed; point components beyond `out` are ignored.
pub fn evaluate_into(store: &PointStore, time: f64, out: &mut [f64]) {
    let key = TimeKey::from_time(time);

    let Some((key1, p1)) = store.at_or_before(key) else {
        // Before the first point, or no points at all
        match store.first() {
            Some(first) => copy_into(out, &first.value),
            None => out.fill(0.0),
        }
        return;
    };

    let mut after = store.after(key1);
    let Some(p2) = after.next() else {
        copy_into(out, &p1.value);
        return;
    };

    let span = p2.time - p1.time;
    let f = (time - p1.time) / span;

    match p1.kind {
        InterpolationKind::Constant => copy_into(out, &p1.value),

        InterpolationKind::Linear => lerp_into(out, &p1.value, &p2.value, f),

        InterpolationKind::Smooth => lerp_into(out, &p1.value, &p2.value, smooth_fade(f)),

        InterpolationKind::Symmetric => {
            let fade = smoothstep(f);
            let t_from_p1 = time - p1.time;
            let t_to_p2 = p2.time - time;
            let out = common_prefix(
                out,
                &[&p1.value, &p1.tangent, &p2.value, &p2.tangent],
            );
            for ((o, (&v1, &d1)), (&v2, &d2)) in out
                .iter_mut()
                .zip(p1.value.iter().zip(p1.tangent.iter()))
                .zip(p2.value.iter().zip(p2.tangent.iter()))
            {
                *o = (1.0 - fade) * (v1 + d1 * t_from_p1) + fade * (v2 - d2 * t_to_p2);
            }
        }

        InterpolationKind::Hermite => {
            let out = common_prefix(
                out,
                &[&p1.value, &p1.tangent, &p2.value, &p2.tangent],
            );
            for ((o, (&v1, &d1)), (&v2, &d2)) in out
                .iter_mut()
                .zip(p1.value.iter().zip(p1.tangent.iter()))
                .zip(p2.value.iter().zip(p2.tangent.iter()))
            {
                *o = hermite(f, v1, d1, d2, v2);
            }
        }

        InterpolationKind::Spline4 | InterpolationKind::Spline4Sym => {
            let y0 = store.before(key1).next().map_or(&p1.value, |p| &p.value);
            let y3 = after.next().map_or(&p2.value, |p| &p.value);
            let out = common_prefix(out, &[y0, &p1.value, &p2.value, y3]);
            for (i, o) in out.iter_mut().enumerate() {
                *o = spline4(f, y0[i], p1.value[i], p2.value[i], y3[i]);
            }
        }

        InterpolationKind::Spline6 => {
            let mut before = store.before(key1);
            let y1 = before.next().map_or(&p1.value, |p| &p.value);
            let y0 = before.next().map_or(y1, |p| &p.value);
            let y4 = after.next().map_or(&p2.value, |p| &p.value);
            let y5 = after.next().map_or(y4, |p| &p.value);
            let out = common_prefix(out, &[y0, y1, &p1.value, &p2.value, y4, y5]);
            for (i, o) in out.iter_mut().enumerate() {
                *o = spline6(f, y0[i], y1[i], p1.value[i], p2.value[i], y4[i], y5[i]);
            }
        }
    }
}

/// Zero the slots of `out` past the shortest input and return the rest.
#[inline]
fn common_prefix<'a>(out: &'a mut [f64], inputs: &[&ValueVector]) -> &'a mut [f64] {
    let n = inputs
        .iter()
        .fold(out.len(), |n, v| n.min(v.dimensions()));
    let (head, tail) = out.split_at_mut(n);
    tail.fill(0.0);
    head
}

#[inline]
fn copy_into(out: &mut [f64], value: &ValueVector) {
    let out = common_prefix(out, &[value]);
    let n = out.len();
    out.copy_from_slice(&value[..n]);
}

#[inline]
fn lerp_into(out: &mut [f64], a: &ValueVector, b: &ValueVector, f: f64) {
    let out = common_prefix(out, &[a, b]);
    for ((o, &a), &b) in out.iter_mut().zip(a.iter()).zip(b.iter()) {
        *o = a * (1.0 - f) + f * b;
    }
}

// ============================================================================
// Scalar primitives
// ============================================================================

/// Ease used by `Smooth`: `3f²(1-f) + f³`.
#[inline]
pub fn smooth_fade(f: f64) -> f64 {
    3.0 * f * f * (1.0 - f) + f * f * f
}

/// Smoothstep used by `Symmetric`: `-2f³ + 3f²`.
#[inline]
pub fn smoothstep(f: f64) -> f64 {
    let fq = f * f;
    -2.0 * fq * f + 3.0 * fq
}

/// Cubic Hermite basis on `t` in [0, 1] with unscaled tangents.
#[inline]
pub fn hermite(t: f64, v1: f64, d1: f64, d2: f64, v2: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    let h1 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h2 = t3 - 2.0 * t2 + t;
    let h3 = t3 - t2;
    h1 * v1 + h2 * d1 + h3 * d2 + (1.0 - h1) * v2
}

/// Four-sample spline between `y1` (t = 0) and `y2` (t = 1).
#[inline]
pub fn spline4(t: f64, y0: f64, y1: f64, y2: f64, y3: f64) -> f64 {
    let a0 = -0.5 * y0 + 1.5 * y1 - 1.5 * y2 + 0.5 * y3;
    let a1 = y0 - 2.5 * y1 + 2.0 * y2 - 0.5 * y3;
    let a2 = -0.5 * y0 + 0.5 * y2;
    let t2 = t * t;
    a0 * t * t2 + a1 * t2 + a2 * t + y1
}

/// Six-sample spline between `y2` (t = 0) and `y3` (t = 1).
///
/// Quintic Hermite segment whose end slopes come from the five-point
/// central difference and whose end curvatures come from the three-point
/// second difference, both in sample spacing units. Neighbouring segments
/// share these estimates, so the curve is C2 in the normalized parameter
/// (and in time when the samples are evenly spaced). Polynomials up to
/// degree two are reproduced exactly.
#[inline]
pub fn spline6(t: f64, y0: f64, y1: f64, y2: f64, y3: f64, y4: f64, y5: f64) -> f64 {
    let m2 = (y0 - 8.0 * y1 + 8.0 * y3 - y4) / 12.0;
    let m3 = (y1 - 8.0 * y2 + 8.0 * y4 - y5) / 12.0;
    let c2 = y1 - 2.0 * y2 + y3;
    let c3 = y2 - 2.0 * y3 + y4;

    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;
    let t5 = t4 * t;

    let h0 = 1.0 - 10.0 * t3 + 15.0 * t4 - 6.0 * t5;
    let h1 = t - 6.0 * t3 + 8.0 * t4 - 3.0 * t5;
    let h2 = 0.5 * t2 - 1.5 * t3 + 1.5 * t4 - 0.5 * t5;
    let h3 = 0.5 * t3 - t4 + 0.5 * t5;
    let h4 = -4.0 * t3 + 7.0 * t4 - 3.0 * t5;
    let h5 = 10.0 * t3 - 15.0 * t4 + 6.0 * t5;

    h0 * y2 + h1 * m2 + h2 * c2 + h3 * c3 + h4 * m3 + h5 * y3
}
