use crate::CoreError;

/// Floating point type for simulated amounts, times and sweep values.
pub type Real = f64;

/// Absolute/relative pair used when comparing simulated values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

impl Tolerances {
    /// True when `a` and `b` agree within either bound.
    pub fn accepts(&self, a: Real, b: Real) -> bool {
        let gap = (a - b).abs();
        gap <= self.abs || gap <= self.rel * a.abs().max(b.abs())
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    tol.accepts(a, b)
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// `count` evenly spaced values from `start` to `end`, both endpoints exact.
///
/// A single point is `start`; zero points is empty.
pub fn linspace(start: Real, end: Real, count: usize) -> Vec<Real> {
    match count {
        0 => return Vec::new(),
        1 => return vec![start],
        _ => {}
    }
    let step = (end - start) / (count - 1) as Real;
    let mut out: Vec<Real> = (0..count).map(|i| start + i as Real * step).collect();
    if let Some(last) = out.last_mut() {
        *last = end;
    }
    out
}

/// `count` values evenly spaced in log space. Both bounds must be positive.
pub fn logspace(start: Real, end: Real, count: usize) -> Vec<Real> {
    let mut out: Vec<Real> = linspace(start.ln(), end.ln(), count)
        .into_iter()
        .map(Real::exp)
        .collect();
    if let Some(first) = out.first_mut() {
        *first = start;
    }
    if count > 1
        && let Some(last) = out.last_mut()
    {
        *last = end;
    }
    out
}
