use crate::HfError;

/// Floating point type used for all field data.
pub type Real = f64;

/// Pass `v` through, or fail with [`HfError::NonFinite`] naming `what`.
pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, HfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(HfError::NonFinite { what, value: v })
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive. The last value
/// is exactly `end`.
pub fn linspace(start: Real, end: Real, n: usize) -> Vec<Real> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as Real;
            let mut v: Vec<Real> = (0..n).map(|i| start + step * i as Real).collect();
            v[n - 1] = end;
            v
        }
    }
}

/// Arithmetic mean ignoring NaN entries. Returns NaN when nothing is left.
pub fn nan_mean(values: &[Real]) -> Real {
    let (sum, count) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        Real::NAN
    } else {
        sum / count as Real
    }
}
