//! Ceiling-in-time snapshot selection.
//!
//! For each requested time the selector returns the stored entry with the
//! smallest time that is greater than or equal to the request. It never
//! falls back to the nearest earlier entry: a request past the last stored
//! time is an error.

use hf_results::Snapshot;

use crate::error::{PostError, PostResult};

/// Anything carrying a simulation time.
pub trait Timed {
    fn time_s(&self) -> f64;
}

impl Timed for Snapshot {
    fn time_s(&self) -> f64 {
        self.time_s
    }
}

impl Timed for f64 {
    fn time_s(&self) -> f64 {
        *self
    }
}

impl<T: Timed> Timed for &T {
    fn time_s(&self) -> f64 {
        (*self).time_s()
    }
}

/// Index into `stored` for every entry of `requested`, in request order.
///
/// `stored` must be ordered by non-decreasing time. Requests need not be
/// sorted and may repeat.
pub fn select_indices<T: Timed>(stored: &[T], requested: &[f64]) -> PostResult<Vec<usize>> {
    if requested.is_empty() {
        return Ok(Vec::new());
    }
    let Some(last) = stored.last() else {
        return Err(PostError::EmptyRepository);
    };
    let last = last.time_s();

    requested
        .iter()
        .map(|&t| {
            let t = hf_core::ensure_finite(t, "requested time")?;
            let idx = stored.partition_point(|s| s.time_s() < t);
            if idx == stored.len() {
                Err(PostError::OutOfRange { requested: t, last })
            } else {
                Ok(idx)
            }
        })
        .collect()
}

/// Like [`select_indices`] but returns references to the selected entries.
pub fn select_snapshots<'a, T: Timed>(
    stored: &'a [T],
    requested: &[f64],
) -> PostResult<Vec<&'a T>> {
    Ok(select_indices(stored, requested)?
        .into_iter()
        .map(|i| &stored[i])
        .collect())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn selected_time_is_minimal_ceiling(
            mut stored in prop::collection::vec(-1.0e3_f64..1.0e3_f64, 1..40),
            requested in prop::collection::vec(-1.5e3_f64..1.5e3_f64, 0..20),
        ) {
            stored.sort_by(|a, b| a.total_cmp(b));
            let last = *stored.last().unwrap();

            match select_indices(&stored, &requested) {
                Ok(indices) => {
                    prop_assert_eq!(indices.len(), requested.len());
                    for (&t, &i) in requested.iter().zip(&indices) {
                        prop_assert!(stored[i] >= t);
                        prop_assert!(stored.iter().all(|&s| s < t || s >= stored[i]));
                    }
                }
                Err(PostError::OutOfRange { requested: t, .. }) => {
                    prop_assert!(t > last);
                }
                Err(other) => prop_assert!(false, "unexpected error: {}", other),
            }
        }
    }
}
