//! Weighted random choice
//!
//! Entries are walked in the order given, so callers control which entries
//! are checked first against the draw.

use rand::Rng;

use crate::error::{CoreError, CoreResult};

/// Pick one entry with probability `weight / total_weight`.
///
/// Fails with `InvalidWeights` for an empty list, a negative or NaN weight,
/// or a total that is not positive.
pub fn choose<'a, T, R: Rng + ?Sized>(
    rng: &mut R,
    entries: &'a [(T, f64)],
) -> CoreResult<&'a T> {
    let total = total_weight(entries)?;

    let mut r = rng.random::<f64>() * total;
    for (value, weight) in entries {
        if r < *weight {
            return Ok(value);
        }
        r -= weight;
    }

    // Float error can leave r just past the last bucket
    entries
        .iter()
        .rev()
        .find(|(_, w)| *w > 0.0)
        .map(|(value, _)| value)
        .ok_or(CoreError::InvalidWeights)
}

/// Same as [`choose`] but returns a copy of the value
pub fn choose_copied<T: Copy, R: Rng + ?Sized>(
    rng: &mut R,
    entries: &[(T, f64)],
) -> CoreResult<T> {
    choose(rng, entries).copied()
}

fn total_weight<T>(entries: &[(T, f64)]) -> CoreResult<f64> {
    if entries.is_empty() {
        return Err(CoreError::InvalidWeights);
    }
    let mut total = 0.0;
    for (_, weight) in entries {
        if weight.is_nan() || *weight < 0.0 {
            return Err(CoreError::InvalidWeights);
        }
        total += weight;
    }
    if total > 0.0 && total.is_finite() {
        Ok(total)
    } else {
        Err(CoreError::InvalidWeights)
    }
}
