use super::error::{ensure_len, GradationError, Result};

/// Force every point of `curve` into `[lower[i], upper[i]]`.
pub fn clamp(curve: &[f64], lower: &[f64], upper: &[f64]) -> Result<Vec<f64>> {
    ensure_len("lower limits", curve.len(), lower.len())?;
    ensure_len("upper limits", curve.len(), upper.len())?;

    Ok(curve
        .iter()
        .zip(lower.iter().zip(upper))
        .map(|(&c, (&lo, &hi))| clamp_value(c, lo, hi))
        .collect())
}

/// Accept or correct a single proposed value for sieve `index`.
///
/// Returns the value that should be stored: `proposed` itself when it lies
/// inside the limits, otherwise the nearest limit.
pub fn clamp_one(index: usize, proposed: f64, lower: &[f64], upper: &[f64]) -> Result<f64> {
    ensure_len("upper limits", lower.len(), upper.len())?;
    if index >= lower.len() {
        return Err(GradationError::IndexOutOfRange {
            index,
            len: lower.len(),
        });
    }
    Ok(clamp_value(proposed, lower[index], upper[index]))
}

// `f64::clamp` panics when lo > hi; that case is a caller precondition
// violation, and this form degrades to `lo` instead.
fn clamp_value(value: f64, lo: f64, hi: f64) -> f64 {
    lo.max(hi.min(value))
}
