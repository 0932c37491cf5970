use std::cell::Cell;
use std::rc::Rc;

/// Default total sample weight in grams.
pub const DEFAULT_TOTAL_WEIGHT: f64 = 5000.0;

// ---------------------------------------------------------------------------
// TotalWeightManager – the session's single total sample weight
// ---------------------------------------------------------------------------

/// Shared handle to the session's total sample weight.
///
/// Cloning the manager does not copy the weight: every clone reads and writes
/// the same cell, so a [`GradationEngine`](super::GradationEngine) built from
/// one clone sees a value set through another immediately.
#[derive(Debug, Clone)]
pub struct TotalWeightManager {
    total_weight: Rc<Cell<f64>>,
}

impl Default for TotalWeightManager {
    fn default() -> Self {
        Self::new(DEFAULT_TOTAL_WEIGHT)
    }
}

impl TotalWeightManager {
    pub fn new(total_weight: f64) -> Self {
        Self {
            total_weight: Rc::new(Cell::new(total_weight)),
        }
    }

    /// Replace the current total weight. No validation happens here;
    /// callers reject non-positive input before calling.
    pub fn set_total_weight(&self, value: f64) {
        log::debug!("total weight {} -> {value}", self.total_weight.get());
        self.total_weight.set(value);
    }

    pub fn get_total_weight(&self) -> f64 {
        self.total_weight.get()
    }

    /// Rescale `values` so they sum to the current total weight.
    ///
    /// A zero sum is passed through unchanged.
    pub fn normalize_retained(&self, values: &[f64]) -> Vec<f64> {
        let sum: f64 = values.iter().sum();
        if sum == 0.0 {
            return values.to_vec();
        }
        let factor = self.get_total_weight() / sum;
        values.iter().map(|v| v * factor).collect()
    }

    /// Whether two handles point at the same session weight.
    pub fn shares_state_with(&self, other: &TotalWeightManager) -> bool {
        Rc::ptr_eq(&self.total_weight, &other.total_weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: &[f64], b: &[f64]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-9, "{x} != {y}");
        }
    }

    #[test]
    fn defaults_to_canonical_weight() {
        assert_eq!(TotalWeightManager::default().get_total_weight(), 5000.0);
    }

    #[test]
    fn clones_share_the_same_weight() {
        let a = TotalWeightManager::default();
        let b = a.clone();
        b.set_total_weight(1234.0);
        assert_eq!(a.get_total_weight(), 1234.0);
        assert!(a.shares_state_with(&b));
        assert!(!a.shares_state_with(&TotalWeightManager::default()));
    }

    #[test]
    fn normalize_scales_to_total() {
        let m = TotalWeightManager::new(1000.0);
        let out = m.normalize_retained(&[1.0, 2.0, 2.0]);
        assert_close(&out, &[200.0, 400.0, 400.0]);
    }

    #[test]
    fn normalize_is_idempotent() {
        let m = TotalWeightManager::new(2000.0);
        let once = m.normalize_retained(&[3.0, 7.5, 1.25, 0.0, 9.0]);
        let twice = m.normalize_retained(&once);
        assert_close(&once, &twice);
    }

    #[test]
    fn normalize_passes_zero_sum_through() {
        let m = TotalWeightManager::default();
        assert_eq!(m.normalize_retained(&[0.0, 0.0, 0.0]), vec![0.0, 0.0, 0.0]);
        assert!(m.normalize_retained(&[]).is_empty());
    }
}
