use super::weight::TotalWeightManager;

// ---------------------------------------------------------------------------
// GradationEngine – percent passing ↔ retained weight
// ---------------------------------------------------------------------------

/// Converts percent-passing curves into retained weights scaled to the
/// session's total weight.
///
/// Engines built from clones of the same [`TotalWeightManager`] always agree
/// on the total weight.
#[derive(Debug, Clone, Default)]
pub struct GradationEngine {
    total_weight: TotalWeightManager,
}

impl GradationEngine {
    pub fn new(total_weight: TotalWeightManager) -> Self {
        Self { total_weight }
    }

    pub fn total_weight_manager(&self) -> &TotalWeightManager {
        &self.total_weight
    }

    /// Per-sieve retained fraction of the sample, clamped at zero.
    ///
    /// The first sieve retains everything that does not pass it; every
    /// later sieve retains what passed the previous one but not this one.
    fn retained_fractions(passing: &[f64]) -> Vec<f64> {
        let mut prev = 1.0;
        passing
            .iter()
            .map(|p| {
                let frac = p / 100.0;
                let retained = (prev - frac).max(0.0);
                prev = frac;
                retained
            })
            .collect()
    }

    /// Convert a percent-passing curve into absolute retained weights.
    ///
    /// Negative differences from a non-monotonic curve are dropped to zero,
    /// and the result is not renormalized, so the sum can fall short of the
    /// total weight in that case. Use
    /// [`TotalWeightManager::normalize_retained`] when exact mass
    /// conservation is wanted.
    pub fn passing_to_retained(&self, passing: &[f64]) -> Vec<f64> {
        let total = self.total_weight.get_total_weight();
        Self::retained_fractions(passing)
            .into_iter()
            .map(|f| f * total)
            .collect()
    }

    /// Per-sieve retained percentage (unscaled by the total weight).
    pub fn retained_percent(&self, passing: &[f64]) -> Vec<f64> {
        Self::retained_fractions(passing)
            .into_iter()
            .map(|f| f * 100.0)
            .collect()
    }

    /// Rebuild a percent-passing curve from per-sieve retained quantities.
    ///
    /// The quantities are taken relative to their own sum, so both weights
    /// and percentages work. An all-zero input means nothing was retained
    /// anywhere and yields 100% passing at every sieve.
    pub fn retained_to_passing(&self, retained: &[f64]) -> Vec<f64> {
        let total: f64 = retained.iter().sum();
        if total == 0.0 {
            return vec![100.0; retained.len()];
        }
        let mut cum = 0.0;
        retained
            .iter()
            .map(|r| {
                cum += r;
                (1.0 - cum / total) * 100.0
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: &[f64], b: &[f64]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-9, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn linear_curve_splits_weight_evenly() {
        let engine = GradationEngine::new(TotalWeightManager::new(1000.0));
        let retained = engine.passing_to_retained(&[100.0, 80.0, 60.0, 40.0, 20.0, 0.0]);
        assert_close(&retained, &[0.0, 200.0, 200.0, 200.0, 200.0, 200.0]);
        assert!((retained.iter().sum::<f64>() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn first_sieve_retains_what_does_not_pass() {
        let engine = GradationEngine::new(TotalWeightManager::new(2000.0));
        let retained = engine.passing_to_retained(&[95.0, 50.0, 0.0]);
        assert_close(&retained, &[100.0, 900.0, 1000.0]);
    }

    #[test]
    fn non_monotonic_curve_is_clamped_not_normalized() {
        let engine = GradationEngine::new(TotalWeightManager::new(1000.0));
        // 40 -> 60 would be a negative retained amount.
        let retained = engine.passing_to_retained(&[100.0, 40.0, 60.0, 0.0]);
        assert_close(&retained, &[0.0, 600.0, 0.0, 600.0]);
        assert!((retained.iter().sum::<f64>() - 1200.0).abs() < 1e-9);
    }

    #[test]
    fn engines_sharing_a_manager_see_weight_changes() {
        let weight = TotalWeightManager::new(2000.0);
        let table = GradationEngine::new(weight.clone());
        let chart = GradationEngine::new(weight.clone());
        let curve = [100.0, 97.0, 88.0, 71.0, 45.0, 19.0, 5.0, 0.0];

        let before = table.passing_to_retained(&curve);
        weight.set_total_weight(5000.0);
        let after = chart.passing_to_retained(&curve);

        for (b, a) in before.iter().zip(&after) {
            assert!((a - b * 2.5).abs() < 1e-9);
        }
        assert!(table
            .total_weight_manager()
            .shares_state_with(chart.total_weight_manager()));
    }

    #[test]
    fn retained_percent_ignores_total_weight() {
        let engine = GradationEngine::new(TotalWeightManager::new(123.0));
        assert_close(&engine.retained_percent(&[100.0, 70.0, 0.0]), &[0.0, 30.0, 70.0]);
    }

    #[test]
    fn retained_to_passing_inverts_monotone_curves() {
        let engine = GradationEngine::default();
        let curve = [100.0, 92.5, 81.0, 62.0, 47.0, 19.0, 4.0, 0.0];
        let retained = engine.passing_to_retained(&curve);
        assert_close(&engine.retained_to_passing(&retained), &curve);
    }

    #[test]
    fn retained_to_passing_all_zero_means_all_passing() {
        let engine = GradationEngine::default();
        assert_eq!(engine.retained_to_passing(&[0.0, 0.0, 0.0]), vec![100.0; 3]);
    }
}
