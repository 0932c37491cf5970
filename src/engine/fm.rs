use std::fmt;

use serde::{Deserialize, Serialize};

/// Which representation the fineness modulus is computed from.
///
/// The two formulas do not return the same number for the same sample: see
/// [`FmCalculator::calculate_fm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FmMode {
    /// `Σ(100 − passing[i]) / 100` straight from the percent-passing curve.
    #[default]
    PassingCurve,
    /// Cumulative-complement formula over retained weights.
    RetainedWeights,
}

impl FmMode {
    pub const ALL: [FmMode; 2] = [FmMode::PassingCurve, FmMode::RetainedWeights];
}

impl fmt::Display for FmMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FmMode::PassingCurve => write!(f, "From % passing"),
            FmMode::RetainedWeights => write!(f, "From retained weights"),
        }
    }
}

/// Reduces a gradation to its fineness modulus.
#[derive(Debug, Clone, Copy, Default)]
pub struct FmCalculator;

impl FmCalculator {
    /// FM from per-sieve retained quantities.
    ///
    /// With `cum[i]` the running sum of `retained`, this returns
    /// `Σ (1 − cum[i] / cum[N−1]) · 100 / 100`. Each term is the cumulative
    /// percent *passing* at sieve `i`, so for a curve converted through
    /// [`GradationEngine::passing_to_retained`](super::GradationEngine::passing_to_retained)
    /// the result is `Σ passing / 100`, the complement of
    /// [`fm_from_passing`](Self::fm_from_passing) with respect to `N`.
    ///
    /// An empty or all-zero sample returns `0.0`.
    pub fn calculate_fm(&self, retained: &[f64]) -> f64 {
        let total: f64 = retained.iter().sum();
        if total == 0.0 {
            return 0.0;
        }
        let mut cum = 0.0;
        let sum_pct: f64 = retained
            .iter()
            .map(|r| {
                cum += r;
                (1.0 - cum / total) * 100.0
            })
            .sum();
        sum_pct / 100.0
    }

    /// FM from a percent-passing curve: cumulative percent retained summed
    /// over all sieves, divided by 100.
    pub fn fm_from_passing(&self, passing: &[f64]) -> f64 {
        passing.iter().map(|p| 100.0 - p).sum::<f64>() / 100.0
    }

    /// Dispatch on `mode`, given both representations of the same sample.
    pub fn calculate(&self, mode: FmMode, passing: &[f64], retained: &[f64]) -> f64 {
        match mode {
            FmMode::PassingCurve => self.fm_from_passing(passing),
            FmMode::RetainedWeights => self.calculate_fm(retained),
        }
    }
}
