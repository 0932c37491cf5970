use rand::Rng;
use rand_distr::StandardNormal;

use super::clamp::clamp;
use super::error::{ensure_len, Result};

/// Default noise standard deviation, in percent-passing units.
pub const DEFAULT_SIGMA: f64 = 3.0;

const STRICT_SMOOTHING_PASSES: usize = 3;

/// How the synthesized curve is smoothed after the first clamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmoothingVariant {
    /// One in-place pass; later points see already-smoothed neighbours and
    /// the result is not re-clamped.
    Legacy,
    /// Three passes, each reading only the previous pass, then re-clamped.
    #[default]
    Strict,
}

// ---------------------------------------------------------------------------
// RandomCurveGenerator
// ---------------------------------------------------------------------------

/// Synthesizes smooth random percent-passing curves inside a set of limits.
///
/// Starting from the midpoint of the limits, a mean-centred random walk of
/// Gaussian steps is added, the result is clamped, smoothed with a 3-point
/// moving average on interior points, and (for [`SmoothingVariant::Strict`])
/// clamped again. The first and last points are never smoothed.
#[derive(Debug, Clone, Copy)]
pub struct RandomCurveGenerator {
    sigma: f64,
    variant: SmoothingVariant,
}

impl Default for RandomCurveGenerator {
    fn default() -> Self {
        Self {
            sigma: DEFAULT_SIGMA,
            variant: SmoothingVariant::default(),
        }
    }
}

impl RandomCurveGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Smaller sigma gives a tighter curve around the midpoint. Non-positive
    /// or non-finite values fall back to [`DEFAULT_SIGMA`].
    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = if sigma.is_finite() && sigma > 0.0 {
            sigma
        } else {
            log::warn!("ignoring noise sigma {sigma}, using {DEFAULT_SIGMA}");
            DEFAULT_SIGMA
        };
        self
    }

    pub fn with_variant(mut self, variant: SmoothingVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn variant(&self) -> SmoothingVariant {
        self.variant
    }

    /// Generate a curve using the thread-local RNG.
    pub fn generate(&self, lower: &[f64], upper: &[f64]) -> Result<Vec<f64>> {
        self.generate_with(&mut rand::thread_rng(), lower, upper)
    }

    /// Generate a curve from a caller-supplied RNG.
    ///
    /// `lower[i] <= upper[i]` is a precondition; crossed limits produce an
    /// unspecified (but finite) curve.
    pub fn generate_with<R: Rng>(
        &self,
        rng: &mut R,
        lower: &[f64],
        upper: &[f64],
    ) -> Result<Vec<f64>> {
        ensure_len("upper limits", lower.len(), upper.len())?;
        let n = lower.len();
        if n == 0 {
            return Ok(Vec::new());
        }

        let walk = self.centred_walk(rng, n);
        let seeded: Vec<f64> = lower
            .iter()
            .zip(upper)
            .zip(&walk)
            .map(|((lo, hi), w)| (lo + hi) / 2.0 + w)
            .collect();

        let mut curve = clamp(&seeded, lower, upper)?;

        match self.variant {
            SmoothingVariant::Legacy => smooth_in_place(&mut curve),
            SmoothingVariant::Strict => {
                for _ in 0..STRICT_SMOOTHING_PASSES {
                    curve = smooth_pass(&curve);
                }
                curve = clamp(&curve, lower, upper)?;
            }
        }

        log::trace!("generated curve {curve:?} (sigma {})", self.sigma);
        Ok(curve)
    }

    /// Cumulative sum of `n` Gaussian steps, shifted to zero mean.
    fn centred_walk<R: Rng>(&self, rng: &mut R, n: usize) -> Vec<f64> {
        let mut acc = 0.0;
        let walk: Vec<f64> = (0..n)
            .map(|_| {
                let step: f64 = rng.sample(StandardNormal);
                acc += step * self.sigma;
                acc
            })
            .collect();
        let mean = walk.iter().sum::<f64>() / n as f64;
        walk.into_iter().map(|w| w - mean).collect()
    }
}

/// One 3-point moving-average pass over interior points, reading only the
/// input.
fn smooth_pass(curve: &[f64]) -> Vec<f64> {
    let mut out = curve.to_vec();
    for i in 1..curve.len().saturating_sub(1) {
        out[i] = (curve[i - 1] + curve[i] + curve[i + 1]) / 3.0;
    }
    out
}

/// Single in-place pass: each point averages an already-updated left neighbour.
fn smooth_in_place(curve: &mut [f64]) {
    for i in 1..curve.len().saturating_sub(1) {
        curve[i] = (curve[i - 1] + curve[i] + curve[i + 1]) / 3.0;
    }
}
