use crate::engine::error::{ensure_len, GradationError, Result};
use crate::engine::{GradationEngine, MaterialSpec, Sieve};

// ---------------------------------------------------------------------------
// GradationSheet – one imported gradation table
// ---------------------------------------------------------------------------

/// A gradation table as read from an external file.
///
/// Only the sieve column is mandatory; the loader additionally requires at
/// least one of `passing` / `retained`. Every present column has one value
/// per sieve.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GradationSheet {
    pub sieve_sizes: Vec<Sieve>,
    /// Percent passing per sieve.
    pub passing: Option<Vec<f64>>,
    /// Weight retained on each sieve, in sample units (usually grams).
    pub retained: Option<Vec<f64>>,
    pub lower: Option<Vec<f64>>,
    pub upper: Option<Vec<f64>>,
    pub total_weight: Option<f64>,
}

impl GradationSheet {
    /// Number of sieves.
    pub fn len(&self) -> usize {
        self.sieve_sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sieve_sizes.is_empty()
    }

    /// Check that every present column lines up with the sieve column, that
    /// percent passing lies in `0..=100` and that retained masses are not
    /// negative.
    pub fn validate(&self) -> Result<()> {
        let n = self.len();
        let columns = [
            ("passing column", &self.passing),
            ("retained column", &self.retained),
            ("lower limit column", &self.lower),
            ("upper limit column", &self.upper),
        ];
        for (what, col) in columns {
            if let Some(values) = col {
                ensure_len(what, n, values.len())?;
            }
        }
        if let Some(passing) = &self.passing {
            check_range("passing column", passing, |p| (0.0..=100.0).contains(&p))?;
        }
        if let Some(retained) = &self.retained {
            check_range("retained column", retained, |r| r >= 0.0)?;
        }
        Ok(())
    }

    /// Percent-passing curve, derived from retained weights when the sheet
    /// has no passing column.
    pub fn passing_curve(&self, engine: &GradationEngine) -> Option<Vec<f64>> {
        match (&self.passing, &self.retained) {
            (Some(passing), _) => Some(passing.clone()),
            (None, Some(retained)) => Some(engine.retained_to_passing(retained)),
            (None, None) => None,
        }
    }

    /// Explicit total weight, or the sum of the retained column.
    pub fn effective_total_weight(&self) -> Option<f64> {
        self.total_weight.or_else(|| {
            self.retained
                .as_ref()
                .map(|r| r.iter().sum::<f64>())
                .filter(|&sum| sum > 0.0)
        })
    }

    /// Limits carried by the sheet, if it has both limit columns.
    pub fn limits(&self, name: &str) -> Option<Result<MaterialSpec>> {
        let (lower, upper) = (self.lower.as_ref()?, self.upper.as_ref()?);
        Some(MaterialSpec::new(
            name,
            self.sieve_sizes.clone(),
            lower.clone(),
            upper.clone(),
        ))
    }
}

fn check_range(what: &'static str, values: &[f64], ok: impl Fn(f64) -> bool) -> Result<()> {
    match values.iter().position(|&v| !ok(v)) {
        Some(row) => Err(GradationError::ValueOutOfRange {
            what,
            row,
            value: values[row],
        }),
        None => Ok(()),
    }
}
