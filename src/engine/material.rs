use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{ensure_len, GradationError, Result};

// ---------------------------------------------------------------------------
// Sieve – one row label of a gradation table
// ---------------------------------------------------------------------------

/// A sieve opening in millimetres, or the pan under the finest sieve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sieve {
    Mesh(f64),
    Pan,
}

impl fmt::Display for Sieve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sieve::Mesh(mm) => write!(f, "{mm}"),
            Sieve::Pan => write!(f, "Pan"),
        }
    }
}

impl FromStr for Sieve {
    type Err = GradationError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("pan") {
            return Ok(Sieve::Pan);
        }
        super::error::parse_number(s).map(Sieve::Mesh)
    }
}

// ---------------------------------------------------------------------------
// MaterialKind – the closed set of built-in materials
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialKind {
    Fine,
    Coarse,
    SubBase,
    Crm,
}

struct LimitTable {
    sieves: &'static [Sieve],
    lower: &'static [f64],
    upper: &'static [f64],
}

static FINE: LimitTable = LimitTable {
    sieves: &[
        Sieve::Mesh(10.0),
        Sieve::Mesh(4.75),
        Sieve::Mesh(2.36),
        Sieve::Mesh(1.18),
        Sieve::Mesh(0.6),
        Sieve::Mesh(0.3),
        Sieve::Mesh(0.15),
        Sieve::Pan,
    ],
    lower: &[100.0, 90.0, 75.0, 55.0, 35.0, 8.0, 0.0, 0.0],
    upper: &[100.0, 100.0, 100.0, 90.0, 59.0, 30.0, 10.0, 0.0],
};

static COARSE: LimitTable = LimitTable {
    sieves: &[
        Sieve::Mesh(40.0),
        Sieve::Mesh(20.0),
        Sieve::Mesh(10.0),
        Sieve::Mesh(4.75),
        Sieve::Pan,
    ],
    lower: &[100.0, 90.0, 25.0, 0.0, 0.0],
    upper: &[100.0, 100.0, 35.0, 10.0, 0.0],
};

static SUB_BASE: LimitTable = LimitTable {
    sieves: &[
        Sieve::Mesh(75.0),
        Sieve::Mesh(53.0),
        Sieve::Mesh(26.5),
        Sieve::Mesh(9.5),
        Sieve::Mesh(4.75),
        Sieve::Mesh(2.36),
        Sieve::Mesh(0.425),
        Sieve::Mesh(0.075),
        Sieve::Pan,
    ],
    lower: &[100.0, 80.0, 55.0, 35.0, 25.0, 20.0, 10.0, 0.0, 0.0],
    upper: &[100.0, 100.0, 90.0, 65.0, 55.0, 40.0, 15.0, 5.0, 0.0],
};

static CRM: LimitTable = LimitTable {
    sieves: &[
        Sieve::Mesh(45.0),
        Sieve::Mesh(22.4),
        Sieve::Mesh(5.6),
        Sieve::Mesh(0.71),
        Sieve::Mesh(0.09),
        Sieve::Pan,
    ],
    lower: &[100.0, 90.0, 35.0, 10.0, 2.0, 0.0],
    upper: &[100.0, 100.0, 55.0, 30.0, 5.0, 0.0],
};

impl MaterialKind {
    pub const ALL: [MaterialKind; 4] = [
        MaterialKind::Fine,
        MaterialKind::Coarse,
        MaterialKind::SubBase,
        MaterialKind::Crm,
    ];

    pub fn key(self) -> &'static str {
        match self {
            MaterialKind::Fine => "fine",
            MaterialKind::Coarse => "coarse",
            MaterialKind::SubBase => "subbase",
            MaterialKind::Crm => "crm",
        }
    }

    pub fn from_key(key: &str) -> Option<MaterialKind> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            MaterialKind::Fine => "Fine Aggregate",
            MaterialKind::Coarse => "Coarse Aggregate",
            MaterialKind::SubBase => "Sub-Base",
            MaterialKind::Crm => "CRM for Base",
        }
    }

    fn table(self) -> &'static LimitTable {
        match self {
            MaterialKind::Fine => &FINE,
            MaterialKind::Coarse => &COARSE,
            MaterialKind::SubBase => &SUB_BASE,
            MaterialKind::Crm => &CRM,
        }
    }

    /// The built-in specification limits for this material.
    pub fn spec(self) -> MaterialSpec {
        let t = self.table();
        MaterialSpec {
            name: self.display_name().to_string(),
            sieve_sizes: t.sieves.to_vec(),
            lower_limits: t.lower.to_vec(),
            upper_limits: t.upper.to_vec(),
        }
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ---------------------------------------------------------------------------
// MaterialSpec – sieve sizes and limit curves
// ---------------------------------------------------------------------------

/// Sieve sizes with their lower/upper percent-passing limits.
///
/// All three sequences have the same length (at least two) and
/// `0 <= lower[i] <= upper[i] <= 100` holds at every sieve.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialSpec {
    pub name: String,
    sieve_sizes: Vec<Sieve>,
    lower_limits: Vec<f64>,
    upper_limits: Vec<f64>,
}

impl MaterialSpec {
    /// Build a custom specification, checking the limit invariants.
    pub fn new(
        name: impl Into<String>,
        sieve_sizes: Vec<Sieve>,
        lower_limits: Vec<f64>,
        upper_limits: Vec<f64>,
    ) -> Result<Self> {
        let n = sieve_sizes.len();
        if n < 2 {
            return Err(GradationError::InvalidSpec(format!(
                "need at least 2 sieves, got {n}"
            )));
        }
        ensure_len("lower limits", n, lower_limits.len())?;
        ensure_len("upper limits", n, upper_limits.len())?;

        for (i, (&lo, &hi)) in lower_limits.iter().zip(&upper_limits).enumerate() {
            if !(0.0..=100.0).contains(&lo) || !(0.0..=100.0).contains(&hi) || lo > hi {
                return Err(GradationError::InvalidSpec(format!(
                    "sieve {} ({}): limits {lo}..{hi} outside 0 <= lower <= upper <= 100",
                    i, sieve_sizes[i]
                )));
            }
        }

        Ok(Self {
            name: name.into(),
            sieve_sizes,
            lower_limits,
            upper_limits,
        })
    }

    pub fn len(&self) -> usize {
        self.sieve_sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sieve_sizes.is_empty()
    }

    pub fn sieve_sizes(&self) -> &[Sieve] {
        &self.sieve_sizes
    }

    pub fn lower_limits(&self) -> &[f64] {
        &self.lower_limits
    }

    pub fn upper_limits(&self) -> &[f64] {
        &self.upper_limits
    }

    /// Curve halfway between the limits, shown when a material is opened.
    pub fn midpoint_curve(&self) -> Vec<f64> {
        self.lower_limits
            .iter()
            .zip(&self.upper_limits)
            .map(|(lo, hi)| (lo + hi) / 2.0)
            .collect()
    }

    /// Whether the limits and sieves match another spec, ignoring the name.
    pub fn same_limits(&self, other: &MaterialSpec) -> bool {
        self.sieve_sizes == other.sieve_sizes
            && self.lower_limits == other.lower_limits
            && self.upper_limits == other.upper_limits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_tables_satisfy_invariants() {
        for kind in MaterialKind::ALL {
            let spec = kind.spec();
            let checked = MaterialSpec::new(
                spec.name.clone(),
                spec.sieve_sizes().to_vec(),
                spec.lower_limits().to_vec(),
                spec.upper_limits().to_vec(),
            )
            .unwrap_or_else(|e| panic!("{kind}: {e}"));
            assert_eq!(checked, spec);
            assert_eq!(spec.sieve_sizes().last(), Some(&Sieve::Pan));
            assert_eq!(spec.lower_limits().last(), Some(&0.0));
            assert_eq!(spec.upper_limits().last(), Some(&0.0));
        }
    }

    #[test]
    fn keys_round_trip() {
        for kind in MaterialKind::ALL {
            assert_eq!(MaterialKind::from_key(kind.key()), Some(kind));
        }
        assert_eq!(MaterialKind::from_key("coarse2"), None);
    }

    #[test]
    fn sieve_counts_match_material() {
        assert_eq!(MaterialKind::Fine.spec().len(), 8);
        assert_eq!(MaterialKind::Coarse.spec().len(), 5);
        assert_eq!(MaterialKind::SubBase.spec().len(), 9);
        assert_eq!(MaterialKind::Crm.spec().len(), 6);
    }

    #[test]
    fn rejects_crossed_limits() {
        let err = MaterialSpec::new(
            "bad",
            vec![Sieve::Mesh(4.75), Sieve::Pan],
            vec![100.0, 10.0],
            vec![100.0, 5.0],
        )
        .unwrap_err();
        assert!(matches!(err, GradationError::InvalidSpec(_)));
    }

    #[test]
    fn rejects_short_or_ragged_specs() {
        assert!(MaterialSpec::new("one", vec![Sieve::Pan], vec![0.0], vec![0.0]).is_err());
        assert!(matches!(
            MaterialSpec::new(
                "ragged",
                vec![Sieve::Mesh(1.0), Sieve::Pan],
                vec![0.0],
                vec![100.0, 0.0],
            ),
            Err(GradationError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn midpoint_of_fine_aggregate() {
        let mid = MaterialKind::Fine.spec().midpoint_curve();
        assert_eq!(mid, vec![100.0, 95.0, 87.5, 72.5, 47.0, 19.0, 5.0, 0.0]);
    }

    #[test]
    fn sieve_parses_and_displays() {
        assert_eq!("PAN".parse::<Sieve>().unwrap(), Sieve::Pan);
        assert_eq!(" 4.75 ".parse::<Sieve>().unwrap(), Sieve::Mesh(4.75));
        assert!("mesh".parse::<Sieve>().is_err());
        assert_eq!(Sieve::Mesh(0.075).to_string(), "0.075");
        assert_eq!(Sieve::Mesh(10.0).to_string(), "10");
    }
}
