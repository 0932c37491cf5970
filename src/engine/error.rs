use thiserror::Error;

/// Errors raised by the gradation core.
///
/// Degenerate numeric input (an all-zero sample, a zero retained sum) is
/// never an error: those cases return `0.0` or the input unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GradationError {
    /// Two sequences that must line up sieve-for-sieve do not.
    #[error("{what}: expected {expected} values, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A user-entered value could not be read as a number.
    #[error("'{input}' is not a valid number")]
    InvalidNumericInput { input: String },

    /// Total sample weight must be strictly positive and finite.
    #[error("total weight must be positive, got {0}")]
    NonPositiveWeight(f64),

    /// Limits violate `0 <= lower <= upper <= 100` or have fewer than two sieves.
    #[error("invalid material specification: {0}")]
    InvalidSpec(String),

    /// An imported value lies outside its column's physical range.
    #[error("{what}, row {row}: {value} is out of range")]
    ValueOutOfRange {
        what: &'static str,
        row: usize,
        value: f64,
    },

    #[error("sieve index {index} out of range (curve has {len} points)")]
    IndexOutOfRange { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, GradationError>;

/// Fail with [`GradationError::ShapeMismatch`] unless `actual == expected`.
pub(crate) fn ensure_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(GradationError::ShapeMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Parse a user-entered number, trimming surrounding whitespace.
pub fn parse_number(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(GradationError::InvalidNumericInput {
            input: trimmed.to_string(),
        }),
    }
}

/// Parse a user-entered total weight, which must be strictly positive.
pub fn parse_total_weight(input: &str) -> Result<f64> {
    let weight = parse_number(input)?;
    if weight > 0.0 {
        Ok(weight)
    } else {
        Err(GradationError::NonPositiveWeight(weight))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_number_accepts_padded_input() {
        assert_eq!(parse_number("  2500.5 ").unwrap(), 2500.5);
    }

    #[test]
    fn parse_number_rejects_text_and_nan() {
        assert!(matches!(
            parse_number("abc"),
            Err(GradationError::InvalidNumericInput { .. })
        ));
        assert!(parse_number("NaN").is_err());
        assert!(parse_number("").is_err());
    }

    #[test]
    fn total_weight_must_be_positive() {
        assert_eq!(parse_total_weight(" 2000 "), Ok(2000.0));
        assert_eq!(parse_total_weight("-5"), Err(GradationError::NonPositiveWeight(-5.0)));
        assert_eq!(parse_total_weight("0"), Err(GradationError::NonPositiveWeight(0.0)));
        assert!(matches!(
            parse_total_weight("5 kg"),
            Err(GradationError::InvalidNumericInput { .. })
        ));
    }

    #[test]
    fn shape_mismatch_message_names_both_lengths() {
        let err = ensure_len("upper limits", 8, 7).unwrap_err();
        assert_eq!(err.to_string(), "upper limits: expected 8 values, got 7");
    }
}
