//! Gradation core: limits, curves, retained weights and fineness modulus.
//!
//! Architecture:
//! ```text
//!   MaterialKind ──► MaterialSpec (sieves, lower, upper)
//!        │
//!        ├──► RandomCurveGenerator ──┐
//!        │        (uses clamp)       │
//!        └──► user edits ── clamp ───┤
//!                                    ▼
//!                             passing curve
//!                                    │
//!   TotalWeightManager ──► GradationEngine::passing_to_retained
//!                                    │
//!                                    ▼
//!                            retained weights ──► FmCalculator
//! ```
//!
//! Everything here is synchronous and allocation-light; curves have at most
//! a dozen points.

pub mod clamp;
pub mod error;
pub mod fm;
pub mod gradation;
pub mod material;
pub mod random;
pub mod weight;

pub use clamp::{clamp, clamp_one};
pub use error::{parse_number, parse_total_weight, GradationError};
pub use fm::{FmCalculator, FmMode};
pub use gradation::GradationEngine;
pub use material::{MaterialKind, MaterialSpec, Sieve};
pub use random::{RandomCurveGenerator, SmoothingVariant};
pub use weight::{TotalWeightManager, DEFAULT_TOTAL_WEIGHT};
