//! Aggregate gradation analysis.
//!
//! [`engine`] holds the numeric core, [`data`] reads and writes gradation
//! tables, and [`settings`] persists user preferences between sessions.

pub mod data;
pub mod engine;
pub mod settings;
