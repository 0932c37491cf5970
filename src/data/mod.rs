//! Data layer: imported gradation tables, loading, and export.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader  │  parse file → GradationSheet
//!   └──────────┘
//!        │
//!        ▼
//!   ┌────────────────┐
//!   │ GradationSheet │  sieves, passing / retained, optional limits
//!   └────────────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  export  │  clipboard text, CSV / JSON / Parquet tables
//!   └──────────┘
//! ```

pub mod export;
pub mod loader;
pub mod model;
