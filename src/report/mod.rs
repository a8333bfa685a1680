//! Reporting: formatted terminal output.
//!
//! Formatting lives here so the job code only produces data (`JobReport`,
//! `EmissionFactor`) and output changes stay localized.

pub mod format;

pub use format::*;
