//! Domain types used throughout the update job.
//!
//! This module defines:
//!
//! - meal categories and their keyword rules (`Category`, `CATEGORIES`)
//! - normalized dataset rows (`SourceRow`)
//! - the persisted factor record (`EmissionFactor`)
//! - run configuration (`JobConfig`, `SourceSelection`)

pub mod types;

pub use types::*;
