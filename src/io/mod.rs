//! Input/output helpers.
//!
//! - CSV ingest + row normalization (`ingest`)
//! - run report export (JSON) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
