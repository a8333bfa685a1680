//! `food-factors` library crate.
//!
//! The binary (`food-factors`) is a thin wrapper around this library so that:
//!
//! - the update job is testable without spawning processes or touching the network
//! - the factor table can be read by other tools through `store`

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod report;
pub mod store;
