//! Command-line parsing for the emission factor updater.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! job itself. Defaults can come from the environment (or a `.env` file).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::data::{DEFAULT_LOCAL_PATH, DEFAULT_TIMEOUT_SECS, DEFAULT_URL};
use crate::domain::SourceSelection;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "food-factors", version, about = "Meal emission factors from Agribalyse")]
pub struct Cli {
    /// SQLite database holding the factor table.
    #[arg(long, global = true, env = "FOOD_FACTORS_DB", default_value = "food_factors.sqlite3")]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Recompute meal factors from the Agribalyse dataset and store them.
    Update(UpdateArgs),
    /// Print the stored factors.
    List,
    /// Set the human-readable label of a stored factor.
    ///
    /// Later updates keep this label.
    Label(LabelArgs),
    /// Print how many factors are stored.
    Status,
}

#[derive(Debug, Args, Clone)]
pub struct UpdateArgs {
    /// Which source to read (auto = local file, then API).
    #[arg(long, value_enum, default_value_t = SourceSelection::Auto)]
    pub source: SourceSelection,

    /// Local Agribalyse export (Windows-1252, `;`-separated).
    #[arg(long, env = "FOOD_FACTORS_LOCAL_CSV", default_value = DEFAULT_LOCAL_PATH)]
    pub local_file: PathBuf,

    /// Agribalyse CSV endpoint.
    #[arg(long, env = "FOOD_FACTORS_URL", default_value = DEFAULT_URL)]
    pub url: String,

    /// Network timeout in seconds.
    #[arg(long, env = "FOOD_FACTORS_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Compute and print factors without writing them.
    #[arg(long)]
    pub dry_run: bool,

    /// Write the run report to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct LabelArgs {
    /// Category code (beef, pork, poultry_fish, vegetarian).
    pub code: String,

    /// New label.
    pub label: String,
}
