//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - runs the update job or one of the table commands
//! - prints reports and writes optional exports

use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, LabelArgs, UpdateArgs};
use crate::domain::JobConfig;
use crate::error::AppError;
use crate::store::FactorStore;

pub mod pipeline;

/// Install the `tracing` subscriber. `RUST_LOG` overrides the default `info`.
///
/// Logs go to stderr so stdout only carries reports.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Entry point for the `food-factors` binary.
pub fn run() -> Result<(), AppError> {
    // Environment defaults for clap (`FOOD_FACTORS_*`) may live in `.env`.
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Update(args) => handle_update(job_config_from_args(cli.db, &args)),
        Command::List => handle_list(&FactorStore::open(&cli.db)?),
        Command::Label(args) => handle_label(&FactorStore::open(&cli.db)?, &args),
        Command::Status => handle_status(&FactorStore::open(&cli.db)?),
    }
}

fn handle_update(config: JobConfig) -> Result<(), AppError> {
    info!(db = %config.db_path.display(), source = ?config.source, "starting update");
    let report = pipeline::run_update(&config)?;

    println!("{}", crate::report::format_run_summary(&report));

    if let Some(path) = &config.export {
        crate::io::export::write_report_json(path, &report)?;
        info!(path = %path.display(), "wrote report");
    }

    info!(outcome = "done", "update complete");
    Ok(())
}

fn handle_list(store: &FactorStore) -> Result<(), AppError> {
    let factors = store.list()?;
    println!("{}", crate::report::format_factor_table(&factors));
    Ok(())
}

fn handle_label(store: &FactorStore, args: &LabelArgs) -> Result<(), AppError> {
    if !store.set_label(&args.code, &args.label)? {
        return Err(AppError::not_found(format!(
            "No emission factor with code '{}'.",
            args.code
        )));
    }
    info!(code = %args.code, label = %args.label, "label updated");
    Ok(())
}

fn handle_status(store: &FactorStore) -> Result<(), AppError> {
    println!("Emission factors stored: {}", store.count()?);
    Ok(())
}

pub fn job_config_from_args(db_path: std::path::PathBuf, args: &UpdateArgs) -> JobConfig {
    JobConfig {
        db_path,
        local_csv: args.local_file.clone(),
        remote_url: args.url.clone(),
        timeout: Duration::from_secs(args.timeout_secs),
        source: args.source,
        dry_run: args.dry_run,
        export: args.export.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;

    #[test]
    fn init_logging_installs_the_global_subscriber() {
        init_logging();
        assert!(tracing::dispatcher::has_been_set());
    }

    #[test]
    fn update_args_become_job_config() {
        let cli = Cli::try_parse_from([
            "food-factors",
            "update",
            "--source",
            "remote",
            "--timeout-secs",
            "7",
            "--dry-run",
        ])
        .unwrap();
        let Command::Update(args) = cli.command else {
            panic!("expected update");
        };
        let config = job_config_from_args(cli.db.clone(), &args);
        assert_eq!(config.db_path, cli.db);
        assert_eq!(config.timeout, Duration::from_secs(7));
        assert!(config.dry_run);
        assert!(config.export.is_none());
    }
}
