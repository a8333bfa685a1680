//! The update job: acquire -> parse -> aggregate -> persist.
//!
//! Kept apart from the CLI so the whole job can be driven from tests with an
//! in-memory store and a pre-built dataset.

use serde::Serialize;
use tracing::{info, warn};

use crate::aggregate::{CategoryResult, aggregate};
use crate::data::{self, Dataset, SourceKind};
use crate::domain::{Category, JobConfig};
use crate::error::AppError;
use crate::io::ingest::{IngestedRows, Rejection, parse_dataset};
use crate::store::{FactorStore, UpsertOutcome};

/// What happened to one category at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryAction {
    Created,
    Updated,
    /// Computed but not written (`--dry-run`).
    Computed,
    /// No matching rows; stored record left as it was.
    NoData,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryOutcome {
    #[serde(flatten)]
    pub result: CategoryResult,
    pub action: CategoryAction,
}

/// Everything a finished run reports.
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub source: SourceKind,
    pub source_label: String,
    pub fell_back: bool,
    pub rows_read: usize,
    pub rows_used: usize,
    pub rejected: Vec<(Rejection, usize)>,
    pub categories: Vec<CategoryOutcome>,
    pub dry_run: bool,
}

impl JobReport {
    pub fn outcome(&self, category: Category) -> Option<&CategoryOutcome> {
        self.categories.iter().find(|c| c.result.category == category)
    }

    /// Categories skipped for lack of data.
    pub fn warnings(&self) -> impl Iterator<Item = Category> + '_ {
        self.categories
            .iter()
            .filter(|c| c.action == CategoryAction::NoData)
            .map(|c| c.result.category)
    }
}

/// Run the full update against the configured database.
pub fn run_update(config: &JobConfig) -> Result<JobReport, AppError> {
    // Open the store first so a bad path fails before any download.
    let mut store = if config.dry_run {
        None
    } else {
        Some(FactorStore::open(&config.db_path)?)
    };

    let dataset = data::acquire(config).inspect_err(|_| {
        warn!("update aborted; no factors were modified");
    })?;

    run_update_with_dataset(&dataset, store.as_mut())
}

/// Parse, aggregate and (when `store` is given) persist an acquired dataset.
pub fn run_update_with_dataset(dataset: &Dataset, store: Option<&mut FactorStore>) -> Result<JobReport, AppError> {
    let kind = dataset.kind;
    let ingested = parse_dataset(&dataset.text, kind.delimiter(), kind.schema())?;
    info!(
        source = kind.label(),
        rows_read = ingested.rows_read,
        rows_used = ingested.rows_used(),
        rows_rejected = ingested.row_errors.len(),
        "parsed dataset"
    );

    let results = aggregate(&ingested.rows).results();

    let dry_run = store.is_none();
    let categories = match store {
        Some(store) => persist(store, kind.label(), &results)?,
        None => results
            .into_iter()
            .map(|result| {
                let action = if result.kg_co2_per_meal.is_some() {
                    CategoryAction::Computed
                } else {
                    warn!(category = %result.category, "no data found; nothing to write");
                    CategoryAction::NoData
                };
                CategoryOutcome { result, action }
            })
            .collect(),
    };

    Ok(build_report(dataset, &ingested, categories, dry_run))
}

fn build_report(
    dataset: &Dataset,
    ingested: &IngestedRows,
    categories: Vec<CategoryOutcome>,
    dry_run: bool,
) -> JobReport {
    JobReport {
        source: dataset.kind,
        source_label: dataset.kind.label().to_string(),
        fell_back: dataset.fell_back,
        rows_read: ingested.rows_read,
        rows_used: ingested.rows_used(),
        rejected: ingested.rejections().into_iter().collect(),
        categories,
        dry_run,
    }
}

/// Write every category that received data. Categories without matches are
/// logged and skipped.
pub fn persist(
    store: &mut FactorStore,
    source_label: &str,
    results: &[CategoryResult],
) -> Result<Vec<CategoryOutcome>, AppError> {
    let mut out = Vec::with_capacity(results.len());

    for result in results {
        let category = result.category;
        let Some(value) = result.kg_co2_per_meal else {
            warn!(category = %category, "no data found; stored factor left unchanged");
            out.push(CategoryOutcome {
                result: result.clone(),
                action: CategoryAction::NoData,
            });
            continue;
        };

        let source = provenance(source_label, result.matched);
        let outcome = store.upsert(category.code(), &category.default_label(), value, &source)?;
        info!(
            outcome = "updated",
            category = %category,
            kg_co2_per_meal = value,
            matched = result.matched,
            "updated {category}: {value:.3} kgCO2e/repas (based on {} items)",
            result.matched
        );

        out.push(CategoryOutcome {
            result: result.clone(),
            action: match outcome {
                UpsertOutcome::Created => CategoryAction::Created,
                UpsertOutcome::Updated => CategoryAction::Updated,
            },
        });
    }

    Ok(out)
}

/// `"<source label> (<N> produits)"`.
pub fn provenance(source_label: &str, matched: usize) -> String {
    format!("{source_label} ({matched} produits)")
}
