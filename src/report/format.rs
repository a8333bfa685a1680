//! Terminal formatting for run summaries and the stored factor table.

use crate::app::pipeline::{CategoryAction, JobReport};
use crate::domain::EmissionFactor;

/// Format the end-of-run summary.
pub fn format_run_summary(report: &JobReport) -> String {
    let mut out = String::new();

    out.push_str("=== food-factors - Agribalyse update ===\n");
    out.push_str(&format!("Source: {}", report.source_label));
    if report.fell_back {
        out.push_str(" (local file unavailable)");
    }
    out.push('\n');
    out.push_str(&format!(
        "Rows: read={} | used={} | rejected={}\n",
        report.rows_read,
        report.rows_used,
        report.rows_read - report.rows_used,
    ));
    for (reason, n) in &report.rejected {
        out.push_str(&format!("  - {reason:?}: {n}\n"));
    }

    out.push_str("\nCategories:\n");
    for c in &report.categories {
        let r = &c.result;
        let line = match (c.action, r.kg_co2_per_meal) {
            (CategoryAction::NoData, _) | (_, None) => format!("{:<14} no data found (unchanged)", r.category.code()),
            (action, Some(v)) => format!(
                "{:<14} {v:>7.3} kgCO2e/repas | n={:<4} | {}",
                r.category.code(),
                r.matched,
                action_label(action),
            ),
        };
        out.push_str("  ");
        out.push_str(&line);
        out.push('\n');
    }

    if report.dry_run {
        out.push_str("\nDry run: nothing was written.\n");
    }

    out
}

fn action_label(action: CategoryAction) -> &'static str {
    match action {
        CategoryAction::Created => "created",
        CategoryAction::Updated => "updated",
        CategoryAction::Computed => "not written",
        CategoryAction::NoData => "unchanged",
    }
}

/// Format stored factors as an aligned table.
pub fn format_factor_table(factors: &[EmissionFactor]) -> String {
    if factors.is_empty() {
        return "No emission factors stored.".to_string();
    }

    let code_w = factors.iter().map(|f| f.code.chars().count()).max().unwrap_or(0).max(4);
    let label_w = factors.iter().map(|f| f.label.chars().count()).max().unwrap_or(0).max(5);

    let mut out = format!(
        "{:<code_w$}  {:<label_w$}  {:>12}  {}\n",
        "code", "label", "kgCO2e/repas", "source"
    );
    for f in factors {
        out.push_str(&format!(
            "{:<code_w$}  {:<label_w$}  {:>12.3}  {}\n",
            f.code, f.label, f.kg_co2_per_meal, f.source
        ));
    }
    out
}
