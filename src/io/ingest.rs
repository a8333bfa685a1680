//! CSV ingest and normalization.
//!
//! This module turns a delimited dataset whose column names differ between
//! sources into a clean list of `(product_name, co2_per_kg)` rows.
//!
//! Design goals:
//! - **Declarative schemas**: each source lists candidate column names in
//!   priority order (`SourceSchema`), no string lookups scattered in the parser
//! - **Row-level validation**: bad rows are skipped and counted, never fatal
//! - **Locale tolerance**: French exports use a decimal comma

use std::collections::BTreeMap;

use csv::StringRecord;
use serde::Serialize;
use tracing::debug;

use crate::domain::SourceRow;
use crate::error::AppError;

/// Ordered candidate column names for each logical field of a source.
#[derive(Debug, Clone, Copy)]
pub struct SourceSchema {
    pub name_columns: &'static [&'static str],
    pub co2_columns: &'static [&'static str],
}

/// Why a row was left out of aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// The record itself could not be read.
    Malformed,
    /// None of the CO2 candidate columns exist in the header.
    MissingCo2Column,
    EmptyValue,
    Unparseable,
    /// Zero or negative impact.
    NonPositive,
}

/// A row-level rejection encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub reason: Rejection,
    pub message: String,
}

/// Ingest output: normalized rows + row errors.
#[derive(Debug, Clone, Default)]
pub struct IngestedRows {
    pub rows: Vec<SourceRow>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl IngestedRows {
    pub fn rows_used(&self) -> usize {
        self.rows.len()
    }

    /// Rejected row counts grouped by reason.
    pub fn rejections(&self) -> BTreeMap<Rejection, usize> {
        let mut out = BTreeMap::new();
        for e in &self.row_errors {
            *out.entry(e.reason).or_insert(0) += 1;
        }
        out
    }
}

/// Header indices of every candidate column that is actually present, in
/// schema priority order.
#[derive(Debug, Clone, Default)]
struct ResolvedColumns {
    name: Vec<usize>,
    co2: Vec<usize>,
}

/// Parse and normalize a whole dataset.
///
/// `text` must start at the header row (any preamble already stripped).
pub fn parse_dataset(text: &str, delimiter: u8, schema: &SourceSchema) -> Result<IngestedRows, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::usage(format!("Failed to read dataset header row: {e}")))?
        .clone();

    let columns = resolve_columns(&headers, schema);
    debug!(
        name_columns = columns.name.len(),
        co2_columns = columns.co2.len(),
        "resolved dataset columns"
    );

    let mut out = IngestedRows::default();

    for (idx, result) in reader.records().enumerate() {
        // records() starts on the line after the header; lines are 1-based.
        let line = idx + 2;
        out.rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                out.row_errors.push(RowError {
                    line,
                    reason: Rejection::Malformed,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match normalize_record(&record, &columns) {
            Ok(row) => out.rows.push(row),
            Err((reason, message)) => out.row_errors.push(RowError { line, reason, message }),
        }
    }

    Ok(out)
}

fn resolve_columns(headers: &StringRecord, schema: &SourceSchema) -> ResolvedColumns {
    let normalized: Vec<String> = headers.iter().map(normalize_header_name).collect();
    let lookup = |candidates: &[&str]| -> Vec<usize> {
        candidates
            .iter()
            .filter_map(|c| {
                let wanted = normalize_header_name(c);
                normalized.iter().position(|h| *h == wanted)
            })
            .collect()
    };

    ResolvedColumns {
        name: lookup(schema.name_columns),
        co2: lookup(schema.co2_columns),
    }
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_lowercase()
}

fn normalize_record(record: &StringRecord, columns: &ResolvedColumns) -> Result<SourceRow, (Rejection, String)> {
    if columns.co2.is_empty() {
        return Err((Rejection::MissingCo2Column, "No CO2 impact column in header.".to_string()));
    }

    let raw = first_value(record, &columns.co2)
        .ok_or_else(|| (Rejection::EmptyValue, "Missing CO2 impact value.".to_string()))?;
    let co2_per_kg = parse_co2(raw)?;

    let product_name = first_value(record, &columns.name)
        .map(str::to_lowercase)
        .unwrap_or_default();

    Ok(SourceRow {
        product_name,
        co2_per_kg,
    })
}

/// First non-empty value among `indices`, in order.
fn first_value<'a>(record: &'a StringRecord, indices: &[usize]) -> Option<&'a str> {
    indices
        .iter()
        .filter_map(|&i| record.get(i))
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// Parse a CO2 impact, accepting a decimal comma.
///
/// Only finite, strictly positive values are accepted.
pub fn parse_co2(raw: &str) -> Result<f64, (Rejection, String)> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err((Rejection::EmptyValue, "Missing CO2 impact value.".to_string()));
    }

    let v = raw
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| (Rejection::Unparseable, format!("Invalid CO2 impact '{raw}'.")))?;

    if !v.is_finite() {
        return Err((Rejection::Unparseable, format!("Non-finite CO2 impact '{raw}'.")));
    }
    if v <= 0.0 {
        return Err((Rejection::NonPositive, format!("Non-positive CO2 impact '{raw}'.")));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: SourceSchema = SourceSchema {
        name_columns: &["Nom du Produit en Français", "nom_francais"],
        co2_columns: &["Changement climatique", "co2"],
    };

    #[test]
    fn parse_co2_accepts_decimal_comma() {
        assert_eq!(parse_co2("8,0").unwrap(), 8.0);
        assert_eq!(parse_co2(" 12.5 ").unwrap(), 12.5);
    }

    #[test]
    fn parse_co2_rejects_non_positive_and_garbage() {
        assert_eq!(parse_co2("0").unwrap_err().0, Rejection::NonPositive);
        assert_eq!(parse_co2("-1,2").unwrap_err().0, Rejection::NonPositive);
        assert_eq!(parse_co2("n/a").unwrap_err().0, Rejection::Unparseable);
        assert_eq!(parse_co2("NaN").unwrap_err().0, Rejection::Unparseable);
        assert_eq!(parse_co2("").unwrap_err().0, Rejection::EmptyValue);
    }

    #[test]
    fn resolves_columns_case_insensitively_and_strips_bom() {
        let text = "\u{feff}NOM DU PRODUIT EN FRANÇAIS;changement climatique\nSteak de Bœuf;12,0\n";
        let out = parse_dataset(text, b';', &SCHEMA).unwrap();
        assert_eq!(
            out.rows,
            vec![SourceRow {
                product_name: "steak de bœuf".to_string(),
                co2_per_kg: 12.0,
            }]
        );
    }

    #[test]
    fn falls_back_to_later_candidate_column() {
        let text = "nom_francais,co2\nTofu nature,\"2,1\"\n";
        let out = parse_dataset(text, b',', &SCHEMA).unwrap();
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].product_name, "tofu nature");
        assert!((out.rows[0].co2_per_kg - 2.1).abs() < 1e-12);
    }

    #[test]
    fn empty_preferred_column_uses_next_candidate_value() {
        let text = "Changement climatique,co2,nom_francais\n,3.5,Jambon cuit\n";
        let out = parse_dataset(text, b',', &SCHEMA).unwrap();
        assert_eq!(out.rows[0].co2_per_kg, 3.5);
    }

    #[test]
    fn rejected_rows_are_counted_by_reason() {
        let text = "nom_francais,co2\na,1\nb,0\nc,abc\nd,\ne,-3\n";
        let out = parse_dataset(text, b',', &SCHEMA).unwrap();
        assert_eq!(out.rows_read, 5);
        assert_eq!(out.rows_used(), 1);

        let counts = out.rejections();
        assert_eq!(counts.get(&Rejection::NonPositive), Some(&2));
        assert_eq!(counts.get(&Rejection::Unparseable), Some(&1));
        assert_eq!(counts.get(&Rejection::EmptyValue), Some(&1));
        assert_eq!(out.row_errors[0].line, 3);
    }

    #[test]
    fn missing_co2_column_rejects_every_row() {
        let text = "nom_francais,autre\nporc,3\n";
        let out = parse_dataset(text, b',', &SCHEMA).unwrap();
        assert!(out.rows.is_empty());
        assert_eq!(out.row_errors[0].reason, Rejection::MissingCo2Column);
    }

    #[test]
    fn missing_name_column_yields_empty_name() {
        let text = "co2\n4.0\n";
        let out = parse_dataset(text, b',', &SCHEMA).unwrap();
        assert_eq!(out.rows[0].product_name, "");
    }
}
