//! Shared domain types.
//!
//! These types are kept lightweight and serializable so they can be:
//!
//! - used in-memory during aggregation
//! - persisted to the factor table
//! - exported to JSON after a run

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Assumed mass of a standard meal, in kilograms.
///
/// Agribalyse reports impacts per kilogram of product; the factor table stores
/// kilograms of CO2e per meal.
pub const MEAL_WEIGHT_KG: f64 = 0.45;

/// Rows whose product name contains this phrase never count towards any category.
pub const DISQUALIFIER: &str = "aliment pour bétail";

/// Meal category tracked in the factor table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Beef,
    Pork,
    PoultryFish,
    Vegetarian,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Beef,
        Category::Pork,
        Category::PoultryFish,
        Category::Vegetarian,
    ];

    /// Upsert key in the factor table.
    pub fn code(self) -> &'static str {
        match self {
            Category::Beef => "beef",
            Category::Pork => "pork",
            Category::PoultryFish => "poultry_fish",
            Category::Vegetarian => "vegetarian",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// Label written when a record is created by the job.
    ///
    /// Existing labels are never overwritten, so this only matters the first
    /// time a category receives data.
    pub fn default_label(self) -> String {
        format!("{} (Auto)", capitalize(self.code()))
    }

    pub fn def(self) -> &'static CategoryDef {
        // `CATEGORIES` is declared in `ALL` order.
        &CATEGORIES[self as usize]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Keyword rule for one category.
#[derive(Debug)]
pub struct CategoryDef {
    pub category: Category,
    /// Lower-case substrings; any one of them is enough for a match.
    pub keywords: &'static [&'static str],
    pub disqualifier: &'static str,
}

impl CategoryDef {
    /// `name` must already be lower-cased.
    pub fn matches(&self, name: &str) -> bool {
        self.keywords.iter().any(|k| name.contains(k)) && !name.contains(self.disqualifier)
    }
}

pub static CATEGORIES: [CategoryDef; 4] = [
    CategoryDef {
        category: Category::Beef,
        keywords: &["bœuf", "boeuf", "veau", "steack", "rôti", "bourguignon"],
        disqualifier: DISQUALIFIER,
    },
    CategoryDef {
        category: Category::Pork,
        keywords: &["porc", "côte", "filet mignon", "jambon"],
        disqualifier: DISQUALIFIER,
    },
    CategoryDef {
        category: Category::PoultryFish,
        keywords: &["poulet", "dinde", "poisson", "saumon", "cabillaud"],
        disqualifier: DISQUALIFIER,
    },
    CategoryDef {
        category: Category::Vegetarian,
        keywords: &["végétarien", "soja", "tofu", "galette végétale"],
        disqualifier: DISQUALIFIER,
    },
];

/// Canonical `(name, co2)` pair produced by row normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    /// Lower-cased product name.
    pub product_name: String,
    /// kg CO2e per kg of product; always finite and > 0.
    pub co2_per_kg: f64,
}

/// One row of the factor table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionFactor {
    pub code: String,
    pub label: String,
    pub kg_co2_per_meal: f64,
    pub source: String,
}

/// Which dataset source(s) an update may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceSelection {
    /// Local file first, remote API if the file is unusable.
    Auto,
    Local,
    Remote,
}

/// Resolved settings for one `update` run.
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub db_path: PathBuf,
    pub local_csv: PathBuf,
    pub remote_url: String,
    pub timeout: Duration,
    pub source: SourceSelection,
    pub dry_run: bool,
    pub export: Option<PathBuf>,
}

/// Convert a per-kilogram mean into the stored per-meal figure.
pub fn per_meal(mean_per_kg: f64) -> f64 {
    round3(mean_per_kg * MEAL_WEIGHT_KG)
}

/// Round the exact binary value to 3 decimals. Scaling by 1000 first would
/// round twice: `0.1845` is stored as `0.18449999..` but `0.1845 * 1000.0` is `184.5`.
fn round3(v: f64) -> f64 {
    format!("{v:.3}").parse().unwrap_or(v)
}

/// Upper-case the first character and lower-case the rest (`poultry_fish` -> `Poultry_fish`).
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_table_is_in_all_order() {
        for cat in Category::ALL {
            assert_eq!(cat.def().category, cat);
        }
    }

    #[test]
    fn default_labels_capitalize_code() {
        assert_eq!(Category::Beef.default_label(), "Beef (Auto)");
        assert_eq!(Category::PoultryFish.default_label(), "Poultry_fish (Auto)");
    }

    #[test]
    fn code_round_trips() {
        for cat in Category::ALL {
            assert_eq!(Category::from_code(cat.code()), Some(cat));
        }
        assert_eq!(Category::from_code("lamb"), None);
    }

    #[test]
    fn disqualifier_overrides_keyword() {
        let beef = Category::Beef.def();
        assert!(beef.matches("steak de bœuf"));
        assert!(!beef.matches("aliment pour bétail, bœuf"));
        assert!(!beef.matches("carotte râpée"));
    }

    #[test]
    fn steak_alone_is_not_beef() {
        let beef = Category::Beef.def();
        assert!(!beef.matches("steak de soja"));
        assert!(!beef.matches("steak de thon"));
        assert!(beef.matches("steack haché"));
        assert!(Category::Vegetarian.def().matches("steak de soja"));
    }

    #[test]
    fn per_meal_rounds_to_three_decimals() {
        assert_eq!(per_meal(10.0), 4.5);
        assert_eq!(per_meal(3.333), 1.5);
        assert_eq!(per_meal(0.001), 0.0);
    }

    #[test]
    fn per_meal_rounds_the_stored_binary_value() {
        // 0.41 * 0.45 and 0.03 * 0.45 land just below the decimal midpoint.
        assert_eq!(per_meal(0.41), 0.184);
        assert_eq!(per_meal(0.03), 0.013);
    }
}
