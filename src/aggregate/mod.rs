//! Category classification and per-category averaging.
//!
//! Keyword sets overlap on purpose ("rôti de porc" is both beef-like and pork),
//! so a row is folded into every category it matches.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{CATEGORIES, Category, SourceRow, per_meal};

/// Running `(sum, count)` for one category.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Accumulator {
    pub sum: f64,
    pub count: usize,
}

impl Accumulator {
    pub fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// Categories whose keyword rule matches `name` (already lower-cased).
pub fn classify(name: &str) -> impl Iterator<Item = Category> + '_ {
    CATEGORIES.iter().filter(move |def| def.matches(name)).map(|def| def.category)
}

/// Per-category accumulators for a single run.
#[derive(Debug, Clone)]
pub struct Aggregation {
    accumulators: BTreeMap<Category, Accumulator>,
}

impl Default for Aggregation {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregation {
    pub fn new() -> Self {
        Self {
            accumulators: Category::ALL.into_iter().map(|c| (c, Accumulator::default())).collect(),
        }
    }

    /// Fold a row into every matching category. Returns how many matched.
    pub fn fold(&mut self, row: &SourceRow) -> usize {
        let mut matched = 0;
        for category in classify(&row.product_name) {
            self.accumulators.entry(category).or_default().add(row.co2_per_kg);
            matched += 1;
        }
        matched
    }

    pub fn accumulator(&self, category: Category) -> Accumulator {
        self.accumulators.get(&category).copied().unwrap_or_default()
    }

    /// Final per-category figures, in `Category::ALL` order.
    pub fn results(&self) -> Vec<CategoryResult> {
        Category::ALL
            .into_iter()
            .map(|category| {
                let acc = self.accumulator(category);
                let mean_per_kg = acc.mean();
                CategoryResult {
                    category,
                    matched: acc.count,
                    mean_per_kg,
                    kg_co2_per_meal: mean_per_kg.map(per_meal),
                }
            })
            .collect()
    }
}

/// Computed figures for one category after a full scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryResult {
    pub category: Category,
    pub matched: usize,
    pub mean_per_kg: Option<f64>,
    pub kg_co2_per_meal: Option<f64>,
}

/// Aggregate a full set of normalized rows.
pub fn aggregate<'a>(rows: impl IntoIterator<Item = &'a SourceRow>) -> Aggregation {
    let mut agg = Aggregation::new();
    for row in rows {
        agg.fold(row);
    }
    agg
}
