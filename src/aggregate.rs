//! Per-document aggregation of per-unit metrics.
//!
//! Crops of one image share a `parent_document_id`; their metrics are
//! averaged (unweighted) into one row per document.

use crate::metrics::PerUnitMetrics;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metrics of one scored unit together with its grouping key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitScore {
    pub unit_id: String,
    pub parent_document_id: String,
    pub metrics: PerUnitMetrics,
}

/// Mean metrics across all units of one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentAggregate {
    pub parent_document_id: String,
    /// Number of units averaged.
    pub unit_count: usize,
    pub metrics: PerUnitMetrics,
}

/// Ordered table of document aggregates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentTable {
    pub rows: Vec<DocumentAggregate>,
}

impl DocumentTable {
    /// Number of documents.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Find the aggregate of a document.
    pub fn get(&self, parent_document_id: &str) -> Option<&DocumentAggregate> {
        self.rows
            .iter()
            .find(|r| r.parent_document_id == parent_document_id)
    }

    /// Rows sorted by document id.
    pub fn sorted_by_document(&self) -> Vec<&DocumentAggregate> {
        let mut rows: Vec<&DocumentAggregate> = self.rows.iter().collect();
        rows.sort_by(|a, b| a.parent_document_id.cmp(&b.parent_document_id));
        rows
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    sums: [f64; 5],
    count: usize,
}

impl Accumulator {
    fn push(&mut self, metrics: &PerUnitMetrics) {
        for (sum, value) in self.sums.iter_mut().zip(metrics.values()) {
            *sum += value;
        }
        self.count += 1;
    }

    fn mean(&self) -> PerUnitMetrics {
        let n = self.count as f64;
        PerUnitMetrics::from_values(self.sums.map(|s| s / n))
    }
}

/// Group unit scores by parent document and average each metric.
///
/// Rows appear in order of each document's first unit.
pub fn aggregate_by_document(scores: &[UnitScore]) -> DocumentTable {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Accumulator> = HashMap::new();

    for score in scores {
        let key = score.parent_document_id.as_str();
        groups
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Accumulator::default()
            })
            .push(&score.metrics);
    }

    let rows = order
        .into_iter()
        .map(|key| {
            let acc = &groups[key];
            DocumentAggregate {
                parent_document_id: key.to_string(),
                unit_count: acc.count,
                metrics: acc.mean(),
            }
        })
        .collect();

    DocumentTable { rows }
}
