//! Folds material usage rows into per-material cost rollups
//!
//! Rows are grouped strictly by name. Volume, unit and unit price vary per
//! entry, so the first value seen for a name is carried as its representative
//! for display, and every distinct unit is listed alongside it.

use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::warn;

use super::collation::compare_names;
use crate::types::{MaterialAggregate, MaterialRecord, WorkReport};

struct MaterialTally {
    volume: Option<Decimal>,
    volume_unit: String,
    unit_price: Decimal,
    total_quantity: Decimal,
    total_amount: Decimal,
    usage_count: u64,
    projects: HashSet<String>,
    volume_units: BTreeSet<String>,
}

impl MaterialTally {
    fn new(record: &MaterialRecord) -> Self {
        Self {
            volume: record.volume,
            volume_unit: record.volume_unit.clone(),
            unit_price: record.unit_price,
            total_quantity: Decimal::ZERO,
            total_amount: Decimal::ZERO,
            usage_count: 0,
            projects: HashSet::new(),
            volume_units: BTreeSet::new(),
        }
    }

    fn add(&mut self, record: &MaterialRecord, project_ref_id: Option<&str>) {
        self.total_quantity += record.quantity;
        self.total_amount += record.amount();
        self.usage_count = self.usage_count.saturating_add(1);
        if let Some(id) = project_ref_id {
            self.projects.insert(id.to_string());
        }
        let unit = record.volume_unit.trim();
        if !unit.is_empty() {
            self.volume_units.insert(unit.to_string());
        }
    }

    fn into_aggregate(self, name: String) -> MaterialAggregate {
        MaterialAggregate {
            name,
            volume: self.volume,
            volume_unit: self.volume_unit,
            unit_price: self.unit_price,
            avg_unit_price: average_unit_price(self.total_amount, self.total_quantity),
            total_quantity: self.total_quantity,
            total_amount: self.total_amount,
            usage_count: self.usage_count,
            distinct_project_count: self.projects.len(),
            volume_units: self.volume_units.into_iter().collect(),
        }
    }
}

/// `amount / quantity`, or zero when nothing was used
pub fn average_unit_price(total_amount: Decimal, total_quantity: Decimal) -> Decimal {
    if total_quantity.is_zero() {
        return Decimal::ZERO;
    }
    total_amount
        .checked_div(total_quantity)
        .unwrap_or(Decimal::ZERO)
}

/// Per-request material aggregator
pub struct MaterialAggregator;

impl MaterialAggregator {
    /// Aggregate materials, ordered by total amount descending then name
    pub fn aggregate(reports: &[WorkReport]) -> Vec<MaterialAggregate> {
        let mut tallies: HashMap<String, MaterialTally> = HashMap::new();

        for report in reports {
            for record in &report.material_records {
                let name = record.name.trim();
                if name.is_empty() {
                    warn!(date = %report.date, "skipping material record without a name");
                    continue;
                }
                let tally = tallies
                    .entry(name.to_string())
                    .or_insert_with(|| MaterialTally::new(record));
                tally.add(record, report.project_ref_id.as_deref());
            }
        }

        let mut rows: Vec<MaterialAggregate> = tallies
            .into_iter()
            .map(|(name, tally)| tally.into_aggregate(name))
            .collect();
        rows.sort_by(compare_by_amount);
        rows
    }

    /// The `n` materials with the highest total amount
    pub fn top(rows: &[MaterialAggregate], n: usize) -> Vec<MaterialAggregate> {
        let mut sorted = rows.to_vec();
        sorted.sort_by(compare_by_amount);
        sorted.truncate(n);
        sorted
    }
}

fn compare_by_amount(a: &MaterialAggregate, b: &MaterialAggregate) -> Ordering {
    b.total_amount
        .cmp(&a.total_amount)
        .then_with(|| compare_names(&a.name, &b.name))
}
