//! Folds subcontractor (外注先) rows into per-company labor rollups

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use tracing::warn;

use super::collation::compare_names;
use crate::types::{SubcontractorAggregate, WorkReport};

#[derive(Default)]
struct SubcontractorTally {
    total_worker_count: u64,
    dates: HashSet<NaiveDate>,
}

/// Per-request subcontractor aggregator
pub struct SubcontractorAggregator;

impl SubcontractorAggregator {
    /// Aggregate subcontractors, ordered by worker count descending then name
    pub fn aggregate(reports: &[WorkReport]) -> Vec<SubcontractorAggregate> {
        let mut tallies: HashMap<String, SubcontractorTally> = HashMap::new();

        for report in reports {
            for record in &report.subcontractor_records {
                let name = record.name.trim();
                if name.is_empty() {
                    warn!(date = %report.date, "skipping subcontractor record without a name");
                    continue;
                }
                let tally = tallies.entry(name.to_string()).or_default();
                tally.total_worker_count = tally
                    .total_worker_count
                    .saturating_add(u64::from(record.worker_count));
                tally.dates.insert(report.date);
            }
        }

        let mut rows: Vec<SubcontractorAggregate> = tallies
            .into_iter()
            .map(|(name, tally)| {
                let total_days = tally.dates.len() as u64;
                SubcontractorAggregate {
                    name,
                    total_worker_count: tally.total_worker_count,
                    total_days,
                    avg_worker_per_day: average_per_day(tally.total_worker_count, total_days),
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            b.total_worker_count
                .cmp(&a.total_worker_count)
                .then_with(|| compare_names(&a.name, &b.name))
        });
        rows
    }
}

/// `workers / days`, or zero when there are no days
pub fn average_per_day(total_worker_count: u64, total_days: u64) -> Decimal {
    if total_days == 0 {
        return Decimal::ZERO;
    }
    Decimal::from(total_worker_count) / Decimal::from(total_days)
}
