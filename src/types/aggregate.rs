//! Aggregate types produced by the monthly aggregation engine

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::Project;

/// Label used for synthetic totals rows
pub const TOTAL_ROW_LABEL: &str = "合計";

/// Resolved reporting period
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Display label, e.g. "2024年3月"
    pub label: String,
}

/// Man-hours (工数) of one worker over the period
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaborAggregate {
    pub name: String,
    pub weekday_normal: Decimal,
    pub weekday_overtime: Decimal,
    /// Subset of `weekday_overtime`, not additive
    pub weekday_late_night: Decimal,
    pub sunday_normal: Decimal,
    pub sunday_overtime: Decimal,
    /// Subset of `sunday_overtime`, not additive
    pub sunday_late_night: Decimal,
    pub weekday_subtotal: Decimal,
    pub sunday_subtotal: Decimal,
    pub total: Decimal,
    pub travel_time: Decimal,
}

impl LaborAggregate {
    /// Recompute subtotals and total from the hour buckets
    pub fn recompute_subtotals(&mut self) {
        self.weekday_subtotal = self.weekday_normal + self.weekday_overtime;
        self.sunday_subtotal = self.sunday_normal + self.sunday_overtime;
        self.total = self.weekday_subtotal + self.sunday_subtotal;
    }

    /// Synthetic totals row summed over `rows`
    pub fn total_row(rows: &[LaborAggregate]) -> LaborAggregate {
        let mut sum = LaborAggregate {
            name: TOTAL_ROW_LABEL.to_string(),
            ..Default::default()
        };
        for row in rows {
            sum.weekday_normal += row.weekday_normal;
            sum.weekday_overtime += row.weekday_overtime;
            sum.weekday_late_night += row.weekday_late_night;
            sum.sunday_normal += row.sunday_normal;
            sum.sunday_overtime += row.sunday_overtime;
            sum.sunday_late_night += row.sunday_late_night;
            sum.travel_time += row.travel_time;
        }
        sum.recompute_subtotals();
        sum
    }
}

/// Usage and cost of one material over the period
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialAggregate {
    pub name: String,
    /// First-seen volume, carried for display only
    pub volume: Option<Decimal>,
    /// First-seen unit, carried for display only
    pub volume_unit: String,
    /// First-seen unit price, carried for display only
    pub unit_price: Decimal,
    pub total_quantity: Decimal,
    pub total_amount: Decimal,
    pub usage_count: u64,
    pub avg_unit_price: Decimal,
    pub distinct_project_count: usize,
    /// Every distinct unit seen under this name, sorted
    pub volume_units: Vec<String>,
}

/// Labor supplied by one subcontractor over the period
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcontractorAggregate {
    pub name: String,
    pub total_worker_count: u64,
    /// Distinct report dates the subcontractor appears on
    pub total_days: u64,
    pub avg_worker_per_day: Decimal,
}

/// Worker row that contributed no hours
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub date: NaiveDate,
    pub worker: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationTotals {
    pub labor_hours: Decimal,
    pub material_amount: Decimal,
    pub subcontractor_count: u64,
}

impl AggregationTotals {
    pub fn from_rows(
        labor: &[LaborAggregate],
        materials: &[MaterialAggregate],
        subcontractors: &[SubcontractorAggregate],
    ) -> Self {
        Self {
            labor_hours: labor.iter().map(|l| l.total).sum(),
            material_amount: materials.iter().map(|m| m.total_amount).sum(),
            subcontractor_count: subcontractors
                .iter()
                .map(|s| s.total_worker_count)
                .fold(0u64, |acc, n| acc.saturating_add(n)),
        }
    }
}

/// Full response of one aggregation request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResult {
    pub period: Period,
    /// Number of reports in the filtered set
    pub report_count: usize,
    pub labor: Vec<LaborAggregate>,
    pub materials: Vec<MaterialAggregate>,
    pub subcontractors: Vec<SubcontractorAggregate>,
    /// Active projects for the filter dropdown
    pub projects: Vec<Project>,
    pub totals: AggregationTotals,
    pub skipped: Vec<SkippedRecord>,
}
