//! Plain-text tables for terminal output

use std::fmt::Write;

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use super::{format_amount, format_hours};
use crate::services::MaterialAggregator;
use crate::types::{
    AggregationResult, LaborAggregate, MaterialAggregate, SubcontractorAggregate, TOTAL_ROW_LABEL,
};

#[derive(Debug, Clone, Tabled)]
struct LaborRow {
    #[tabled(rename = "氏名")]
    name: String,
    #[tabled(rename = "平日通常")]
    weekday_normal: String,
    #[tabled(rename = "平日残業")]
    weekday_overtime: String,
    #[tabled(rename = "平日深夜")]
    weekday_late_night: String,
    #[tabled(rename = "平日小計")]
    weekday_subtotal: String,
    #[tabled(rename = "日曜通常")]
    sunday_normal: String,
    #[tabled(rename = "日曜残業")]
    sunday_overtime: String,
    #[tabled(rename = "日曜深夜")]
    sunday_late_night: String,
    #[tabled(rename = "日曜小計")]
    sunday_subtotal: String,
    #[tabled(rename = "合計")]
    total: String,
    #[tabled(rename = "移動")]
    travel_time: String,
}

impl From<&LaborAggregate> for LaborRow {
    fn from(row: &LaborAggregate) -> Self {
        Self {
            name: row.name.clone(),
            weekday_normal: format_hours(row.weekday_normal),
            weekday_overtime: format_hours(row.weekday_overtime),
            weekday_late_night: format_hours(row.weekday_late_night),
            weekday_subtotal: format_hours(row.weekday_subtotal),
            sunday_normal: format_hours(row.sunday_normal),
            sunday_overtime: format_hours(row.sunday_overtime),
            sunday_late_night: format_hours(row.sunday_late_night),
            sunday_subtotal: format_hours(row.sunday_subtotal),
            total: format_hours(row.total),
            travel_time: format_hours(row.travel_time),
        }
    }
}

#[derive(Debug, Clone, Tabled)]
struct MaterialRow {
    #[tabled(rename = "資材名")]
    name: String,
    #[tabled(rename = "単位")]
    units: String,
    #[tabled(rename = "数量")]
    quantity: String,
    #[tabled(rename = "金額")]
    amount: String,
    #[tabled(rename = "回数")]
    usage_count: u64,
    #[tabled(rename = "平均単価")]
    avg_unit_price: String,
    #[tabled(rename = "現場数")]
    projects: usize,
}

impl From<&MaterialAggregate> for MaterialRow {
    fn from(m: &MaterialAggregate) -> Self {
        Self {
            name: m.name.clone(),
            units: m.volume_units.join("/"),
            quantity: format_hours(m.total_quantity),
            amount: format_amount(m.total_amount),
            usage_count: m.usage_count,
            avg_unit_price: format_amount(m.avg_unit_price),
            projects: m.distinct_project_count,
        }
    }
}

#[derive(Debug, Clone, Tabled)]
struct SubcontractorRow {
    #[tabled(rename = "外注先")]
    name: String,
    #[tabled(rename = "延べ人数")]
    worker_count: u64,
    #[tabled(rename = "日数")]
    days: u64,
    #[tabled(rename = "平均人数")]
    avg_per_day: String,
}

impl From<&SubcontractorAggregate> for SubcontractorRow {
    fn from(s: &SubcontractorAggregate) -> Self {
        Self {
            name: s.name.clone(),
            worker_count: s.total_worker_count,
            days: s.total_days,
            avg_per_day: format_hours(s.avg_worker_per_day),
        }
    }
}

/// Markdown-style table with the name column left-aligned and figures right-aligned
fn table<T: Tabled>(rows: Vec<T>) -> String {
    if rows.is_empty() {
        return "(なし)\n".to_string();
    }
    let mut out = Table::new(rows)
        .with(Style::markdown())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    out.push('\n');
    out
}

/// Render the whole aggregation. `top` limits the materials table.
pub fn render(result: &AggregationResult, top: Option<usize>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "集計期間: {} ({} 〜 {})  日報件数: {}",
        result.period.label, result.period.start, result.period.end, result.report_count
    );
    out.push('\n');

    out.push_str("■ 工数\n");
    let mut labor: Vec<LaborRow> = result.labor.iter().map(LaborRow::from).collect();
    if !result.labor.is_empty() {
        labor.push(LaborRow::from(&LaborAggregate::total_row(&result.labor)));
    }
    out.push_str(&table(labor));
    out.push('\n');

    out.push_str("■ 資材\n");
    let shown = top.unwrap_or(result.materials.len());
    let materials: Vec<MaterialRow> = MaterialAggregator::top(&result.materials, shown)
        .iter()
        .map(MaterialRow::from)
        .collect();
    out.push_str(&table(materials));
    if result.materials.len() > shown {
        let _ = writeln!(out, "(他 {} 件)", result.materials.len() - shown);
    }
    out.push('\n');

    out.push_str("■ 外注\n");
    let subs: Vec<SubcontractorRow> = result
        .subcontractors
        .iter()
        .map(SubcontractorRow::from)
        .collect();
    out.push_str(&table(subs));
    out.push('\n');

    let _ = writeln!(
        out,
        "{}: 工数 {} h / 資材 {} 円 / 外注 {} 人",
        TOTAL_ROW_LABEL,
        format_hours(result.totals.labor_hours),
        format_amount(result.totals.material_amount),
        result.totals.subcontractor_count
    );

    if !result.skipped.is_empty() {
        out.push('\n');
        let _ = writeln!(out, "スキップ {} 件:", result.skipped.len());
        for s in &result.skipped {
            let _ = writeln!(out, "  {} {} ({})", s.date, s.worker, s.reason);
        }
    }
    out
}
