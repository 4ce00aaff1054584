//! CSV export (UTF-8 with BOM, Japanese headers, trailing totals row)

use std::fmt;
use std::str::FromStr;

use super::format_hours;
use crate::types::{AggregationResult, LaborAggregate, NippoError, Result, TOTAL_ROW_LABEL};

/// Byte order mark so spreadsheet software detects UTF-8
const UTF8_BOM: &str = "\u{FEFF}";

const LABOR_HEADERS: [&str; 11] = [
    "氏名",
    "平日通常",
    "平日残業",
    "平日深夜",
    "平日小計",
    "日曜通常",
    "日曜残業",
    "日曜深夜",
    "日曜小計",
    "合計",
    "移動時間",
];

const MATERIAL_HEADERS: [&str; 9] = [
    "資材名",
    "容量",
    "単位",
    "単価",
    "数量合計",
    "金額合計",
    "使用回数",
    "平均単価",
    "現場数",
];

const SUBCONTRACTOR_HEADERS: [&str; 4] = ["外注先", "延べ人数", "稼働日数", "1日平均人数"];

/// Which table of the aggregation to export
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CsvSection {
    Labor,
    Materials,
    Subcontractors,
}

impl CsvSection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Labor => "labor",
            Self::Materials => "materials",
            Self::Subcontractors => "subcontractors",
        }
    }
}

impl fmt::Display for CsvSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CsvSection {
    type Err = NippoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "labor" => Ok(Self::Labor),
            "materials" => Ok(Self::Materials),
            "subcontractors" => Ok(Self::Subcontractors),
            other => Err(NippoError::Parse(format!("unknown CSV section '{}'", other))),
        }
    }
}

/// Render one section of `result` as CSV text
pub fn to_csv(result: &AggregationResult, section: CsvSection) -> Result<String> {
    let rows = match section {
        CsvSection::Labor => labor_rows(result),
        CsvSection::Materials => material_rows(result),
        CsvSection::Subcontractors => subcontractor_rows(result),
    };
    write_rows(rows)
}

fn write_rows(rows: Vec<Vec<String>>) -> Result<String> {
    let mut writer = ::csv::Writer::from_writer(UTF8_BOM.as_bytes().to_vec());
    for row in rows {
        writer
            .write_record(&row)
            .map_err(|e| NippoError::Parse(format!("CSV write failed: {}", e)))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| NippoError::Parse(format!("CSV flush failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| NippoError::Parse(format!("CSV is not UTF-8: {}", e)))
}

fn header(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn labor_record(row: &LaborAggregate) -> Vec<String> {
    vec![
        row.name.clone(),
        format_hours(row.weekday_normal),
        format_hours(row.weekday_overtime),
        format_hours(row.weekday_late_night),
        format_hours(row.weekday_subtotal),
        format_hours(row.sunday_normal),
        format_hours(row.sunday_overtime),
        format_hours(row.sunday_late_night),
        format_hours(row.sunday_subtotal),
        format_hours(row.total),
        format_hours(row.travel_time),
    ]
}

fn labor_rows(result: &AggregationResult) -> Vec<Vec<String>> {
    let mut rows = vec![header(&LABOR_HEADERS)];
    rows.extend(result.labor.iter().map(labor_record));
    rows.push(labor_record(&LaborAggregate::total_row(&result.labor)));
    rows
}

fn material_rows(result: &AggregationResult) -> Vec<Vec<String>> {
    let mut rows = vec![header(&MATERIAL_HEADERS)];
    for m in &result.materials {
        rows.push(vec![
            m.name.clone(),
            m.volume.map(|v| v.normalize().to_string()).unwrap_or_default(),
            m.volume_unit.clone(),
            format_hours(m.unit_price),
            format_hours(m.total_quantity),
            format_hours(m.total_amount),
            m.usage_count.to_string(),
            format_hours(m.avg_unit_price),
            m.distinct_project_count.to_string(),
        ]);
    }
    let usage: u64 = result.materials.iter().map(|m| m.usage_count).sum();
    rows.push(vec![
        TOTAL_ROW_LABEL.to_string(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        format_hours(result.totals.material_amount),
        usage.to_string(),
        String::new(),
        String::new(),
    ]);
    rows
}

fn subcontractor_rows(result: &AggregationResult) -> Vec<Vec<String>> {
    let mut rows = vec![header(&SUBCONTRACTOR_HEADERS)];
    for s in &result.subcontractors {
        rows.push(vec![
            s.name.clone(),
            s.total_worker_count.to_string(),
            s.total_days.to_string(),
            format_hours(s.avg_worker_per_day),
        ]);
    }
    rows.push(vec![
        TOTAL_ROW_LABEL.to_string(),
        result.totals.subcontractor_count.to_string(),
        String::new(),
        String::new(),
    ]);
    rows
}
