//! Daily report types as held by the report store

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{NippoError, Result};

/// One submitted daily report (日報)
///
/// Decimal fields accept JSON numbers or strings. Through `serde_json` both
/// forms are exact; the JSONL store decodes numbers as `f64`, so files that
/// carry more than 15 significant digits must write them as strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkReport {
    pub date: NaiveDate,
    #[serde(default)]
    pub project_ref_id: Option<String>,
    #[serde(default)]
    pub worker_records: Vec<WorkerRecord>,
    #[serde(default)]
    pub material_records: Vec<MaterialRecord>,
    #[serde(default)]
    pub subcontractor_records: Vec<SubcontractorRecord>,
}

impl WorkReport {
    /// Empty report for the given date and project
    pub fn new(date: NaiveDate, project_ref_id: Option<&str>) -> Self {
        Self {
            date,
            project_ref_id: project_ref_id.map(String::from),
            worker_records: Vec::new(),
            material_records: Vec::new(),
            subcontractor_records: Vec::new(),
        }
    }

    /// Whether the report belongs to the optional project filter
    pub fn matches_project(&self, project_ref_id: Option<&str>) -> bool {
        match project_ref_id {
            None => true,
            Some(id) => self.project_ref_id.as_deref() == Some(id),
        }
    }
}

/// Clock-in / clock-out of one worker on one report.
///
/// Times are kept as written; they are validated when the report is aggregated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRecord {
    pub name: String,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    /// Remote-site (遠隔地) travel time in hours
    #[serde(default)]
    pub travel_time: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRecord {
    pub name: String,
    #[serde(default)]
    pub volume: Option<Decimal>,
    #[serde(default)]
    pub volume_unit: String,
    #[serde(default)]
    pub unit_price: Decimal,
    #[serde(default)]
    pub quantity: Decimal,
}

impl MaterialRecord {
    pub fn amount(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

/// Subcontractor (外注先) crew on one report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SubcontractorRecord {
    pub name: String,
    #[serde(default)]
    pub worker_count: u32,
}

/// Project as listed by the project directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Inclusive date window `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(NippoError::InvalidPeriod(format!(
                "end {} is before start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
