//! Report store and project directory collaborators
//!
//! The aggregation engine only ever reads through these traits. Each
//! implementation returns a snapshot for the requested window; nothing is
//! cached between requests.

mod http;
mod jsonl;

pub use http::HttpReportStore;
pub use jsonl::JsonlReportStore;

use crate::types::{DateRange, Project, Result, WorkReport};

/// Source of daily reports
pub trait ReportStore: Send + Sync {
    /// Store name for logs (e.g., "jsonl")
    fn name(&self) -> &str;

    /// Reports dated within `range`, restricted to one project when given
    fn list_reports(&self, range: &DateRange, project_ref_id: Option<&str>)
        -> Result<Vec<WorkReport>>;
}

/// Source of the project filter list
pub trait ProjectDirectory: Send + Sync {
    fn list_active_projects(&self) -> Result<Vec<Project>>;
}

/// Keep reports inside `range` and matching the optional project, ordered by date
pub fn filter_reports(
    reports: impl IntoIterator<Item = WorkReport>,
    range: &DateRange,
    project_ref_id: Option<&str>,
) -> Vec<WorkReport> {
    let mut filtered: Vec<WorkReport> = reports
        .into_iter()
        .filter(|r| range.contains(r.date) && r.matches_project(project_ref_id))
        .collect();
    filtered.sort_by_key(|r| r.date);
    filtered
}

/// In-memory snapshot, used by tests and benchmarks
#[derive(Debug, Clone, Default)]
pub struct MemoryReportStore {
    reports: Vec<WorkReport>,
    projects: Vec<Project>,
}

impl MemoryReportStore {
    pub fn new(reports: Vec<WorkReport>) -> Self {
        Self {
            reports,
            projects: Vec::new(),
        }
    }

    pub fn with_projects(mut self, projects: Vec<Project>) -> Self {
        self.projects = projects;
        self
    }
}

impl ReportStore for MemoryReportStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn list_reports(
        &self,
        range: &DateRange,
        project_ref_id: Option<&str>,
    ) -> Result<Vec<WorkReport>> {
        Ok(filter_reports(self.reports.iter().cloned(), range, project_ref_id))
    }
}

impl ProjectDirectory for MemoryReportStore {
    fn list_active_projects(&self) -> Result<Vec<Project>> {
        Ok(self.projects.iter().filter(|p| p.active).cloned().collect())
    }
}
