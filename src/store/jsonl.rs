//! Directory-backed report store
//!
//! Layout under the data directory:
//! - `reports/**/*.jsonl`: one `WorkReport` JSON object per line
//! - `projects.json`: array of projects for the filter list
//!
//! Every report file is read under a shared lock, so a writer holding the
//! exclusive lock cannot leave half a report in the snapshot.

use fs2::FileExt;
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{filter_reports, ProjectDirectory, ReportStore};
use crate::types::{DateRange, NippoError, Project, Result, WorkReport};

const REPORT_PATTERN: &str = "reports/**/*.jsonl";
const PROJECTS_FILE: &str = "projects.json";

pub struct JsonlReportStore {
    data_dir: PathBuf,
}

impl JsonlReportStore {
    /// Store rooted at the default data directory (~/.nippo/data/)
    pub fn new() -> Result<Self> {
        let base_dirs = directories::BaseDirs::new()
            .ok_or_else(|| NippoError::Config("Cannot determine home directory".into()))?;
        Ok(Self {
            data_dir: base_dirs.home_dir().join(".nippo").join("data"),
        })
    }

    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// All report files under the data directory
    fn collect_files(&self) -> Result<Vec<PathBuf>> {
        if !self.data_dir.is_dir() {
            return Err(NippoError::Store(format!(
                "report directory not found: {}",
                self.data_dir.display()
            )));
        }
        let pattern = self.data_dir.join(REPORT_PATTERN);
        let paths = glob::glob(&pattern.to_string_lossy())
            .map_err(|e| NippoError::Store(format!("bad report pattern: {}", e)))?;
        let mut files: Vec<PathBuf> = paths.filter_map(|e| e.ok()).collect();
        files.sort();
        Ok(files)
    }

    /// Read one file under a shared lock and decode its lines
    fn read_file(&self, path: &Path) -> Result<Vec<WorkReport>> {
        let file = File::open(path)
            .map_err(|e| NippoError::Store(format!("cannot open {}: {}", path.display(), e)))?;
        file.lock_shared().map_err(|e| {
            NippoError::Store(format!("cannot lock {}: {}", path.display(), e))
        })?;

        let mut content = Vec::new();
        let read = (&file).read_to_end(&mut content);
        // closing the file releases the lock anyway, so a failed unlock is only logged
        if let Err(e) = file.unlock() {
            debug!(file = %path.display(), error = %e, "unlock failed");
        }
        read.map_err(|e| NippoError::Store(format!("cannot read {}: {}", path.display(), e)))?;

        Ok(parse_lines(path, &mut content))
    }
}

/// Decode JSONL content; undecodable lines are logged and dropped
fn parse_lines(path: &Path, content: &mut [u8]) -> Vec<WorkReport> {
    let mut reports = Vec::new();
    for (index, line) in content.split_mut(|b| *b == b'\n').enumerate() {
        let line = trim_ascii_mut(line);
        if line.is_empty() {
            continue;
        }
        match simd_json::from_slice::<WorkReport>(line) {
            Ok(report) => reports.push(report),
            Err(e) => warn!(
                file = %path.display(),
                line = index + 1,
                error = %e,
                "skipping undecodable report line"
            ),
        }
    }
    reports
}

fn trim_ascii_mut(bytes: &mut [u8]) -> &mut [u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &mut bytes[start..end]
}

impl ReportStore for JsonlReportStore {
    fn name(&self) -> &str {
        "jsonl"
    }

    fn list_reports(
        &self,
        range: &DateRange,
        project_ref_id: Option<&str>,
    ) -> Result<Vec<WorkReport>> {
        let files = self.collect_files()?;
        debug!(files = files.len(), dir = %self.data_dir.display(), "scanning report files");

        let per_file: Vec<Vec<WorkReport>> = files
            .par_iter()
            .map(|f| self.read_file(f))
            .collect::<Result<_>>()?;

        Ok(filter_reports(
            per_file.into_iter().flatten(),
            range,
            project_ref_id,
        ))
    }
}

impl ProjectDirectory for JsonlReportStore {
    fn list_active_projects(&self) -> Result<Vec<Project>> {
        let path = self.data_dir.join(PROJECTS_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)?;
        let projects: Vec<Project> = serde_json::from_str(&content)
            .map_err(|e| NippoError::Parse(format!("{}: {}", path.display(), e)))?;
        Ok(projects.into_iter().filter(|p| p.active).collect())
    }
}
