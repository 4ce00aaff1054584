//! Report store backed by the daily-report web application's HTTP API

use std::time::Duration;
use tracing::debug;

use super::{filter_reports, ProjectDirectory, ReportStore};
use crate::types::{DateRange, NippoError, Project, Result, WorkReport};

/// HTTP request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Reads `GET {base}/reports` and `GET {base}/projects`
pub struct HttpReportStore {
    base_url: String,
    tenant: Option<String>,
    client: reqwest::blocking::Client,
}

impl HttpReportStore {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| NippoError::Store(format!("HTTP client error: {}", e)))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            tenant: None,
            client,
        })
    }

    /// Scope every request to one tenant via the `tenant` query parameter
    pub fn with_tenant(mut self, tenant: Option<String>) -> Self {
        self.tenant = tenant.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, "fetching from report service");

        let mut request = self.client.get(&url).query(query);
        if let Some(tenant) = &self.tenant {
            request = request.query(&[("tenant", tenant)]);
        }
        let response = request
            .send()
            .map_err(|e| NippoError::Store(format!("HTTP request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| NippoError::Store(format!("report service error: {}", e)))?;

        response
            .json()
            .map_err(|e| NippoError::Store(format!("JSON parse error: {}", e)))
    }
}

impl ReportStore for HttpReportStore {
    fn name(&self) -> &str {
        "http"
    }

    fn list_reports(
        &self,
        range: &DateRange,
        project_ref_id: Option<&str>,
    ) -> Result<Vec<WorkReport>> {
        let mut query = vec![
            ("start", range.start.to_string()),
            ("end", range.end.to_string()),
        ];
        if let Some(id) = project_ref_id {
            query.push(("projectRefId", id.to_string()));
        }
        let reports: Vec<WorkReport> = self.get_json("reports", &query)?;
        Ok(filter_reports(reports, range, project_ref_id))
    }
}

impl ProjectDirectory for HttpReportStore {
    fn list_active_projects(&self) -> Result<Vec<Project>> {
        let projects: Vec<Project> = self.get_json("projects", &[])?;
        Ok(projects.into_iter().filter(|p| p.active).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let store = HttpReportStore::new("http://localhost:8080/api/").unwrap();
        assert_eq!(store.base_url(), "http://localhost:8080/api");
    }

    #[test]
    fn test_blank_tenant_ignored() {
        let store = HttpReportStore::new("http://localhost:8080")
            .unwrap()
            .with_tenant(Some("  ".into()));
        assert!(store.tenant.is_none());

        let store = HttpReportStore::new("http://localhost:8080")
            .unwrap()
            .with_tenant(Some("acme".into()));
        assert_eq!(store.tenant.as_deref(), Some("acme"));
    }

    #[test]
    fn test_unreachable_service_is_store_error() {
        // Port 1 on loopback refuses connections
        let store = HttpReportStore::new("http://127.0.0.1:1").unwrap();
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
        .unwrap();

        let err = store.list_reports(&range, None).unwrap_err();
        assert!(matches!(err, NippoError::Store(_)));

        let err = store.list_active_projects().unwrap_err();
        assert!(matches!(err, NippoError::Store(_)));
    }
}
