use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::{error, info};

use super::AppState;
use crate::export::csv::{to_csv, CsvSection};
use crate::services::{AggregationService, PeriodSpec};
use crate::types::{AggregationResult, NippoError};

/// Query string shared by both aggregation routes.
///
/// Values are kept as raw strings and parsed by [`PeriodSpec::from_query`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationQuery {
    pub offset: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub project_ref_id: Option<String>,
    pub section: Option<String>,
}

impl AggregationQuery {
    fn period_spec(&self) -> Result<PeriodSpec, NippoError> {
        PeriodSpec::from_query(
            self.offset.as_deref(),
            self.start.as_deref(),
            self.end.as_deref(),
        )
    }
}

/// Error body `{"error": "..."}` with a matching status code
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<NippoError> for ApiError {
    fn from(err: NippoError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, "{}", self.message);
        }
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

/// Store reads block, so the aggregation runs off the async workers
async fn run_blocking(
    service: AggregationService,
    spec: PeriodSpec,
    project_ref_id: Option<String>,
) -> Result<AggregationResult, ApiError> {
    let joined = tokio::task::spawn_blocking(move || service.run(spec, project_ref_id.as_deref())).await;
    match joined {
        Ok(result) => result.map_err(ApiError::from),
        Err(e) => Err(ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("aggregation task failed: {}", e),
        }),
    }
}

/// GET /aggregation
pub async fn aggregation_handler(
    State(state): State<AppState>,
    Query(query): Query<AggregationQuery>,
) -> Result<Json<AggregationResult>, ApiError> {
    let spec = query.period_spec()?;
    let result = run_blocking(state.service, spec, query.project_ref_id).await?;
    Ok(Json(result))
}

/// GET /aggregation/csv
pub async fn csv_handler(
    State(state): State<AppState>,
    Query(query): Query<AggregationQuery>,
) -> Result<Response, ApiError> {
    let section: CsvSection = match query.section.as_deref() {
        None => CsvSection::Labor,
        Some(raw) => raw
            .parse()
            .map_err(|_| ApiError::bad_request(format!("unknown section '{}'", raw)))?,
    };
    let spec = query.period_spec()?;
    let result = run_blocking(state.service, spec, query.project_ref_id).await?;
    let body = to_csv(&result, section)?;
    info!(section = %section, period = %result.period.label, "csv export");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!(
                    "attachment; filename=\"{}_{}.csv\"",
                    section,
                    result.period.start.format("%Y%m")
                ),
            ),
        ],
        body,
    )
        .into_response())
}

/// GET /health
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "nippo",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::super::router;
    use super::*;
    use crate::store::{MemoryReportStore, ProjectDirectory, ReportStore};
    use crate::types::{DateRange, Project, Result as NippoResult, WorkReport, WorkerRecord};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::{Local, NaiveDate};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn service_with(reports: Vec<WorkReport>) -> AggregationService {
        let store = Arc::new(MemoryReportStore::new(reports).with_projects(vec![Project {
            id: "P-1".into(),
            name: "本社改修".into(),
            active: true,
        }]));
        AggregationService::new(store.clone(), store)
    }

    fn sample_reports() -> Vec<WorkReport> {
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let mut report = WorkReport::new(date, Some("P-1"));
        report.worker_records.push(WorkerRecord {
            name: "山田".into(),
            start_time: Some("08:00".into()),
            end_time: Some("17:00".into()),
            travel_time: None,
        });
        vec![report]
    }

    async fn get(service: AggregationService, uri: &str) -> (StatusCode, Vec<u8>, Option<String>) {
        let response = router(service)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec(), content_type)
    }

    fn json(body: &[u8]) -> serde_json::Value {
        serde_json::from_slice(body).unwrap()
    }

    // ========== /health ==========

    #[tokio::test]
    async fn test_health() {
        let (status, body, _) = get(service_with(Vec::new()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["status"], "ok");
    }

    // ========== /aggregation ==========

    #[tokio::test]
    async fn test_aggregation_explicit_range() {
        let (status, body, _) = get(
            service_with(sample_reports()),
            "/aggregation?start=2024-03-01&end=2024-03-31",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let value = json(&body);
        assert_eq!(value["reportCount"], 1);
        assert_eq!(value["labor"][0]["name"], "山田");
        let normal: Decimal = value["labor"][0]["weekdayNormal"].as_str().unwrap().parse().unwrap();
        assert_eq!(normal, dec!(9));
        assert_eq!(value["projects"][0]["id"], "P-1");
    }

    #[tokio::test]
    async fn test_aggregation_default_offset_is_current_month() {
        let (status, body, _) = get(service_with(Vec::new()), "/aggregation").await;

        assert_eq!(status, StatusCode::OK);
        let today = Local::now().date_naive();
        assert_eq!(
            json(&body)["period"]["label"],
            crate::services::period::month_label(today)
        );
    }

    #[tokio::test]
    async fn test_aggregation_inverted_range_is_bad_request() {
        let (status, body, _) = get(
            service_with(Vec::new()),
            "/aggregation?start=2024-03-31&end=2024-03-01",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json(&body)["error"].as_str().unwrap().contains("invalid period"));
    }

    #[tokio::test]
    async fn test_aggregation_bad_offset_is_bad_request() {
        let (status, _, _) = get(service_with(Vec::new()), "/aggregation?offset=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    struct BrokenStore;

    impl ReportStore for BrokenStore {
        fn name(&self) -> &str {
            "broken"
        }

        fn list_reports(&self, _: &DateRange, _: Option<&str>) -> NippoResult<Vec<WorkReport>> {
            Err(NippoError::Store("database unavailable".into()))
        }
    }

    impl ProjectDirectory for BrokenStore {
        fn list_active_projects(&self) -> NippoResult<Vec<Project>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_server_error() {
        let store = Arc::new(BrokenStore);
        let service = AggregationService::new(store.clone(), store);

        let (status, body, _) = get(service, "/aggregation?offset=-1").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json(&body)["error"]
            .as_str()
            .unwrap()
            .contains("database unavailable"));
    }

    // ========== /aggregation/csv ==========

    #[tokio::test]
    async fn test_csv_export() {
        let (status, body, content_type) = get(
            service_with(sample_reports()),
            "/aggregation/csv?section=labor&start=2024-03-01&end=2024-03-31",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("text/csv; charset=utf-8"));
        let text = String::from_utf8(body).unwrap();
        assert!(text.starts_with('\u{feff}'));
        assert!(text.contains("山田,9.00"));
    }

    #[tokio::test]
    async fn test_csv_unknown_section_is_bad_request() {
        let (status, _, _) = get(
            service_with(Vec::new()),
            "/aggregation/csv?section=payroll",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
