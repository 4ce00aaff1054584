//! HTTP service exposing the aggregation as JSON and CSV
//!
//! Routes:
//! - `GET /aggregation?offset=&start=&end=&projectRefId=`
//! - `GET /aggregation/csv?section=labor|materials|subcontractors&...`
//! - `GET /health`

mod handlers;

pub use handlers::{AggregationQuery, ApiError};

use axum::{routing::get, Router};
use tracing::info;

use crate::services::AggregationService;
use crate::types::Result;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub service: AggregationService,
}

pub fn router(service: AggregationService) -> Router {
    Router::new()
        .route("/aggregation", get(handlers::aggregation_handler))
        .route("/aggregation/csv", get(handlers::csv_handler))
        .route("/health", get(handlers::health_handler))
        .with_state(AppState { service })
}

/// Bind `addr` and serve until the process is stopped
pub async fn serve(service: AggregationService, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    info!(addr = %local, "nippo server listening");

    axum::serve(listener, router(service)).await?;
    Ok(())
}
