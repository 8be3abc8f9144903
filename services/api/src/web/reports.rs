//! services/api/src/web/reports.rs
//!
//! Report downloads and their JSON summary.

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use lending_ledger_core::{build_report, Report};
use std::sync::Arc;
use tracing::info;

use crate::error::ApiError;
use crate::web::protocol::{LoanQuery, ReportQuery, ReportSummaryResponse};
use crate::web::state::AppState;

async fn report_for(state: &AppState, query: &LoanQuery) -> Result<Report, ApiError> {
    let filter = query.to_filter()?;
    let as_of = query.as_of.unwrap_or_else(|| state.clock.now());
    let ledger = state.ledger.read().await;
    Ok(build_report(&ledger, state.directory.as_ref(), filter, as_of))
}

/// Download the transaction report as a CSV or HTML attachment.
#[utoipa::path(
    get,
    path = "/reports",
    params(ReportQuery),
    responses(
        (status = 200, description = "Report document as CSV or HTML", body = String, content_type = "text/html"),
        (status = 400, description = "Malformed filter or unknown format")
    )
)]
pub async fn export_report_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ApiError> {
    let format = query.export_format()?;
    let report = report_for(&state, &query.loan_query()).await?;
    let payload = report.export(format);
    info!(
        filename = %payload.filename,
        rows = report.rows.len(),
        "Report exported"
    );

    let disposition = format!("attachment; filename=\"{}\"", payload.filename);
    Ok((
        [
            (header::CONTENT_TYPE, payload.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        payload.body,
    )
        .into_response())
}

/// Counts and total fines for the filtered report.
#[utoipa::path(
    get,
    path = "/reports/summary",
    params(LoanQuery),
    responses(
        (status = 200, description = "Report summary", body = ReportSummaryResponse),
        (status = 400, description = "Malformed filter")
    )
)]
pub async fn report_summary_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LoanQuery>,
) -> Result<Json<ReportSummaryResponse>, ApiError> {
    let report = report_for(&state, &query).await?;
    Ok(Json(ReportSummaryResponse::from(&report)))
}
