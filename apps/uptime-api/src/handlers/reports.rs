//! 报表 handlers
//!
//! - GET|POST /trigger_report
//! - GET /get_report?report_id=...&format=csv

use crate::AppState;
use crate::utils::normalize_optional;
use crate::utils::response::{
    bad_request_error, not_found_error, report_error, report_state_to_dto, store_report_to_dto,
};
use api_contract::{ApiResponse, GetReportQuery, TriggerReportResponse, render_report_csv};
use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use uptime_storage::ReportStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReportFormat {
    Json,
    Csv,
}

fn parse_format(value: Option<String>) -> Result<ReportFormat, Response> {
    match normalize_optional(value).as_deref() {
        None => Ok(ReportFormat::Json),
        Some(format) if format.eq_ignore_ascii_case("json") => Ok(ReportFormat::Json),
        Some(format) if format.eq_ignore_ascii_case("csv") => Ok(ReportFormat::Csv),
        Some(other) => Err(bad_request_error(format!("unsupported format: {}", other))),
    }
}

pub async fn trigger_report(State(state): State<AppState>) -> Response {
    match state.report_service.trigger().await {
        Ok(report_id) => (
            StatusCode::OK,
            Json(ApiResponse::success(TriggerReportResponse { report_id })),
        )
            .into_response(),
        Err(err) => report_error(err),
    }
}

pub async fn get_report(
    State(state): State<AppState>,
    Query(query): Query<GetReportQuery>,
) -> Response {
    let format = match parse_format(query.format) {
        Ok(format) => format,
        Err(response) => return response,
    };
    let result = match normalize_optional(query.report_id) {
        Some(report_id) => state.report_service.get_report(&report_id).await,
        None => state.report_service.current_report().await,
    };
    let report_state = match result {
        Ok(Some(report_state)) => report_state,
        Ok(None) => return not_found_error(),
        Err(err) => return report_error(err),
    };

    if format == ReportFormat::Csv && report_state.status == ReportStatus::Complete {
        if let Some(report) = report_state.report.as_ref() {
            let rows: Vec<_> = report.stores.iter().map(store_report_to_dto).collect();
            return (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
                render_report_csv(&rows),
            )
                .into_response();
        }
    }

    (
        StatusCode::OK,
        Json(ApiResponse::success(report_state_to_dto(&report_state))),
    )
        .into_response()
}
