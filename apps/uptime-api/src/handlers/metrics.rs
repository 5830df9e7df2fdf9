//! Telemetry 指标快照。
//!
//! - GET /metrics

use api_contract::{ApiResponse, MetricsSnapshotDto};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use uptime_telemetry::metrics;

pub async fn get_metrics() -> Response {
    let snapshot = metrics().snapshot();
    (
        StatusCode::OK,
        Json(ApiResponse::success(MetricsSnapshotDto {
            rows_received: snapshot.rows_received,
            rows_skipped: snapshot.rows_skipped,
            rules_rejected: snapshot.rules_rejected,
            polls_written: snapshot.polls_written,
            dropped_duplicate: snapshot.dropped_duplicate,
            reports_generated: snapshot.reports_generated,
            reports_no_data: snapshot.reports_no_data,
            reports_failed: snapshot.reports_failed,
            stores_reported: snapshot.stores_reported,
            report_latency_ms_total: snapshot.report_latency_ms_total,
            report_latency_ms_count: snapshot.report_latency_ms_count,
        })),
    )
        .into_response()
}
