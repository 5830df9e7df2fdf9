//! HTTP 响应辅助函数和 DTO 转换
//!
//! - 错误响应：bad_request_error, not_found_error, report_error
//! - DTO 转换：report_state_to_dto, store_report_to_dto
//!
//! 所有错误返回统一的 ApiResponse 格式，HTTP 状态码与错误码对应。

use api_contract::{ApiResponse, GetReportResponse, StoreReportDto, minutes_2dp};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::StoreReport;
use uptime_report::ReportError;
use uptime_storage::ReportState;

/// 错误请求响应
pub fn bad_request_error(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error("INVALID.REQUEST", message.into())),
    )
        .into_response()
}

/// 资源未找到错误响应
pub fn not_found_error() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error("RESOURCE.NOT_FOUND", "not found")),
    )
        .into_response()
}

/// 报表服务错误响应
pub fn report_error(err: ReportError) -> Response {
    let message = err.to_string();
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error("INTERNAL.ERROR", message)),
    )
        .into_response()
}

/// StoreReport 转 StoreReportDto
pub fn store_report_to_dto(store: &StoreReport) -> StoreReportDto {
    StoreReportDto {
        store_id: store.store_id,
        uptime_last_hour: minutes_2dp(store.last_hour.uptime_ms),
        uptime_last_day: minutes_2dp(store.last_day.uptime_ms),
        uptime_last_week: minutes_2dp(store.last_week.uptime_ms),
        downtime_last_hour: minutes_2dp(store.last_hour.downtime_ms),
        downtime_last_day: minutes_2dp(store.last_day.downtime_ms),
        downtime_last_week: minutes_2dp(store.last_week.downtime_ms),
    }
}

/// ReportState 转 GetReportResponse
pub fn report_state_to_dto(state: &ReportState) -> GetReportResponse {
    GetReportResponse {
        report_id: state.report_id.clone(),
        status: state.status.as_str().to_string(),
        now_ms: state.report.as_ref().map(|report| report.now_ms),
        report: state
            .report
            .as_ref()
            .map(|report| report.stores.iter().map(store_report_to_dto).collect()),
        error: state.error.clone(),
    }
}
