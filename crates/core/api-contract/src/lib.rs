//! 稳定的 DTO 与 API 响应契约。

use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// 标准 API 响应封装。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体。
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// 触发报表的响应体。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerReportResponse {
    pub report_id: String,
}

/// 查询报表的参数：`report_id` 缺省时返回最近一次报表。
#[derive(Debug, Default, Deserialize)]
pub struct GetReportQuery {
    #[serde(default, alias = "reportId")]
    pub report_id: Option<String>,
    /// `json`（默认）或 `csv`。
    #[serde(default)]
    pub format: Option<String>,
}

/// 单个门店的报表行（分钟，保留两位小数）。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreReportDto {
    pub store_id: i64,
    pub uptime_last_hour: f64,
    pub uptime_last_day: f64,
    pub uptime_last_week: f64,
    pub downtime_last_hour: f64,
    pub downtime_last_day: f64,
    pub downtime_last_week: f64,
}

/// 报表状态响应体。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetReportResponse {
    pub report_id: String,
    /// `Running` / `Complete` / `NoData` / `Failed`
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub now_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<Vec<StoreReportDto>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 指标快照返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshotDto {
    pub rows_received: u64,
    pub rows_skipped: u64,
    pub rules_rejected: u64,
    pub polls_written: u64,
    pub dropped_duplicate: u64,
    pub reports_generated: u64,
    pub reports_no_data: u64,
    pub reports_failed: u64,
    pub stores_reported: u64,
    pub report_latency_ms_total: u64,
    pub report_latency_ms_count: u64,
}

/// 健康检查返回结构。
#[derive(Debug, Serialize)]
pub struct HealthDto {
    pub ok: bool,
}

pub const REPORT_CSV_HEADER: &str = "store_id,uptime_last_hour,uptime_last_day,uptime_last_week,downtime_last_hour,downtime_last_day,downtime_last_week";

/// 毫秒 -> 分钟，保留两位小数。
pub fn minutes_2dp(ms: i64) -> f64 {
    (ms as f64 / 600.0).round() / 100.0
}

/// 报表行输出为 CSV（含表头，`\n` 换行）。
pub fn render_report_csv(rows: &[StoreReportDto]) -> String {
    let mut out = String::with_capacity(REPORT_CSV_HEADER.len() + rows.len() * 64);
    out.push_str(REPORT_CSV_HEADER);
    out.push('\n');
    for row in rows {
        // 写入 String 不会失败
        let _ = writeln!(
            out,
            "{},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2}",
            row.store_id,
            row.uptime_last_hour,
            row.uptime_last_day,
            row.uptime_last_week,
            row.downtime_last_hour,
            row.downtime_last_day,
            row.downtime_last_week,
        );
    }
    out
}
