//! 追踪、请求 ID 生成与基础指标。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 基础指标快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
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

/// 基础指标。
pub struct TelemetryMetrics {
    rows_received: AtomicU64,
    rows_skipped: AtomicU64,
    rules_rejected: AtomicU64,
    polls_written: AtomicU64,
    dropped_duplicate: AtomicU64,
    reports_generated: AtomicU64,
    reports_no_data: AtomicU64,
    reports_failed: AtomicU64,
    stores_reported: AtomicU64,
    report_latency_ms_total: AtomicU64,
    report_latency_ms_count: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            rows_received: AtomicU64::new(0),
            rows_skipped: AtomicU64::new(0),
            rules_rejected: AtomicU64::new(0),
            polls_written: AtomicU64::new(0),
            dropped_duplicate: AtomicU64::new(0),
            reports_generated: AtomicU64::new(0),
            reports_no_data: AtomicU64::new(0),
            reports_failed: AtomicU64::new(0),
            stores_reported: AtomicU64::new(0),
            report_latency_ms_total: AtomicU64::new(0),
            report_latency_ms_count: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            rows_received: self.rows_received.load(Ordering::Relaxed),
            rows_skipped: self.rows_skipped.load(Ordering::Relaxed),
            rules_rejected: self.rules_rejected.load(Ordering::Relaxed),
            polls_written: self.polls_written.load(Ordering::Relaxed),
            dropped_duplicate: self.dropped_duplicate.load(Ordering::Relaxed),
            reports_generated: self.reports_generated.load(Ordering::Relaxed),
            reports_no_data: self.reports_no_data.load(Ordering::Relaxed),
            reports_failed: self.reports_failed.load(Ordering::Relaxed),
            stores_reported: self.stores_reported.load(Ordering::Relaxed),
            report_latency_ms_total: self.report_latency_ms_total.load(Ordering::Relaxed),
            report_latency_ms_count: self.report_latency_ms_count.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录原始行接收次数。
pub fn record_row_received() {
    metrics().rows_received.fetch_add(1, Ordering::Relaxed);
}

/// 记录损坏行跳过次数（时间戳无法解析、字段缺失等）。
pub fn record_row_skipped() {
    metrics().rows_skipped.fetch_add(1, Ordering::Relaxed);
}

/// 记录营业时间规则被拒绝次数。
pub fn record_rule_rejected() {
    metrics().rules_rejected.fetch_add(1, Ordering::Relaxed);
}

/// 记录轮询写入条数。
pub fn record_polls_written(count: u64) {
    metrics().polls_written.fetch_add(count, Ordering::Relaxed);
}

/// 记录重复轮询丢弃次数。
pub fn record_dropped_duplicate() {
    metrics().dropped_duplicate.fetch_add(1, Ordering::Relaxed);
}

/// 记录报表生成完成（含门店数与耗时）。
pub fn record_report_generated(stores: u64, latency_ms: u64) {
    let metrics = metrics();
    metrics.reports_generated.fetch_add(1, Ordering::Relaxed);
    metrics.stores_reported.fetch_add(stores, Ordering::Relaxed);
    metrics
        .report_latency_ms_total
        .fetch_add(latency_ms, Ordering::Relaxed);
    metrics
        .report_latency_ms_count
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录无数据报表次数。
pub fn record_report_no_data() {
    metrics().reports_no_data.fetch_add(1, Ordering::Relaxed);
}

/// 记录报表生成失败次数。
pub fn record_report_failed() {
    metrics().reports_failed.fetch_add(1, Ordering::Relaxed);
}
