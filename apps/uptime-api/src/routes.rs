//! 路由定义
//!
//! - 健康检查：/health
//! - 指标：/metrics
//! - 报表：/trigger_report, /get_report

use super::AppState;
use super::handlers::*;
use axum::{Router, routing::get};

/// 创建 API 路由
///
/// 返回包含所有 API 端点的 Router，由调用方同时挂载在 / 和 /api/ 下
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(get_metrics))
        .route("/trigger_report", get(trigger_report).post(trigger_report))
        .route("/get_report", get(get_report))
}
