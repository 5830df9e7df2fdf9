//! 门店在线时长报表 HTTP API（触发/查询报表）与请求追踪 ID。

mod handlers;
mod ingest;
mod routes;
mod utils;

use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Request},
    middleware::{self, Next},
    response::Response,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, info};
use uptime_config::AppConfig;
use uptime_report::{ReportService, ReportServiceConfig};
use uptime_storage::{
    InMemoryBusinessHoursStore, InMemoryReportStore, InMemoryStatusPollStore,
    InMemoryTimezoneStore,
};
use uptime_telemetry::{init_tracing, new_request_ids};

#[derive(Clone)]
pub struct AppState {
    pub report_service: ReportService,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    let report_service = build_report_service(&config).await;
    let app = build_app(AppState { report_service });

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!("listening on {}", config.http_addr);
    axum::serve(listener, app).await?;
    Ok(())
}

/// 组装报表服务：内存存储、启动时加载 CSV，按配置挂载触发前重新加载钩子。
pub async fn build_report_service(config: &AppConfig) -> ReportService {
    // 三张输入表与报表状态存储（内存实现）
    let poll_store = Arc::new(InMemoryStatusPollStore::new());
    let hours_store = Arc::new(InMemoryBusinessHoursStore::new());
    let timezone_store = Arc::new(InMemoryTimezoneStore::new());
    let report_store = Arc::new(InMemoryReportStore::new());

    if config.ingest_enabled {
        ingest::load_dataset(
            config,
            poll_store.clone(),
            hours_store.clone(),
            timezone_store.clone(),
        )
        .await;
    } else {
        info!("ingest disabled (UPTIME_INGEST=off)");
    }

    let service = ReportService::new(
        poll_store.clone(),
        hours_store.clone(),
        timezone_store.clone(),
        report_store,
        ReportServiceConfig {
            default_timezone: config.default_timezone.clone(),
            workers: config.report_workers,
        },
    );
    if config.ingest_enabled && config.reload_on_trigger {
        info!("csv reload on trigger enabled");
        service.with_loader(Arc::new(ingest::CsvDatasetLoader::new(
            config.clone(),
            poll_store,
            hours_store,
            timezone_store,
        )))
    } else {
        service
    }
}

/// 组装路由：同一组接口同时挂载在 / 与 /api 下。
pub fn build_app(state: AppState) -> Router {
    let api = routes::create_api_router();
    Router::new()
        .merge(api.clone())
        .nest("/api", api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // 注入 request_id/trace_id
        .layer(middleware::from_fn(request_context))
}

async fn request_context(mut req: Request<Body>, next: Next) -> Response {
    // 生成 request_id 与 trace_id，并注入请求扩展与日志
    let ids = new_request_ids();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    req.extensions_mut().insert(ids.clone());

    let span = tracing::info_span!(
        "request",
        request_id = %ids.request_id,
        trace_id = %ids.trace_id,
        method = %method,
        path = %path
    );

    let mut response = next.run(req).instrument(span).await;
    response.headers_mut().insert(
        "x-request-id",
        HeaderValue::from_str(&ids.request_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response.headers_mut().insert(
        "x-trace-id",
        HeaderValue::from_str(&ids.trace_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response
}
