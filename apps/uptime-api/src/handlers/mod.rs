//! Handlers 模块

pub mod metrics;
pub mod reports;

use api_contract::HealthDto;
use axum::{Json, response::IntoResponse};

pub use metrics::*;
pub use reports::*;

pub async fn health() -> impl IntoResponse {
    Json(HealthDto { ok: true })
}
