//! 应用运行配置加载。

use std::env;
use std::path::{Path, PathBuf};

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    pub store_status_csv: PathBuf,
    pub business_hours_csv: PathBuf,
    pub timezones_csv: PathBuf,
    pub default_timezone: String,
    pub ingest_enabled: bool,
    /// 每次触发报表前重新加载 CSV（仅在 ingest_enabled 时生效）
    pub reload_on_trigger: bool,
    pub ingest_batch_size: usize,
    pub dedup_cache_size: usize,
    pub report_workers: usize,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_addr =
            env::var("UPTIME_HTTP_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let data_dir = PathBuf::from(
            read_optional("UPTIME_DATA_DIR").unwrap_or_else(|| "data".to_string()),
        );
        let store_status_csv =
            read_path_with_default("UPTIME_STORE_STATUS_CSV", &data_dir, "store_status.csv");
        let business_hours_csv = read_path_with_default(
            "UPTIME_BUSINESS_HOURS_CSV",
            &data_dir,
            "store_business_hours.csv",
        );
        let timezones_csv =
            read_path_with_default("UPTIME_TIMEZONES_CSV", &data_dir, "store_timezones.csv");
        let default_timezone = read_optional("UPTIME_DEFAULT_TIMEZONE")
            .unwrap_or_else(|| "America/Chicago".to_string());
        let ingest_enabled = read_bool_with_default("UPTIME_INGEST", true);
        let reload_on_trigger = read_bool_with_default("UPTIME_RELOAD_ON_TRIGGER", true);
        let ingest_batch_size = read_usize_with_default("UPTIME_INGEST_BATCH_SIZE", 500)?;
        let dedup_cache_size = read_usize_with_default("UPTIME_DEDUP_CACHE_SIZE", 10_000)?;
        // 至少一个计算 worker
        let report_workers = read_usize_with_default("UPTIME_REPORT_WORKERS", 4)?.max(1);

        Ok(Self {
            http_addr,
            store_status_csv,
            business_hours_csv,
            timezones_csv,
            default_timezone,
            ingest_enabled,
            reload_on_trigger,
            ingest_batch_size,
            dedup_cache_size,
            report_workers,
        })
    }
}

fn read_usize_with_default(key: &str, default: usize) -> Result<usize, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

fn read_path_with_default(key: &str, data_dir: &Path, file_name: &str) -> PathBuf {
    read_optional(key)
        .map(PathBuf::from)
        .unwrap_or_else(|| data_dir.join(file_name))
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}
