//! 数据接入装配模块
//!
//! 将 CSV 采集源、行规范化、接入流水线与存储层组装成完整的加载链路：
//! 每个 CSV 文件逐行经 `RowNormalizer` 转为类型化记录，再由 `Pipeline`
//! 去重、批量写入对应的输入表。损坏的行记录告警与指标后跳过，不会中断加载。
//! `CsvDatasetLoader` 把同一链路挂到报表服务上，每次触发前整表重新加载。

use domain::{RawRow, RawTable};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use uptime_config::AppConfig;
use uptime_ingest::{CsvFileSource, IngestError, RawRowHandler, Source};
use uptime_normalize::{NormalizeError, RowNormalizer};
use uptime_pipeline::{Pipeline, PipelineConfig, StorageRecordWriter};
use uptime_report::{DatasetLoader, ReportError};
use uptime_storage::{BusinessHoursStore, StatusPollStore, TimezoneStore};
use uptime_telemetry::{
    record_dropped_duplicate, record_polls_written, record_row_received, record_row_skipped,
    record_rule_rejected,
};

/// 流水线处理器
///
/// 实现 `RawRowHandler`，连接行规范化与接入流水线两个环节。
struct PipelineHandler {
    normalizer: RowNormalizer,
    pipeline: Pipeline,
}

#[async_trait::async_trait]
impl RawRowHandler for PipelineHandler {
    async fn handle(&self, row: RawRow) -> Result<(), IngestError> {
        record_row_received();
        let table = row.table;
        let line_no = row.line_no;

        // 规范化失败只跳过当前行
        let normalized = match self.normalizer.normalize(row) {
            Ok(normalized) => normalized,
            Err(err) => {
                if matches!(err, NormalizeError::InvalidBusinessHours(_)) {
                    record_rule_rejected();
                } else {
                    record_row_skipped();
                }
                warn!(
                    target: "uptime.ingest",
                    table = table.as_str(),
                    line_no = line_no,
                    error = %err,
                    "row_skipped"
                );
                return Ok(());
            }
        };

        let store_id = normalized.store_id();
        match self.pipeline.handle(normalized).await {
            Ok(result) => {
                if result.flushed > 0 {
                    record_polls_written(result.flushed as u64);
                }
                match result.reason.as_deref() {
                    Some("duplicate") => record_dropped_duplicate(),
                    Some("invalid_ts") => {
                        record_row_skipped();
                        warn!(
                            target: "uptime.ingest",
                            table = table.as_str(),
                            line_no = line_no,
                            store_id = store_id,
                            "row_skipped"
                        );
                    }
                    _ => {}
                }
                Ok(())
            }
            Err(err) => {
                warn!(
                    target: "uptime.ingest",
                    table = table.as_str(),
                    line_no = line_no,
                    store_id = store_id,
                    error = %err,
                    "pipeline_write_failed"
                );
                Err(IngestError::Handler(err.to_string()))
            }
        }
    }
}

/// 单次加载统计。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub rows: usize,
    pub handler_failures: usize,
    pub polls_flushed: usize,
    pub missing_sources: usize,
}

/// 加载三张输入表
///
/// 先加载时区与营业时间，再加载状态轮询，最后冲刷流水线剩余缓冲。
/// 文件缺失时记录告警并继续加载其余文件。
pub async fn load_dataset(
    config: &AppConfig,
    poll_store: Arc<dyn StatusPollStore>,
    hours_store: Arc<dyn BusinessHoursStore>,
    timezone_store: Arc<dyn TimezoneStore>,
) -> LoadSummary {
    let writer = StorageRecordWriter::new(poll_store, hours_store, timezone_store);
    let pipeline = Pipeline::with_config(
        Arc::new(writer),
        PipelineConfig {
            batch_size: config.ingest_batch_size,
            dedup_cache_size: config.dedup_cache_size,
            ..PipelineConfig::default()
        },
    );
    let handler = Arc::new(PipelineHandler {
        normalizer: RowNormalizer::new(),
        pipeline: pipeline.clone(),
    });

    let sources: [(PathBuf, RawTable); 3] = [
        (config.timezones_csv.clone(), RawTable::Timezones),
        (config.business_hours_csv.clone(), RawTable::BusinessHours),
        (config.store_status_csv.clone(), RawTable::StoreStatus),
    ];

    let mut summary = LoadSummary::default();
    for (path, table) in sources {
        let source = CsvFileSource::new(path, table);
        match source.run(handler.clone()).await {
            Ok(result) => {
                summary.rows += result.rows;
                summary.handler_failures += result.handler_failures;
            }
            Err(err) => {
                summary.missing_sources += 1;
                warn!(
                    target: "uptime.ingest",
                    table = table.as_str(),
                    path = %source.path().display(),
                    error = %err,
                    "csv_source_failed"
                );
            }
        }
    }

    match pipeline.flush().await {
        Ok(flushed) => {
            if flushed > 0 {
                record_polls_written(flushed as u64);
            }
            summary.polls_flushed = flushed;
        }
        Err(err) => {
            warn!(target: "uptime.ingest", error = %err, "pipeline_flush_failed");
        }
    }

    info!(
        target: "uptime.ingest",
        rows = summary.rows,
        handler_failures = summary.handler_failures,
        missing_sources = summary.missing_sources,
        "dataset_loaded"
    );
    summary
}

/// 报表触发前的重新加载钩子：清空三张输入表后重新读取 CSV。
pub struct CsvDatasetLoader {
    config: AppConfig,
    poll_store: Arc<dyn StatusPollStore>,
    hours_store: Arc<dyn BusinessHoursStore>,
    timezone_store: Arc<dyn TimezoneStore>,
}

impl CsvDatasetLoader {
    pub fn new(
        config: AppConfig,
        poll_store: Arc<dyn StatusPollStore>,
        hours_store: Arc<dyn BusinessHoursStore>,
        timezone_store: Arc<dyn TimezoneStore>,
    ) -> Self {
        Self {
            config,
            poll_store,
            hours_store,
            timezone_store,
        }
    }
}

#[async_trait::async_trait]
impl DatasetLoader for CsvDatasetLoader {
    async fn reload(&self) -> Result<(), ReportError> {
        let reload_error = |err: uptime_storage::StorageError| ReportError::Reload(err.to_string());
        self.poll_store.clear_polls().await.map_err(reload_error)?;
        self.hours_store.clear_rules().await.map_err(reload_error)?;
        self.timezone_store
            .clear_timezones()
            .await
            .map_err(reload_error)?;
        load_dataset(
            &self.config,
            self.poll_store.clone(),
            self.hours_store.clone(),
            self.timezone_store.clone(),
        )
        .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uptime_storage::{
        InMemoryBusinessHoursStore, InMemoryStatusPollStore, InMemoryTimezoneStore,
    };

    fn temp_csv(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("uptime-api-ingest-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join(name);
        std::fs::write(&path, content).expect("write csv");
        path
    }

    fn config(status: PathBuf, hours: PathBuf, timezones: PathBuf) -> AppConfig {
        AppConfig {
            http_addr: "127.0.0.1:0".to_string(),
            store_status_csv: status,
            business_hours_csv: hours,
            timezones_csv: timezones,
            default_timezone: "America/Chicago".to_string(),
            ingest_enabled: true,
            reload_on_trigger: true,
            ingest_batch_size: 2,
            dedup_cache_size: 100,
            report_workers: 1,
        }
    }

    #[tokio::test]
    async fn load_dataset_fills_stores_and_skips_bad_rows() {
        let status = temp_csv(
            "load_status.csv",
            "store_id,status,timestamp_utc\n\
             1,active,2023-01-22 12:09:39.388884 UTC\n\
             1,active,2023-01-22 12:09:39.388884 UTC\n\
             1,inactive,2023-01-22 13:09:39 UTC\n\
             2,active,garbage\n\
             2,inactive,2023-01-22 14:00:00 UTC\n",
        );
        let hours = temp_csv(
            "load_hours.csv",
            "store_id,dayOfWeek,start_time_local,end_time_local\n\
             1,0,09:00:00,17:00:00\n\
             1,1,22:00:00,02:00:00\n",
        );
        let missing = std::env::temp_dir().join("uptime-api-ingest-missing/timezones.csv");

        let polls = Arc::new(InMemoryStatusPollStore::new());
        let rules = Arc::new(InMemoryBusinessHoursStore::new());
        let timezones = Arc::new(InMemoryTimezoneStore::new());
        let summary = load_dataset(
            &config(status, hours, missing),
            polls.clone(),
            rules.clone(),
            timezones.clone(),
        )
        .await;

        assert_eq!(summary.missing_sources, 1);
        assert_eq!(summary.rows, 7);
        assert_eq!(polls.list_polls().await.expect("polls").len(), 3);
        assert_eq!(rules.list_rules().await.expect("rules").len(), 1);
        assert!(timezones.list_timezones().await.expect("timezones").is_empty());
    }

    #[tokio::test]
    async fn loader_replaces_tables_instead_of_appending() {
        let status = temp_csv(
            "reload_status.csv",
            "store_id,status,timestamp_utc\n1,active,2023-01-22 12:00:00 UTC\n",
        );
        let hours = temp_csv(
            "reload_hours.csv",
            "store_id,dayOfWeek,start_time_local,end_time_local\n1,0,09:00:00,17:00:00\n",
        );
        let timezones = temp_csv("reload_timezones.csv", "store_id,timezone_str\n1,Asia/Tokyo\n");

        let polls = Arc::new(InMemoryStatusPollStore::new());
        let rules = Arc::new(InMemoryBusinessHoursStore::new());
        let zones = Arc::new(InMemoryTimezoneStore::new());
        let loader = CsvDatasetLoader::new(
            config(status.clone(), hours, timezones),
            polls.clone(),
            rules.clone(),
            zones.clone(),
        );

        loader.reload().await.expect("first reload");
        loader.reload().await.expect("second reload");
        assert_eq!(polls.len(), 1);
        assert_eq!(rules.list_rules().await.expect("rules").len(), 1);
        assert_eq!(zones.list_timezones().await.expect("timezones").len(), 1);

        std::fs::write(
            &status,
            "store_id,status,timestamp_utc\n\
             1,inactive,2023-01-22 13:00:00 UTC\n\
             2,active,2023-01-22 14:00:00 UTC\n",
        )
        .expect("rewrite csv");
        loader.reload().await.expect("third reload");
        let reloaded = polls.list_polls().await.expect("polls");
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.iter().all(|poll| poll.ts_ms > 1_674_388_800_000));
    }
}
