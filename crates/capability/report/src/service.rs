use crate::builder::{Dataset, ReportBuilder};
use crate::error::ReportError;
use domain::Report;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use uptime_storage::{
    BusinessHoursStore, ReportState, ReportStore, StatusPollStore, TimezoneStore,
};
use uptime_telemetry::{record_report_failed, record_report_generated, record_report_no_data};

/// 报表服务参数。
#[derive(Debug, Clone)]
pub struct ReportServiceConfig {
    pub default_timezone: String,
    pub workers: usize,
}

impl Default for ReportServiceConfig {
    fn default() -> Self {
        Self {
            default_timezone: domain::DEFAULT_TIMEZONE.to_string(),
            workers: 4,
        }
    }
}

/// 输入表重新加载钩子：每次生成前在单飞保护内调用。
#[async_trait::async_trait]
pub trait DatasetLoader: Send + Sync {
    async fn reload(&self) -> Result<(), ReportError>;
}

struct ReportServiceInner {
    polls: Arc<dyn StatusPollStore>,
    hours: Arc<dyn BusinessHoursStore>,
    timezones: Arc<dyn TimezoneStore>,
    reports: Arc<dyn ReportStore>,
    config: ReportServiceConfig,
    in_flight: Mutex<Option<String>>,
}

/// 报表服务：快照输入、并行计算、发布到报表状态存储。
#[derive(Clone)]
pub struct ReportService {
    inner: Arc<ReportServiceInner>,
    loader: Option<Arc<dyn DatasetLoader>>,
}

impl ReportService {
    pub fn new(
        polls: Arc<dyn StatusPollStore>,
        hours: Arc<dyn BusinessHoursStore>,
        timezones: Arc<dyn TimezoneStore>,
        reports: Arc<dyn ReportStore>,
        config: ReportServiceConfig,
    ) -> Self {
        Self {
            inner: Arc::new(ReportServiceInner {
                polls,
                hours,
                timezones,
                reports,
                config,
                in_flight: Mutex::new(None),
            }),
            loader: None,
        }
    }

    /// 挂载重新加载钩子：之后每次触发都先刷新输入表再生成。
    pub fn with_loader(mut self, loader: Arc<dyn DatasetLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    async fn snapshot(&self) -> Result<Dataset, ReportError> {
        Ok(Dataset {
            polls: self.inner.polls.list_polls().await?,
            rules: self.inner.hours.list_rules().await?,
            timezones: self.inner.timezones.list_timezones().await?,
        })
    }

    /// 同步生成一份完整报表（不写入报表状态存储）。
    pub async fn generate_report(&self) -> Result<Report, ReportError> {
        if self.inner.polls.max_timestamp_ms().await?.is_none() {
            return Err(ReportError::NoData);
        }
        let dataset = self.snapshot().await?;
        let builder = Arc::new(ReportBuilder::new(
            dataset,
            &self.inner.config.default_timezone,
        )?);
        let now_ms = builder.reference_now().ok_or(ReportError::NoData)?;

        let store_ids = builder.store_ids().to_vec();
        let workers = self.inner.config.workers.max(1);
        let chunk_size = store_ids.len().div_ceil(workers).max(1);

        let mut tasks = JoinSet::new();
        for chunk in store_ids.chunks(chunk_size) {
            let chunk = chunk.to_vec();
            let builder = builder.clone();
            tasks.spawn_blocking(move || {
                chunk
                    .into_iter()
                    .map(|store_id| builder.build_store(store_id, now_ms))
                    .collect::<Vec<_>>()
            });
        }

        let mut stores = Vec::with_capacity(store_ids.len());
        while let Some(joined) = tasks.join_next().await {
            let part = joined.map_err(|err| ReportError::Worker(err.to_string()))?;
            stores.extend(part);
        }
        stores.sort_by_key(|store| store.store_id);
        Ok(Report { now_ms, stores })
    }

    /// 触发一次后台生成；已有生成在进行时返回进行中的 report_id。
    pub async fn trigger(&self) -> Result<String, ReportError> {
        let mut in_flight = self.inner.in_flight.lock().await;
        if let Some(report_id) = in_flight.as_ref() {
            return Ok(report_id.clone());
        }
        let report_id = uuid::Uuid::new_v4().to_string();
        self.inner.reports.mark_running(&report_id).await?;
        *in_flight = Some(report_id.clone());
        drop(in_flight);

        info!(target: "uptime.report", report_id = %report_id, "report_triggered");
        let service = self.clone();
        let task_id = report_id.clone();
        tokio::spawn(async move {
            service.run(task_id).await;
        });
        Ok(report_id)
    }

    async fn run(&self, report_id: String) {
        let started = Instant::now();
        let state = match self.reload_and_generate().await {
            Ok(report) => {
                let latency_ms = started.elapsed().as_millis() as u64;
                record_report_generated(report.stores.len() as u64, latency_ms);
                info!(
                    target: "uptime.report",
                    report_id = %report_id,
                    stores = report.stores.len(),
                    now_ms = report.now_ms,
                    latency_ms = latency_ms,
                    "report_generated"
                );
                ReportState::complete(&report_id, report)
            }
            Err(ReportError::NoData) => {
                record_report_no_data();
                warn!(target: "uptime.report", report_id = %report_id, "report_no_data");
                ReportState::no_data(&report_id)
            }
            Err(err) => {
                record_report_failed();
                error!(
                    target: "uptime.report",
                    report_id = %report_id,
                    error = %err,
                    "report_failed"
                );
                ReportState::failed(&report_id, err.to_string())
            }
        };

        // 发布与释放单飞标记在同一把锁内完成
        let mut in_flight = self.inner.in_flight.lock().await;
        if let Err(err) = self.inner.reports.publish(state).await {
            error!(
                target: "uptime.report",
                report_id = %report_id,
                error = %err,
                "report_publish_failed"
            );
        }
        if in_flight.as_deref() == Some(report_id.as_str()) {
            *in_flight = None;
        }
    }

    async fn reload_and_generate(&self) -> Result<Report, ReportError> {
        if let Some(loader) = &self.loader {
            loader.reload().await?;
            info!(target: "uptime.report", "dataset_reloaded");
        }
        self.generate_report().await
    }

    /// 最近一次触发的报表状态。
    pub async fn current_report(&self) -> Result<Option<Arc<ReportState>>, ReportError> {
        Ok(self.inner.reports.latest_report().await?)
    }

    pub async fn get_report(
        &self,
        report_id: &str,
    ) -> Result<Option<Arc<ReportState>>, ReportError> {
        Ok(self.inner.reports.get_report(report_id).await?)
    }
}
