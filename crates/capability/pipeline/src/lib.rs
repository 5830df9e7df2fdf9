use async_trait::async_trait;
use domain::{BusinessHoursRule, StatusPoll, StoreId, StoreStatus, StoreTimezone};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;
use uptime_normalize::NormalizedRow;
use uptime_storage::{BusinessHoursStore, StatusPollStore, TimezoneStore};

/// 单条记录的处理结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResult {
    pub store_id: StoreId,
    pub written: bool,
    pub reason: Option<String>,
    /// 本次调用实际写出的轮询条数（触发批量写入时非零）。
    pub flushed: usize,
}

impl WriteResult {
    fn written(store_id: StoreId) -> Self {
        Self {
            store_id,
            written: true,
            reason: None,
            flushed: 0,
        }
    }

    fn flushed(store_id: StoreId, flushed: usize) -> Self {
        Self {
            flushed,
            ..Self::written(store_id)
        }
    }

    fn skipped(store_id: StoreId, reason: &str) -> Self {
        Self {
            store_id,
            written: false,
            reason: Some(reason.to_string()),
            flushed: 0,
        }
    }
}

/// Pipeline 处理错误。
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("writer error: {0}")]
    Writer(String),
    #[error("backpressure: {0}")]
    Backpressure(String),
}

/// Pipeline 参数。
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub batch_size: usize,
    pub max_buffer_size: usize,
    pub max_retries: usize,
    pub dedup_cache_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: 500,
            max_buffer_size: 5_000,
            max_retries: 3,
            dedup_cache_size: 10_000,
        }
    }
}

impl PipelineConfig {
    fn sanitized(mut self) -> Self {
        if self.batch_size == 0 {
            self.batch_size = 1;
        }
        if self.max_buffer_size < self.batch_size {
            self.max_buffer_size = self.batch_size;
        }
        self
    }
}

/// 有界去重缓存：同一门店同一时间戳、同一状态的轮询只保留一次。
struct DedupState {
    map: HashMap<(StoreId, i64), (StoreStatus, u64)>,
    order: VecDeque<((StoreId, i64), u64)>,
    counter: u64,
    capacity: usize,
}

impl DedupState {
    fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::new(),
            order: VecDeque::new(),
            counter: 0,
            capacity,
        }
    }

    fn is_duplicate(&mut self, poll: &StatusPoll) -> bool {
        if self.capacity == 0 {
            return false;
        }
        let key = (poll.store_id, poll.ts_ms);
        if let Some((existing, _)) = self.map.get(&key) {
            if *existing == poll.status {
                return true;
            }
        }
        self.counter = self.counter.saturating_add(1);
        let token = self.counter;
        self.map.insert(key, (poll.status, token));
        self.order.push_back((key, token));
        while self.map.len() > self.capacity {
            if let Some((evict_key, evict_token)) = self.order.pop_front() {
                let should_remove = self
                    .map
                    .get(&evict_key)
                    .map(|(_, token)| *token == evict_token)
                    .unwrap_or(false);
                if should_remove {
                    self.map.remove(&evict_key);
                }
            } else {
                break;
            }
        }
        false
    }
}

/// 输入记录写入器抽象。
#[async_trait]
pub trait RecordWriter: Send + Sync {
    async fn write_polls(&self, polls: &[StatusPoll]) -> Result<usize, PipelineError>;

    async fn write_rule(&self, rule: BusinessHoursRule) -> Result<(), PipelineError>;

    async fn write_timezone(&self, timezone: StoreTimezone) -> Result<(), PipelineError>;
}

struct PipelineState {
    buffer: Vec<StatusPoll>,
    dedup: DedupState,
}

struct PipelineInner {
    writer: Arc<dyn RecordWriter>,
    config: PipelineConfig,
    state: Mutex<PipelineState>,
}

/// 接入流水线：轮询去重 + 批量写入，营业时间与时区直写。
#[derive(Clone)]
pub struct Pipeline {
    inner: Arc<PipelineInner>,
}

impl Pipeline {
    pub fn new(writer: Arc<dyn RecordWriter>) -> Self {
        Self::with_config(writer, PipelineConfig::default())
    }

    pub fn with_config(writer: Arc<dyn RecordWriter>, config: PipelineConfig) -> Self {
        let config = config.sanitized();
        let inner = PipelineInner {
            writer,
            config: config.clone(),
            state: Mutex::new(PipelineState {
                buffer: Vec::new(),
                dedup: DedupState::new(config.dedup_cache_size),
            }),
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    pub async fn handle(&self, row: NormalizedRow) -> Result<WriteResult, PipelineError> {
        match row {
            NormalizedRow::Status(poll) => self.handle_poll(poll).await,
            NormalizedRow::BusinessHours(rule) => {
                self.inner.writer.write_rule(rule).await?;
                Ok(WriteResult::written(rule.store_id))
            }
            NormalizedRow::Timezone(timezone) => {
                let store_id = timezone.store_id;
                self.inner.writer.write_timezone(timezone).await?;
                Ok(WriteResult::written(store_id))
            }
        }
    }

    async fn handle_poll(&self, poll: StatusPoll) -> Result<WriteResult, PipelineError> {
        let store_id = poll.store_id;
        if poll.ts_ms <= 0 {
            return Ok(WriteResult::skipped(store_id, "invalid_ts"));
        }

        let mut state = self.inner.state.lock().await;
        if state.buffer.len() >= self.inner.config.max_buffer_size {
            return Err(PipelineError::Backpressure("buffer full".to_string()));
        }
        if state.dedup.is_duplicate(&poll) {
            return Ok(WriteResult::skipped(store_id, "duplicate"));
        }
        state.buffer.push(poll);
        if state.buffer.len() < self.inner.config.batch_size {
            return Ok(WriteResult::skipped(store_id, "queued"));
        }
        let mut batch = Vec::new();
        std::mem::swap(&mut state.buffer, &mut batch);
        drop(state);

        match self.write_batch_with_retry(&batch).await {
            Ok(written) => Ok(WriteResult::flushed(store_id, written)),
            Err(err) => {
                self.requeue(batch).await?;
                Err(err)
            }
        }
    }

    /// 写出缓冲区中剩余的轮询，返回写入条数。
    pub async fn flush(&self) -> Result<usize, PipelineError> {
        let mut state = self.inner.state.lock().await;
        if state.buffer.is_empty() {
            return Ok(0);
        }
        let mut batch = Vec::new();
        std::mem::swap(&mut state.buffer, &mut batch);
        drop(state);

        match self.write_batch_with_retry(&batch).await {
            Ok(written) => Ok(written),
            Err(err) => {
                self.requeue(batch).await?;
                Err(err)
            }
        }
    }

    async fn write_batch_with_retry(&self, polls: &[StatusPoll]) -> Result<usize, PipelineError> {
        let mut attempt = 0;
        loop {
            match self.inner.writer.write_polls(polls).await {
                Ok(written) => return Ok(written),
                Err(err) => {
                    attempt += 1;
                    if attempt > self.inner.config.max_retries {
                        return Err(err);
                    }
                }
            }
        }
    }

    async fn requeue(&self, mut polls: Vec<StatusPoll>) -> Result<(), PipelineError> {
        if polls.is_empty() {
            return Ok(());
        }
        let mut state = self.inner.state.lock().await;
        if state.buffer.len() + polls.len() > self.inner.config.max_buffer_size {
            return Err(PipelineError::Backpressure(
                "buffer overflow after retry".to_string(),
            ));
        }
        state.buffer.append(&mut polls);
        Ok(())
    }
}

/// 基于存储层的写入器。
#[derive(Clone)]
pub struct StorageRecordWriter {
    poll_store: Arc<dyn StatusPollStore>,
    hours_store: Arc<dyn BusinessHoursStore>,
    timezone_store: Arc<dyn TimezoneStore>,
}

impl StorageRecordWriter {
    pub fn new(
        poll_store: Arc<dyn StatusPollStore>,
        hours_store: Arc<dyn BusinessHoursStore>,
        timezone_store: Arc<dyn TimezoneStore>,
    ) -> Self {
        Self {
            poll_store,
            hours_store,
            timezone_store,
        }
    }
}

#[async_trait]
impl RecordWriter for StorageRecordWriter {
    async fn write_polls(&self, polls: &[StatusPoll]) -> Result<usize, PipelineError> {
        self.poll_store
            .append_polls(polls)
            .await
            .map_err(|err| PipelineError::Writer(err.to_string()))
    }

    async fn write_rule(&self, rule: BusinessHoursRule) -> Result<(), PipelineError> {
        self.hours_store
            .insert_rules(&[rule])
            .await
            .map(|_| ())
            .map_err(|err| PipelineError::Writer(err.to_string()))
    }

    async fn write_timezone(&self, timezone: StoreTimezone) -> Result<(), PipelineError> {
        self.timezone_store
            .upsert_timezone(timezone)
            .await
            .map_err(|err| PipelineError::Writer(err.to_string()))
    }
}
