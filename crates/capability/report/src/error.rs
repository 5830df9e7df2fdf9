/// 报表生成错误。
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// 没有任何状态轮询，无法确定参考时刻。
    #[error("no status polls available")]
    NoData,
    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("worker error: {0}")]
    Worker(String),
    /// 生成前重新加载输入表失败。
    #[error("reload error: {0}")]
    Reload(String),
}

impl From<uptime_storage::StorageError> for ReportError {
    fn from(err: uptime_storage::StorageError) -> Self {
        ReportError::Storage(err.to_string())
    }
}
