use async_trait::async_trait;
use domain::{RawRow, RawTable};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// 采集错误。
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("handler error: {0}")]
    Handler(String),
    #[error("source error: {0}")]
    Source(String),
}

/// RawRow 处理器。
#[async_trait]
pub trait RawRowHandler: Send + Sync {
    async fn handle(&self, row: RawRow) -> Result<(), IngestError>;
}

/// 单次采集的统计。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub rows: usize,
    pub handler_failures: usize,
}

/// 采集源抽象。
#[async_trait]
pub trait Source: Send + Sync {
    async fn run(&self, handler: Arc<dyn RawRowHandler>) -> Result<IngestSummary, IngestError>;
}

/// CSV 文件采集源：首行为表头，其余每行一条记录。
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
    table: RawTable,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>, table: RawTable) -> Self {
        Self {
            path: path.into(),
            table,
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl Source for CsvFileSource {
    async fn run(&self, handler: Arc<dyn RawRowHandler>) -> Result<IngestSummary, IngestError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|err| IngestError::Source(format!("{}: {}", self.path.display(), err)))?;

        let mut summary = IngestSummary::default();
        for row in parse_csv_rows(self.table, &text) {
            summary.rows += 1;
            let line_no = row.line_no;
            if let Err(err) = handler.handle(row).await {
                summary.handler_failures += 1;
                warn!(
                    target: "uptime.ingest",
                    table = self.table.as_str(),
                    line_no = line_no,
                    error = %err,
                    "raw_row_handler_failed"
                );
            }
        }
        info!(
            target: "uptime.ingest",
            table = self.table.as_str(),
            path = %self.path.display(),
            rows = summary.rows,
            handler_failures = summary.handler_failures,
            "csv_source_finished"
        );
        Ok(summary)
    }
}

/// 将 CSV 文本切分为原始行（跳过表头与空行，行号从 1 开始计）。
pub fn parse_csv_rows(table: RawTable, text: &str) -> Vec<RawRow> {
    text.lines()
        .enumerate()
        .skip(1)
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| RawRow {
            table,
            line_no: index + 1,
            fields: split_csv_line(line),
        })
        .collect()
}

/// 按逗号切分单行，支持双引号包裹的字段与 `""` 转义。
pub fn split_csv_line(line: &str) -> Vec<String> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    fields.push(current.trim().to_string());
    fields
}
