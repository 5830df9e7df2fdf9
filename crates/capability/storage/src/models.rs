//! 数据模型
//!
//! 报表状态存储使用的记录：
//! - ReportStatus：Running / Complete / NoData / Failed
//! - ReportState：report_id + 状态 + 完整报表（仅 Complete 时存在）

use domain::Report;
use std::sync::Arc;

/// 报表生成状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    Running,
    Complete,
    /// 没有任何轮询数据，无法确定参考时刻。
    NoData,
    Failed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Running => "Running",
            ReportStatus::Complete => "Complete",
            ReportStatus::NoData => "NoData",
            ReportStatus::Failed => "Failed",
        }
    }
}

/// 单个 report_id 的状态快照。
#[derive(Debug, Clone)]
pub struct ReportState {
    pub report_id: String,
    pub status: ReportStatus,
    pub report: Option<Arc<Report>>,
    pub error: Option<String>,
}

impl ReportState {
    pub fn running(report_id: impl Into<String>) -> Self {
        Self {
            report_id: report_id.into(),
            status: ReportStatus::Running,
            report: None,
            error: None,
        }
    }

    pub fn complete(report_id: impl Into<String>, report: Report) -> Self {
        Self {
            report_id: report_id.into(),
            status: ReportStatus::Complete,
            report: Some(Arc::new(report)),
            error: None,
        }
    }

    pub fn no_data(report_id: impl Into<String>) -> Self {
        Self {
            report_id: report_id.into(),
            status: ReportStatus::NoData,
            report: None,
            error: None,
        }
    }

    pub fn failed(report_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            report_id: report_id.into(),
            status: ReportStatus::Failed,
            report: None,
            error: Some(error.into()),
        }
    }
}
