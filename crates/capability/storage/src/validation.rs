//! 验证辅助函数

use crate::error::StorageError;

/// 验证 report_id 非空
pub fn ensure_report_id(report_id: &str) -> Result<(), StorageError> {
    if report_id.trim().is_empty() {
        return Err(StorageError::new("report_id required"));
    }
    Ok(())
}
