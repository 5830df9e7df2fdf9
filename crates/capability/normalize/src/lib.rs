use chrono::{DateTime, Datelike, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use domain::{
    BusinessHoursRule, Observation, RawRow, RawTable, StatusPoll, StoreId, StoreStatus,
    StoreTimezone,
};

/// 规范化错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("{table}: expected {expected} fields, found {found}")]
    FieldCount {
        table: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("invalid store id: {0}")]
    InvalidStoreId(String),
    #[error("invalid status: {0}")]
    InvalidStatus(String),
    #[error("corrupt timestamp: {0}")]
    CorruptTimestamp(String),
    #[error("invalid business hours: {0}")]
    InvalidBusinessHours(String),
    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),
}

/// 规范化后的输入记录。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedRow {
    Status(StatusPoll),
    BusinessHours(BusinessHoursRule),
    Timezone(StoreTimezone),
}

impl NormalizedRow {
    pub fn store_id(&self) -> StoreId {
        match self {
            NormalizedRow::Status(poll) => poll.store_id,
            NormalizedRow::BusinessHours(rule) => rule.store_id,
            NormalizedRow::Timezone(tz) => tz.store_id,
        }
    }
}

/// RawRow -> NormalizedRow 的规范化器。
#[derive(Debug, Clone, Copy, Default)]
pub struct RowNormalizer;

impl RowNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, row: RawRow) -> Result<NormalizedRow, NormalizeError> {
        normalize_row(&row)
    }
}

/// RawRow -> 类型化记录。
pub fn normalize_row(row: &RawRow) -> Result<NormalizedRow, NormalizeError> {
    match row.table {
        RawTable::StoreStatus => {
            let [store_id, status, timestamp] = fields::<3>(row)?;
            let store_id = parse_store_id(store_id)?;
            let status = StoreStatus::parse(status)
                .ok_or_else(|| NormalizeError::InvalidStatus(status.to_string()))?;
            let ts_ms = parse_timestamp_ms(timestamp)?;
            Ok(NormalizedRow::Status(StatusPoll {
                store_id,
                status,
                ts_ms,
            }))
        }
        RawTable::BusinessHours => {
            let [store_id, day, start, end] = fields::<4>(row)?;
            let store_id = parse_store_id(store_id)?;
            let day_of_week = day
                .parse::<u8>()
                .ok()
                .filter(|day| *day <= 6)
                .ok_or_else(|| NormalizeError::InvalidBusinessHours(format!("day {}", day)))?;
            let start_local = parse_local_time(start)
                .ok_or_else(|| NormalizeError::InvalidBusinessHours(format!("start {}", start)))?;
            let end_local = parse_local_time(end)
                .ok_or_else(|| NormalizeError::InvalidBusinessHours(format!("end {}", end)))?;
            // 不支持跨午夜规则
            if end_local < start_local {
                return Err(NormalizeError::InvalidBusinessHours(format!(
                    "close {} before open {}",
                    end, start
                )));
            }
            Ok(NormalizedRow::BusinessHours(BusinessHoursRule {
                store_id,
                day_of_week,
                start_local,
                end_local,
            }))
        }
        RawTable::Timezones => {
            let [store_id, timezone] = fields::<2>(row)?;
            let store_id = parse_store_id(store_id)?;
            if timezone.parse::<Tz>().is_err() {
                return Err(NormalizeError::InvalidTimezone(timezone.to_string()));
            }
            Ok(NormalizedRow::Timezone(StoreTimezone {
                store_id,
                timezone: timezone.to_string(),
            }))
        }
    }
}

/// Observation Normalizer：为轮询标注门店本地工作日（周一 = 0）与本地时刻。
///
/// 时间戳超出可表示范围时返回 `None`。
pub fn normalize_observation(poll: &StatusPoll, tz: Tz) -> Option<Observation> {
    let utc = DateTime::<Utc>::from_timestamp_millis(poll.ts_ms)?;
    let local = utc.with_timezone(&tz);
    Some(Observation {
        store_id: poll.store_id,
        status: poll.status,
        ts_ms: poll.ts_ms,
        local_weekday: local.weekday().num_days_from_monday() as u8,
        local_time: local.time(),
    })
}

/// 解析 UTC 时间戳：`YYYY-MM-DD HH:MM:SS[.ffffff][ UTC]` 或 RFC 3339。
pub fn parse_timestamp_ms(value: &str) -> Result<i64, NormalizeError> {
    let trimmed = value.trim();
    let naive_part = trimmed
        .strip_suffix("UTC")
        .map(str::trim_end)
        .unwrap_or(trimmed);
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(naive_part, format) {
            return Ok(naive.and_utc().timestamp_millis());
        }
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.timestamp_millis())
        .map_err(|_| NormalizeError::CorruptTimestamp(value.to_string()))
}

/// 解析本地时刻：`HH:MM:SS[.f]` 或 `HH:MM`。
pub fn parse_local_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

fn parse_store_id(value: &str) -> Result<StoreId, NormalizeError> {
    value
        .trim()
        .parse::<StoreId>()
        .map_err(|_| NormalizeError::InvalidStoreId(value.to_string()))
}

fn fields<const N: usize>(row: &RawRow) -> Result<[&str; N], NormalizeError> {
    if row.fields.len() != N {
        return Err(NormalizeError::FieldCount {
            table: row.table.as_str(),
            expected: N,
            found: row.fields.len(),
        });
    }
    Ok(std::array::from_fn(|index| row.fields[index].as_str()))
}
