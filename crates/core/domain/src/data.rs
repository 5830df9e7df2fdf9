use chrono::NaiveTime;

/// 门店标识（三张输入表共享的主键）。
pub type StoreId = i64;

/// 原始行所属的输入表。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawTable {
    StoreStatus,
    BusinessHours,
    Timezones,
}

impl RawTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            RawTable::StoreStatus => "store_status",
            RawTable::BusinessHours => "store_business_hours",
            RawTable::Timezones => "store_timezones",
        }
    }
}

/// 数据源输入的原始行（未解析）。
#[derive(Debug, Clone)]
pub struct RawRow {
    pub table: RawTable,
    pub line_no: usize,
    pub fields: Vec<String>,
}

/// 门店轮询状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreStatus {
    Active,
    Inactive,
}

impl StoreStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Some(StoreStatus::Active),
            "inactive" => Some(StoreStatus::Inactive),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreStatus::Active => "active",
            StoreStatus::Inactive => "inactive",
        }
    }
}

/// 单次状态轮询（UTC 毫秒时间戳）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPoll {
    pub store_id: StoreId,
    pub status: StoreStatus,
    pub ts_ms: i64,
}

/// 营业时间规则：某个工作日（周一 = 0）的一段本地营业区间。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessHoursRule {
    pub store_id: StoreId,
    pub day_of_week: u8,
    pub start_local: NaiveTime,
    pub end_local: NaiveTime,
}

/// 门店时区（IANA 名称）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreTimezone {
    pub store_id: StoreId,
    pub timezone: String,
}

/// 规范化后的观测：轮询 + 门店本地工作日与本地时刻。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub store_id: StoreId,
    pub status: StoreStatus,
    pub ts_ms: i64,
    pub local_weekday: u8,
    pub local_time: NaiveTime,
}
