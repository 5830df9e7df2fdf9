use crate::error::ReportError;
use chrono_tz::Tz;
use domain::{StoreId, StoreTimezone};
use std::collections::HashMap;
use tracing::warn;

/// Timezone Resolver：门店 -> IANA 时区，缺失时回落到默认时区。
#[derive(Debug, Clone)]
pub struct TimezoneResolver {
    zones: HashMap<StoreId, Tz>,
    default: Tz,
}

impl TimezoneResolver {
    /// 仅当默认时区本身非法时失败；表内无法解析的时区记录告警后忽略。
    pub fn new(records: &[StoreTimezone], default: &str) -> Result<Self, ReportError> {
        let default = default
            .trim()
            .parse::<Tz>()
            .map_err(|_| ReportError::InvalidTimezone(default.to_string()))?;
        let mut zones = HashMap::with_capacity(records.len());
        for record in records {
            match record.timezone.trim().parse::<Tz>() {
                Ok(tz) => {
                    zones.insert(record.store_id, tz);
                }
                Err(_) => {
                    warn!(
                        target: "uptime.report",
                        store_id = record.store_id,
                        timezone = %record.timezone,
                        fallback = %default,
                        "timezone_fallback_default"
                    );
                }
            }
        }
        Ok(Self { zones, default })
    }

    pub fn resolve(&self, store_id: StoreId) -> Tz {
        self.zones.get(&store_id).copied().unwrap_or(self.default)
    }
}
