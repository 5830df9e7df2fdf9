use crate::business_hours::BusinessHoursIndex;
use crate::timezone::TimezoneResolver;
use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;
use domain::StoreId;

/// UTC 区间 `[start_ms, end_ms)`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcInterval {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl UtcInterval {
    pub fn duration_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }
}

/// 本地时刻 -> UTC 毫秒，不会失败：
/// - 唯一对应：该时刻
/// - 回拨重叠：取较早的时刻
/// - 拨快跳过：按跳变前的偏移量解释（落在跳变之后）
pub fn local_to_utc_ms(tz: Tz, naive: NaiveDateTime) -> i64 {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.timestamp_millis(),
        LocalResult::Ambiguous(earliest, _) => earliest.timestamp_millis(),
        LocalResult::None => {
            let before = tz
                .offset_from_utc_datetime(&(naive - Duration::days(1)))
                .fix()
                .local_minus_utc();
            (naive - Duration::seconds(i64::from(before)))
                .and_utc()
                .timestamp_millis()
        }
    }
}

/// Window/Schedule Intersector：报表窗口与门店营业时间求交。
pub struct Intersector<'a> {
    resolver: &'a TimezoneResolver,
    index: &'a BusinessHoursIndex,
}

impl<'a> Intersector<'a> {
    pub fn new(resolver: &'a TimezoneResolver, index: &'a BusinessHoursIndex) -> Self {
        Self { resolver, index }
    }

    /// 返回按起点排序、互不重叠的营业区间（UTC）。
    pub fn open_intervals(
        &self,
        store_id: StoreId,
        start_ms: i64,
        end_ms: i64,
    ) -> Vec<UtcInterval> {
        if end_ms <= start_ms {
            return Vec::new();
        }
        let (Some(start), Some(last)) = (
            DateTime::<Utc>::from_timestamp_millis(start_ms),
            DateTime::<Utc>::from_timestamp_millis(end_ms - 1),
        ) else {
            return Vec::new();
        };
        let tz = self.resolver.resolve(store_id);
        let last_day = last.with_timezone(&tz).date_naive();

        let mut intervals = Vec::new();
        let mut day = start.with_timezone(&tz).date_naive();
        while day <= last_day {
            let weekday = day.weekday().num_days_from_monday() as u8;
            for local in self.index.hours_for(store_id, weekday) {
                let open_ms = local_to_utc_ms(tz, day.and_time(local.open));
                let close_ms = if local.closes_at_end_of_day() {
                    match day.succ_opt() {
                        Some(next) => local_to_utc_ms(tz, next.and_time(NaiveTime::default())),
                        None => continue,
                    }
                } else {
                    local_to_utc_ms(tz, day.and_time(local.close))
                };
                let clipped = UtcInterval {
                    start_ms: open_ms.max(start_ms),
                    end_ms: close_ms.min(end_ms),
                };
                if clipped.start_ms < clipped.end_ms {
                    intervals.push(clipped);
                }
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        merge_intervals(intervals)
    }
}

/// `ts_ms` 是否落在某个区间内；`intervals` 须有序且互不重叠。
pub fn covers(intervals: &[UtcInterval], ts_ms: i64) -> bool {
    let idx = intervals.partition_point(|interval| interval.end_ms <= ts_ms);
    intervals
        .get(idx)
        .is_some_and(|interval| interval.start_ms <= ts_ms)
}

/// 排序并合并重叠或首尾相接的区间。
pub fn merge_intervals(mut intervals: Vec<UtcInterval>) -> Vec<UtcInterval> {
    intervals.sort();
    let mut merged: Vec<UtcInterval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match merged.last_mut() {
            Some(last) if interval.start_ms <= last.end_ms => {
                last.end_ms = last.end_ms.max(interval.end_ms);
            }
            _ => merged.push(interval),
        }
    }
    merged
}
