use chrono::{NaiveTime, Timelike};
use domain::{BusinessHoursRule, StoreId};
use std::collections::HashMap;
use tracing::warn;
use uptime_telemetry::record_rule_rejected;

const END_OF_DAY_SECS: u32 = 23 * 3600 + 59 * 60 + 59;

/// 本地营业区间 `[open, close)`。
///
/// `close` 为 23:59:59 时视为营业到当日结束（次日 00:00）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LocalInterval {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl LocalInterval {
    /// 缺省全天营业：00:00:00 - 23:59:59。
    pub fn full_day() -> Self {
        Self {
            open: NaiveTime::default(),
            close: NaiveTime::from_num_seconds_from_midnight_opt(END_OF_DAY_SECS, 0)
                .unwrap_or_default(),
        }
    }

    pub fn closes_at_end_of_day(&self) -> bool {
        self.close.num_seconds_from_midnight() >= END_OF_DAY_SECS
    }
}

/// Business-Hours Index：`(store_id, weekday)` -> 当日营业区间列表。
#[derive(Debug, Clone, Default)]
pub struct BusinessHoursIndex {
    rules: HashMap<(StoreId, u8), Vec<LocalInterval>>,
}

impl BusinessHoursIndex {
    pub fn from_rules(rules: &[BusinessHoursRule]) -> Self {
        let mut index: HashMap<(StoreId, u8), Vec<LocalInterval>> = HashMap::new();
        for rule in rules {
            if rule.day_of_week > 6 || rule.end_local < rule.start_local {
                record_rule_rejected();
                warn!(
                    target: "uptime.report",
                    store_id = rule.store_id,
                    day_of_week = rule.day_of_week,
                    start = %rule.start_local,
                    end = %rule.end_local,
                    "business_hours_rule_rejected"
                );
                continue;
            }
            index
                .entry((rule.store_id, rule.day_of_week))
                .or_default()
                .push(LocalInterval {
                    open: rule.start_local,
                    close: rule.end_local,
                });
        }
        for intervals in index.values_mut() {
            intervals.sort();
        }
        Self { rules: index }
    }

    /// 按开门时间排序；无规则时返回全天区间。
    pub fn hours_for(&self, store_id: StoreId, weekday: u8) -> Vec<LocalInterval> {
        match self.rules.get(&(store_id, weekday)) {
            Some(intervals) => intervals.clone(),
            None => vec![LocalInterval::full_day()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).expect("time")
    }

    fn rule(day: u8, open: NaiveTime, close: NaiveTime) -> BusinessHoursRule {
        BusinessHoursRule {
            store_id: 1,
            day_of_week: day,
            start_local: open,
            end_local: close,
        }
    }

    #[test]
    fn missing_rules_default_to_full_day() {
        let index = BusinessHoursIndex::default();
        let hours = index.hours_for(1, 3);
        assert_eq!(hours, vec![LocalInterval::full_day()]);
        assert!(hours[0].closes_at_end_of_day());
    }

    #[test]
    fn multiple_rules_sorted_by_open() {
        let index = BusinessHoursIndex::from_rules(&[
            rule(0, hm(14, 0), hm(18, 0)),
            rule(0, hm(8, 0), hm(12, 0)),
        ]);
        let hours = index.hours_for(1, 0);
        assert_eq!(hours.len(), 2);
        assert_eq!(hours[0].open, hm(8, 0));
        assert_eq!(hours[1].open, hm(14, 0));
        assert_eq!(hours[0].close, hm(12, 0));
        assert!(!hours[0].closes_at_end_of_day());
        // 其他工作日不受影响
        assert_eq!(index.hours_for(1, 1), vec![LocalInterval::full_day()]);
    }

    #[test]
    fn invalid_rules_are_rejected() {
        let index = BusinessHoursIndex::from_rules(&[
            rule(2, hm(22, 0), hm(2, 0)),
            rule(9, hm(9, 0), hm(17, 0)),
        ]);
        assert_eq!(index.hours_for(1, 2), vec![LocalInterval::full_day()]);
        assert!(index.rules.is_empty());
    }
}
