use chrono::{NaiveDate, NaiveTime, TimeZone};
use chrono_tz::America::Chicago;
use chrono_tz::Tz;
use domain::{BusinessHoursRule, ReportWindow, StatusPoll, StoreStatus, StoreTimezone};
use uptime_report::{
    BusinessHoursIndex, Dataset, Intersector, ReportBuilder, TimezoneResolver, local_to_utc_ms,
};

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 60 * MINUTE_MS;

fn local_ms(tz: Tz, y: i32, mo: u32, d: u32, h: u32, mi: u32) -> i64 {
    tz.with_ymd_and_hms(y, mo, d, h, mi, 0)
        .single()
        .expect("unique local time")
        .timestamp_millis()
}

/// 2024-01-08 为周一（CST，UTC-6）。
fn chicago_monday(h: u32, mi: u32) -> i64 {
    local_ms(Chicago, 2024, 1, 8, h, mi)
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).expect("time")
}

fn rule(store_id: i64, day: u8, open: NaiveTime, close: NaiveTime) -> BusinessHoursRule {
    BusinessHoursRule {
        store_id,
        day_of_week: day,
        start_local: open,
        end_local: close,
    }
}

fn poll(store_id: i64, status: StoreStatus, ts_ms: i64) -> StatusPoll {
    StatusPoll {
        store_id,
        status,
        ts_ms,
    }
}

fn chicago_store(store_id: i64) -> StoreTimezone {
    StoreTimezone {
        store_id,
        timezone: "America/Chicago".to_string(),
    }
}

fn builder(dataset: Dataset) -> ReportBuilder {
    ReportBuilder::new(dataset, "America/Chicago").expect("builder")
}

#[test]
fn chicago_single_active_observation_held_for_last_hour() {
    let dataset = Dataset {
        polls: vec![poll(1, StoreStatus::Active, chicago_monday(10, 0))],
        rules: vec![rule(1, 0, hm(9, 0), hm(17, 0))],
        timezones: vec![chicago_store(1)],
    };
    let report = builder(dataset).build_store(1, chicago_monday(16, 0));

    assert_eq!(report.last_hour.uptime_minutes(), 60.0);
    assert_eq!(report.last_hour.downtime_minutes(), 0.0);

    // 周日无规则视为全天营业：周日 16:00-24:00 与周一 09:00-10:00 状态未知
    assert_eq!(report.last_day.open_ms, 15 * HOUR_MS);
    assert_eq!(report.last_day.uptime_ms, 6 * HOUR_MS);
    assert_eq!(report.last_day.downtime_ms, 0);
}

#[test]
fn chicago_status_switch_splits_last_hour() {
    let dataset = Dataset {
        polls: vec![
            poll(1, StoreStatus::Inactive, chicago_monday(15, 30)),
            poll(1, StoreStatus::Active, chicago_monday(10, 0)),
        ],
        rules: vec![rule(1, 0, hm(9, 0), hm(17, 0))],
        timezones: vec![chicago_store(1)],
    };
    let report = builder(dataset).build_store(1, chicago_monday(16, 0));

    assert_eq!(report.last_hour.uptime_minutes(), 30.0);
    assert_eq!(report.last_hour.downtime_minutes(), 30.0);
}

#[test]
fn always_open_store_over_a_week() {
    let now = chicago_monday(12, 0);
    let dataset = Dataset {
        polls: vec![
            poll(2, StoreStatus::Active, now - 160 * HOUR_MS),
            poll(2, StoreStatus::Inactive, now - 10 * HOUR_MS),
        ],
        ..Dataset::default()
    };
    let report = builder(dataset).build_store(2, now);

    let week = report.last_week;
    assert_eq!(week.open_ms, 168 * HOUR_MS);
    // 前 8 小时无观测，状态未知
    assert_eq!(week.uptime_ms + week.downtime_ms, 160 * HOUR_MS);
    assert_eq!(week.uptime_ms, 150 * HOUR_MS);
    assert_eq!(week.downtime_ms, 10 * HOUR_MS);
    assert_eq!(report.last_day.downtime_ms, 10 * HOUR_MS);
    assert_eq!(report.last_day.uptime_ms, 14 * HOUR_MS);
}

#[test]
fn store_without_observations_reports_zero() {
    let dataset = Dataset {
        polls: vec![poll(1, StoreStatus::Active, chicago_monday(12, 0))],
        timezones: vec![chicago_store(1), chicago_store(3)],
        ..Dataset::default()
    };
    let builder = builder(dataset);
    assert_eq!(builder.store_ids(), &[1, 3]);

    let report = builder.build_store(3, chicago_monday(12, 0));
    for window in ReportWindow::ALL {
        let record = report.window(window);
        assert_eq!(record.uptime_ms, 0);
        assert_eq!(record.downtime_ms, 0);
        assert_eq!(record.open_ms, window.duration_ms());
    }
}

#[test]
fn observations_outside_business_hours_are_dropped() {
    let dataset = Dataset {
        polls: vec![poll(1, StoreStatus::Inactive, chicago_monday(8, 0))],
        rules: vec![rule(1, 0, hm(9, 0), hm(17, 0))],
        timezones: vec![chicago_store(1)],
    };
    let report = builder(dataset).build_store(1, chicago_monday(10, 0));
    assert_eq!(report.last_hour.open_ms, HOUR_MS);
    assert_eq!(report.last_hour.uptime_ms, 0);
    assert_eq!(report.last_hour.downtime_ms, 0);
}

#[test]
fn observation_inside_interval_counts_from_its_timestamp() {
    let dataset = Dataset {
        polls: vec![poll(1, StoreStatus::Active, chicago_monday(12, 0))],
        rules: vec![rule(1, 0, hm(9, 0), hm(17, 0))],
        timezones: vec![chicago_store(1)],
    };
    let report = builder(dataset).build_store(1, chicago_monday(17, 0));
    assert_eq!(report.last_hour.uptime_ms, HOUR_MS);
    // 周一部分：09:00-12:00 未知，12:00-17:00 在线
    assert_eq!(report.last_day.uptime_ms, 5 * HOUR_MS);
    assert_eq!(report.last_day.downtime_ms, 0);
}

#[test]
fn single_active_observation_leaves_leading_gap_unknown() {
    // 每天 09:00-17:00；唯一观测在周一 12:00，之前没有任何观测
    let dataset = Dataset {
        polls: vec![poll(1, StoreStatus::Active, chicago_monday(12, 0))],
        rules: (0..7).map(|day| rule(1, day, hm(9, 0), hm(17, 0))).collect(),
        timezones: vec![chicago_store(1)],
    };
    let report = builder(dataset).build_store(1, chicago_monday(20, 0));

    assert_eq!(report.last_hour.open_ms, 0);
    assert_eq!(report.last_day.open_ms, 8 * HOUR_MS);
    // 不向前猜测：[09:00, 12:00) 状态未知，只有 [12:00, 17:00) 计为在线
    assert_eq!(report.last_day.uptime_ms, 5 * HOUR_MS);
    assert_eq!(report.last_day.downtime_ms, 0);
    assert_eq!(report.last_week.uptime_ms, 5 * HOUR_MS);

    // 观测恰在开门时刻时，整段营业时间都在线
    let at_open = Dataset {
        polls: vec![poll(1, StoreStatus::Active, chicago_monday(9, 0))],
        rules: (0..7).map(|day| rule(1, day, hm(9, 0), hm(17, 0))).collect(),
        timezones: vec![chicago_store(1)],
    };
    let report = builder(at_open).build_store(1, chicago_monday(20, 0));
    assert_eq!(report.last_day.uptime_ms, 8 * HOUR_MS);
    assert_eq!(report.last_day.downtime_ms, 0);
}

#[test]
fn conflicting_polls_at_same_timestamp_later_input_wins() {
    let ts = chicago_monday(10, 0);
    let inactive_last = Dataset {
        polls: vec![
            poll(1, StoreStatus::Active, ts),
            poll(1, StoreStatus::Inactive, ts),
        ],
        ..Dataset::default()
    };
    let report = builder(inactive_last).build_store(1, ts + HOUR_MS);
    assert_eq!(report.last_hour.uptime_ms, 0);
    assert_eq!(report.last_hour.downtime_ms, HOUR_MS);

    let active_last = Dataset {
        polls: vec![
            poll(1, StoreStatus::Inactive, ts),
            poll(1, StoreStatus::Active, ts),
        ],
        ..Dataset::default()
    };
    let report = builder(active_last).build_store(1, ts + HOUR_MS);
    assert_eq!(report.last_hour.uptime_ms, HOUR_MS);
    assert_eq!(report.last_hour.downtime_ms, 0);
}

#[test]
fn multiple_rules_per_day() {
    let dataset = Dataset {
        polls: vec![
            poll(1, StoreStatus::Active, chicago_monday(8, 0)),
            // 午休时段的观测被丢弃
            poll(1, StoreStatus::Inactive, chicago_monday(13, 0)),
        ],
        rules: vec![
            rule(1, 0, hm(14, 0), hm(18, 0)),
            rule(1, 0, hm(8, 0), hm(12, 0)),
        ],
        timezones: vec![chicago_store(1)],
    };
    let report = builder(dataset).build_store(1, chicago_monday(18, 0));
    // 周日 18:00-24:00（全天默认）+ 周一 8 小时
    assert_eq!(report.last_day.open_ms, 14 * HOUR_MS);
    assert_eq!(report.last_day.uptime_ms, 8 * HOUR_MS);
    assert_eq!(report.last_day.downtime_ms, 0);
}

#[test]
fn unknown_timezone_falls_back_to_default() {
    let resolver = TimezoneResolver::new(
        &[
            StoreTimezone {
                store_id: 1,
                timezone: "Asia/Tokyo".to_string(),
            },
            StoreTimezone {
                store_id: 2,
                timezone: "Not/AZone".to_string(),
            },
        ],
        "America/Chicago",
    )
    .expect("resolver");
    assert_eq!(resolver.resolve(1), chrono_tz::Asia::Tokyo);
    assert_eq!(resolver.resolve(2), Chicago);
    assert_eq!(resolver.resolve(99), Chicago);

    assert!(TimezoneResolver::new(&[], "Not/AZone").is_err());
}

#[test]
fn builder_is_deterministic_and_bounded() {
    let now = chicago_monday(20, 0);
    let mut polls = Vec::new();
    let mut seed: u64 = 42;
    for store_id in 1..=6 {
        for _ in 0..80 {
            seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            let offset = (seed >> 33) as i64 % (170 * HOUR_MS);
            let status = if seed & 1 == 0 {
                StoreStatus::Active
            } else {
                StoreStatus::Inactive
            };
            polls.push(poll(store_id, status, now - offset));
        }
    }
    let mut rules = Vec::new();
    for day in 0..7 {
        rules.push(rule(1, day, hm(9, 0), hm(17, 0)));
        rules.push(rule(2, day, hm(6, 0), hm(10, 0)));
        rules.push(rule(2, day, hm(16, 0), hm(23, 59)));
    }
    rules.push(rule(3, 4, hm(0, 0), hm(23, 59)));
    let dataset = Dataset {
        polls,
        rules,
        timezones: vec![
            chicago_store(1),
            StoreTimezone {
                store_id: 2,
                timezone: "Asia/Kolkata".to_string(),
            },
            StoreTimezone {
                store_id: 4,
                timezone: "Europe/Berlin".to_string(),
            },
        ],
    };

    let builder = builder(dataset);
    let first = builder.build_report(now);
    let second = builder.build_report(now);
    assert_eq!(first, second);
    assert_eq!(first.stores.len(), 6);

    for store in &first.stores {
        for window in ReportWindow::ALL {
            let record = store.window(window);
            assert!(record.uptime_ms >= 0 && record.downtime_ms >= 0);
            assert!(record.uptime_ms + record.downtime_ms <= record.open_ms);
            assert!(record.open_ms <= window.duration_ms());
        }
        assert!(store.last_day.open_ms >= store.last_hour.open_ms);
        assert!(store.last_week.open_ms >= store.last_day.open_ms);
    }
}

#[test]
fn spring_forward_day_is_23_hours() {
    let resolver = TimezoneResolver::new(&[chicago_store(1)], "America/Chicago").expect("resolver");
    let index = BusinessHoursIndex::default();
    let intersector = Intersector::new(&resolver, &index);

    // 2024-03-10 02:00 CST -> 03:00 CDT
    let start = local_ms(Chicago, 2024, 3, 10, 0, 0);
    let end = local_ms(Chicago, 2024, 3, 11, 0, 0);
    let intervals = intersector.open_intervals(1, start, end);
    assert_eq!(intervals.len(), 1);
    assert_eq!(intervals[0].duration_ms(), 23 * HOUR_MS);
}

#[test]
fn fall_back_day_is_25_hours() {
    let resolver = TimezoneResolver::new(&[chicago_store(1)], "America/Chicago").expect("resolver");
    let index = BusinessHoursIndex::default();
    let intersector = Intersector::new(&resolver, &index);

    let start = local_ms(Chicago, 2024, 11, 3, 0, 0);
    let end = local_ms(Chicago, 2024, 11, 4, 0, 0);
    let intervals = intersector.open_intervals(1, start, end);
    assert_eq!(intervals.len(), 1);
    assert_eq!(intervals[0].duration_ms(), 25 * HOUR_MS);
}

#[test]
fn local_times_around_transitions() {
    let naive = |y, mo, d, h, mi| {
        NaiveDate::from_ymd_opt(y, mo, d)
            .expect("date")
            .and_time(hm(h, mi))
    };

    // 跳过的 02:30 按 CST 解释，等同 03:30 CDT
    assert_eq!(
        local_to_utc_ms(Chicago, naive(2024, 3, 10, 2, 30)),
        local_ms(Chicago, 2024, 3, 10, 3, 30)
    );

    // 重复的 01:30 取较早的 CDT 时刻（06:30 UTC）
    let ambiguous = local_to_utc_ms(Chicago, naive(2024, 11, 3, 1, 30));
    let expected = chrono::Utc
        .with_ymd_and_hms(2024, 11, 3, 6, 30, 0)
        .single()
        .expect("utc")
        .timestamp_millis();
    assert_eq!(ambiguous, expected);
}

#[test]
fn rule_inside_spring_forward_gap() {
    // 2024-03-10 为周日（weekday 6）
    let resolver = TimezoneResolver::new(&[chicago_store(1)], "America/Chicago").expect("resolver");
    let index = BusinessHoursIndex::from_rules(&[rule(1, 6, hm(2, 30), hm(4, 0))]);
    let intersector = Intersector::new(&resolver, &index);

    let start = local_ms(Chicago, 2024, 3, 10, 0, 0);
    let end = local_ms(Chicago, 2024, 3, 11, 0, 0);
    let intervals = intersector.open_intervals(1, start, end);
    assert_eq!(intervals.len(), 1);
    assert_eq!(intervals[0].start_ms, local_ms(Chicago, 2024, 3, 10, 3, 30));
    assert_eq!(intervals[0].duration_ms(), 30 * MINUTE_MS);
}

#[test]
fn observation_outside_projected_gap_interval_is_dropped() {
    // 周日规则 02:30-04:00 投影为 [03:30, 04:00) CDT；03:00 CDT 的本地时刻虽在规则内，
    // 但不在任何 UTC 营业区间内，不能延续到 03:30 之后
    let dataset = Dataset {
        polls: vec![poll(
            1,
            StoreStatus::Active,
            local_ms(Chicago, 2024, 3, 10, 3, 0),
        )],
        rules: vec![rule(1, 6, hm(2, 30), hm(4, 0))],
        timezones: vec![chicago_store(1)],
    };
    let report = builder(dataset).build_store(1, local_ms(Chicago, 2024, 3, 10, 4, 0));
    assert_eq!(report.last_hour.open_ms, 30 * MINUTE_MS);
    assert_eq!(report.last_hour.uptime_ms, 0);
    assert_eq!(report.last_hour.downtime_ms, 0);
}

#[test]
fn window_clips_and_merges_across_midnight() {
    let resolver = TimezoneResolver::new(&[], "America/Chicago").expect("resolver");
    let index = BusinessHoursIndex::default();
    let intersector = Intersector::new(&resolver, &index);

    let start = chicago_monday(20, 0);
    let end = start + 8 * HOUR_MS;
    let intervals = intersector.open_intervals(7, start, end);
    assert_eq!(intervals.len(), 1);
    assert_eq!(intervals[0].start_ms, start);
    assert_eq!(intervals[0].end_ms, end);

    assert!(intersector.open_intervals(7, end, start).is_empty());
}
