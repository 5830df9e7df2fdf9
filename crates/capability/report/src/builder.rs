use crate::aggregate::aggregate;
use crate::business_hours::BusinessHoursIndex;
use crate::error::ReportError;
use crate::schedule::{Intersector, covers};
use crate::timezone::TimezoneResolver;
use domain::{
    BusinessHoursRule, Observation, Report, ReportWindow, StatusPoll, StoreId, StoreReport,
    StoreTimezone, UptimeDowntimeRecord,
};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;
use uptime_normalize::normalize_observation;

/// 一次报表计算使用的输入快照。
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub polls: Vec<StatusPoll>,
    pub rules: Vec<BusinessHoursRule>,
    pub timezones: Vec<StoreTimezone>,
}

impl Dataset {
    /// 参考时刻 `Now`：所有轮询中的最大时间戳。
    pub fn reference_now(&self) -> Option<i64> {
        self.polls.iter().map(|poll| poll.ts_ms).max()
    }

    /// 三张表中出现过的门店（升序）。
    pub fn store_ids(&self) -> Vec<StoreId> {
        let ids: BTreeSet<StoreId> = self
            .polls
            .iter()
            .map(|poll| poll.store_id)
            .chain(self.rules.iter().map(|rule| rule.store_id))
            .chain(self.timezones.iter().map(|tz| tz.store_id))
            .collect();
        ids.into_iter().collect()
    }
}

/// Report Builder：对每个门店计算三个窗口的 uptime/downtime，无副作用。
pub struct ReportBuilder {
    resolver: TimezoneResolver,
    index: BusinessHoursIndex,
    observations: HashMap<StoreId, Vec<Observation>>,
    store_ids: Vec<StoreId>,
    reference_now: Option<i64>,
}

impl ReportBuilder {
    pub fn new(dataset: Dataset, default_tz: &str) -> Result<Self, ReportError> {
        let resolver = TimezoneResolver::new(&dataset.timezones, default_tz)?;
        let index = BusinessHoursIndex::from_rules(&dataset.rules);
        let store_ids = dataset.store_ids();
        let reference_now = dataset.reference_now();

        let mut observations: HashMap<StoreId, Vec<Observation>> = HashMap::new();
        for poll in &dataset.polls {
            if let Some(obs) = normalize_observation(poll, resolver.resolve(poll.store_id)) {
                observations.entry(obs.store_id).or_default().push(obs);
            }
        }
        // 稳定排序：同一时间戳的冲突轮询保持输入顺序，后者生效
        for list in observations.values_mut() {
            list.sort_by_key(|obs| obs.ts_ms);
        }
        debug!(
            target: "uptime.report",
            stores = store_ids.len(),
            polls = dataset.polls.len(),
            "report_builder_ready"
        );

        Ok(Self {
            resolver,
            index,
            observations,
            store_ids,
            reference_now,
        })
    }

    pub fn reference_now(&self) -> Option<i64> {
        self.reference_now
    }

    pub fn store_ids(&self) -> &[StoreId] {
        &self.store_ids
    }

    pub fn build_store(&self, store_id: StoreId, now_ms: i64) -> StoreReport {
        let intersector = Intersector::new(&self.resolver, &self.index);
        let history_start_ms = ReportWindow::LastWeek.start_ms(now_ms);

        // 只保留落在营业区间（UTC 投影）内的观测，与汇总使用同一组区间
        let history = intersector.open_intervals(store_id, history_start_ms, now_ms);
        let observations: Vec<Observation> = self
            .observations
            .get(&store_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .filter(|obs| covers(&history, obs.ts_ms))
            .copied()
            .collect();

        let record = |window: ReportWindow| {
            let intervals = intersector.open_intervals(store_id, window.start_ms(now_ms), now_ms);
            let total = aggregate(&intervals, &observations, history_start_ms);
            UptimeDowntimeRecord {
                window,
                uptime_ms: total.uptime_ms,
                downtime_ms: total.downtime_ms,
                open_ms: total.open_ms,
            }
        };

        StoreReport {
            store_id,
            last_hour: record(ReportWindow::LastHour),
            last_day: record(ReportWindow::LastDay),
            last_week: record(ReportWindow::LastWeek),
        }
    }

    pub fn build_report(&self, now_ms: i64) -> Report {
        Report {
            now_ms,
            stores: self
                .store_ids
                .iter()
                .map(|store_id| self.build_store(*store_id, now_ms))
                .collect(),
        }
    }
}
