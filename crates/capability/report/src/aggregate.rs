use crate::schedule::UtcInterval;
use domain::{Observation, StoreStatus};

/// 单窗口汇总结果（毫秒）。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Aggregate {
    pub uptime_ms: i64,
    pub downtime_ms: i64,
    pub open_ms: i64,
}

impl Aggregate {
    fn add(&mut self, status: Option<StoreStatus>, duration_ms: i64) {
        match status {
            Some(StoreStatus::Active) => self.uptime_ms += duration_ms,
            Some(StoreStatus::Inactive) => self.downtime_ms += duration_ms,
            None => {}
        }
    }
}

/// Extrapolation Aggregator：阶跃插值（最近观测值向后延续）。
///
/// `observations` 须按 `ts_ms` 升序；早于 `history_start_ms` 的观测不参与计算。
/// 区间起点之前没有观测的部分状态未知，既不计入 uptime 也不计入 downtime。
pub fn aggregate(
    intervals: &[UtcInterval],
    observations: &[Observation],
    history_start_ms: i64,
) -> Aggregate {
    let first = observations.partition_point(|obs| obs.ts_ms < history_start_ms);
    let scoped = &observations[first..];

    let mut total = Aggregate::default();
    for interval in intervals {
        total.open_ms += interval.duration_ms();

        let mut next = scoped.partition_point(|obs| obs.ts_ms <= interval.start_ms);
        let mut status = next.checked_sub(1).map(|idx| scoped[idx].status);
        let mut cursor = interval.start_ms;
        while let Some(obs) = scoped.get(next) {
            if obs.ts_ms >= interval.end_ms {
                break;
            }
            total.add(status, obs.ts_ms - cursor);
            cursor = obs.ts_ms;
            status = Some(obs.status);
            next += 1;
        }
        total.add(status, interval.end_ms - cursor);
    }
    total
}
