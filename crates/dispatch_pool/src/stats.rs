// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Introspection types returned by [`crate::Dispatcher::stats`] and
//! [`crate::Dispatcher::worker_stats`].

use std::time::Duration;

/// A snapshot of the pool's current shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Total number of live workers.
    pub total_workers: usize,
    /// Workers currently executing at least one call.
    pub busy_workers: usize,
    /// Workers that may accept another call right now.
    pub available_workers: usize,
    /// `total_workers - busy_workers`.
    pub idle_workers: usize,
    /// Tasks still waiting in the queue.
    pub pending_tasks: usize,
    /// Tasks currently handed to a worker (equal to `busy_workers`).
    pub active_tasks: usize,
}

/// Per-worker call counters, folded into [`WorkerStatsSummary`] by summation or
/// min/max reduction across the live worker set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkerCallStats {
    /// Number of calls this worker has completed.
    pub request_count: u64,
    /// Total time this worker has spent executing calls.
    pub total_time: Duration,
    /// Duration of this worker's fastest completed call.
    pub min_time: Duration,
    /// Duration of this worker's slowest completed call.
    pub max_time: Duration,
    /// Duration of this worker's most recently completed call.
    pub last_time: Duration,
}

/// Aggregated call statistics across the whole pool, plus pool size and readiness.
///
/// `min_time`/`max_time`/`last_time` are reductions across workers that have completed
/// at least one call. Unlike the distilled spec this is built from (which seeds the
/// running minimum at zero and so reports zero whenever *any* worker is idle),
/// `min_time` here starts at [`Duration::MAX`] and is only ever lowered by an observed
/// call, so it reports an actual minimum — or [`Duration::ZERO`] when no worker has
/// completed a call yet. See `DESIGN.md` for the rationale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStatsSummary {
    /// Total live workers, independent of readiness.
    pub worker_count: usize,
    /// Workers currently accepting calls.
    pub ready_workers: usize,
    /// Sum of `request_count` across all workers.
    pub total_requests: u64,
    /// Sum of `total_time` across all workers.
    pub total_time: Duration,
    /// Smallest `min_time` among workers that have completed a call, or
    /// [`Duration::ZERO`] if none have.
    pub min_time: Duration,
    /// Largest `max_time` among all workers, or [`Duration::ZERO`] if none have
    /// completed a call.
    pub max_time: Duration,
    /// `last_time` of whichever worker completed a call most recently, or
    /// [`Duration::ZERO`] if none have.
    pub last_time: Duration,
}

impl WorkerStatsSummary {
    pub(crate) fn reduce(per_worker: &[WorkerCallStats], ready_workers: usize) -> Self {
        let worker_count = per_worker.len();
        let mut total_requests = 0u64;
        let mut total_time = Duration::ZERO;
        let mut min_time = Duration::MAX;
        let mut max_time = Duration::ZERO;
        let mut last_time = Duration::ZERO;

        for stats in per_worker {
            total_requests += stats.request_count;
            total_time += stats.total_time;
            if stats.request_count > 0 {
                min_time = min_time.min(stats.min_time);
                max_time = max_time.max(stats.max_time);
                last_time = stats.last_time;
            }
        }

        if min_time == Duration::MAX {
            min_time = Duration::ZERO;
        }

        Self {
            worker_count,
            ready_workers,
            total_requests,
            total_time,
            min_time,
            max_time,
            last_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pool_reports_zeroed_summary() {
        let summary = WorkerStatsSummary::reduce(&[], 0);
        assert_eq!(summary.min_time, Duration::ZERO);
        assert_eq!(summary.max_time, Duration::ZERO);
        assert_eq!(summary.total_requests, 0);
    }

    #[test]
    fn min_time_is_not_dragged_to_zero_by_an_idle_worker() {
        let busy = WorkerCallStats {
            request_count: 3,
            total_time: Duration::from_millis(300),
            min_time: Duration::from_millis(80),
            max_time: Duration::from_millis(150),
            last_time: Duration::from_millis(90),
        };
        let idle = WorkerCallStats::default();

        let summary = WorkerStatsSummary::reduce(&[busy, idle], 2);
        assert_eq!(summary.min_time, Duration::from_millis(80));
        assert_eq!(summary.max_time, Duration::from_millis(150));
        assert_eq!(summary.total_requests, 3);
    }
}
