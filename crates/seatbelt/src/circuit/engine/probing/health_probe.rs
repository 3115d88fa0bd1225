// Copyright (c) Microsoft Corporation.

use std::time::Instant;

use crate::circuit::engine::probing::{AllowProbeResult, HealthProbeOptions, ProbeOperation, ProbingResult};
use crate::circuit::{ExecutionResult, HealthMetrics, HealthStatus};
use crate::rnd::Rnd;

#[derive(Debug)]
pub(crate) struct HealthProbe {
    options: HealthProbeOptions,
    metrics: HealthMetrics,
    fallback_after: Option<Instant>,
    sample_until: Option<Instant>,
    rnd: Rnd,
}

impl ProbeOperation for HealthProbe {
    fn allow_probe(&mut self, now: Instant) -> AllowProbeResult {
        // Sampling starts with the first probe attempt. Make sure relevant timestamps are set.
        let sample_until = *self.sample_until.get_or_insert_with(|| now + self.options.stage_duration());

        // Fallback probe is allowed only after the sampling duration has elapsed.
        let fallback_after = *self.fallback_after.get_or_insert(sample_until);

        // Allow probe based on the probing ratio.
        if self.rnd.next_f64() < self.options.probing_ratio {
            return AllowProbeResult::Accepted;
        }

        // Allow fallback probe to get through if we are past the sampling duration.
        // This can happen if the traffic is very low and no probes were allowed
        // by the rate sampling. This allows making progress in low-traffic scenarios
        // as a last resort.
        if now > fallback_after {
            // Allow additional fallback probes only after another sampling duration
            // in case allowed probe did not result in a recorded execution (e.g., due to timeout).
            self.fallback_after = Some(now + self.options.stage_duration());
            return AllowProbeResult::Accepted;
        }

        AllowProbeResult::Rejected
    }

    fn record(&mut self, result: ExecutionResult, now: Instant) -> ProbingResult {
        // Always record the result
        self.metrics.record(result, now);

        // If we are still sampling, we cannot make a decision yet
        if self.keep_sampling(now) {
            return ProbingResult::Pending;
        }

        // Sampling duration elapsed, use the health metrics to determine the result
        match self.metrics.health_info().status() {
            HealthStatus::Healthy => ProbingResult::Success,
            HealthStatus::Unhealthy => ProbingResult::Failure,
        }
    }
}

impl HealthProbe {
    pub fn new(options: HealthProbeOptions) -> Self {
        Self {
            metrics: options.builder.build(),
            options,
            fallback_after: None,
            sample_until: None,
            rnd: Rnd::Real,
        }
    }

    fn keep_sampling(&self, now: Instant) -> bool {
        match self.sample_until {
            None => true,
            Some(until) if now < until => true,
            _ => false,
        }
    }
}
