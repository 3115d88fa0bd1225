// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;
use std::vec::IntoIter;

use crate::circuit::HealthMetricsBuilder;

/// The minimum throughput during probing stage is set to 1, so at least one request must come
/// through in each probing stage to evaluate the health.
const MIN_THROUGHPUT: u32 = 1;

/// Options for a single probe type.
#[derive(Debug, Clone)]
pub(crate) enum ProbeOptions {
    /// A single probe that allows one probe.
    ///
    /// After the initial probe is allowed, it enters a cool-down period during which
    /// no further probes are allowed.
    SingleProbe { cooldown: Duration },

    /// A health-based probe that uses health metrics to determine the health of the system.
    HealthProbe(HealthProbeOptions),
}

/// Configuration options for the probing mechanism.
#[derive(Debug, Clone)]
pub(crate) struct ProbesOptions {
    probes: Vec<ProbeOptions>,
}

impl ProbesOptions {
    pub fn quick(cooldown: Duration) -> Self {
        Self::new([ProbeOptions::SingleProbe { cooldown }])
    }

    pub fn reliable(stage_duration: Duration, failure_threshold: f32) -> Self {
        Self::gradual(&[0.001, 0.01, 0.05, 0.1, 0.25, 0.5], stage_duration, failure_threshold)
    }

    pub fn gradual(probing_ratio: &[f64], stage_duration: Duration, failure_threshold: f32) -> Self {
        // Start with a single probe
        let initial = std::iter::once(ProbeOptions::SingleProbe { cooldown: stage_duration });

        // Then continue with health-based probes
        let health = probing_ratio
            .iter()
            .map(|probing_ratio| ProbeOptions::HealthProbe(HealthProbeOptions::new(stage_duration, failure_threshold, *probing_ratio)));

        Self::new(initial.chain(health))
    }

    pub fn new(probes: impl IntoIterator<Item = ProbeOptions>) -> Self {
        let probes: Vec<ProbeOptions> = probes.into_iter().collect();
        assert!(!probes.is_empty(), "the probes list cannot be empty");
        Self { probes }
    }

    pub fn probes(&self) -> IntoIter<ProbeOptions> {
        self.probes.clone().into_iter()
    }
}

#[derive(Debug, Clone)]
pub struct HealthProbeOptions {
    pub(super) builder: HealthMetricsBuilder,
    pub(super) probing_ratio: f64,
}

impl HealthProbeOptions {
    pub fn new(stage_duration: Duration, failure_threshold: f32, probing_ratio: f64) -> Self {
        assert!(probing_ratio > 0.0 && probing_ratio <= 1.0, "probing_ratio must be in (0.0, 1.0]");
        assert!((0.0..1.0).contains(&failure_threshold), "failure_threshold must be in [0.0, 1.0)");
        assert!(stage_duration > Duration::ZERO, "stage_duration must be greater than zero");

        Self {
            // The min throughput is set to 0, so if no requests come in during the probing stage,
            // the health will be considered healthy by default.
            builder: HealthMetricsBuilder::new(stage_duration, failure_threshold, MIN_THROUGHPUT),
            probing_ratio,
        }
    }

    pub fn stage_duration(&self) -> Duration {
        self.builder.sampling_duration
    }

    #[cfg(test)]
    pub fn failure_threshold(&self) -> f32 {
        self.builder.failure_threshold
    }
}
