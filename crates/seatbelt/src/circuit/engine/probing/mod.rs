// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Probing mechanisms for circuit breakers.
//!
//! Probing is used to test if a service has recovered after a failure.
//! Different probing strategies can be implemented by implementing the `ProbeOperation` trait.
//!
//! - Various probes can be combined in sequence using the [`Probes`] struct.
//! - Unified view over various probe types is provided by the [`Probe`] enum.

use std::fmt::Debug;
use std::time::Instant;

use crate::circuit::{EnterCircuitResult, ExecutionMode, ExecutionResult};

mod health_probe;
mod options;
mod probes;
mod single_probe;

pub(crate) use health_probe::*;
pub(crate) use options::*;
pub(crate) use probes::*;
pub(crate) use single_probe::*;

/// Result of a probing attempt.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) enum ProbingResult {
    /// Probing succeeded, no more probing needed.
    Success,

    /// Probing failed, circuit should remain open.
    Failure,

    /// Probing is still in progress, more probes are needed.
    Pending,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) enum AllowProbeResult {
    Accepted,
    Rejected,
}

impl From<AllowProbeResult> for EnterCircuitResult {
    fn from(value: AllowProbeResult) -> Self {
        match value {
            AllowProbeResult::Accepted => Self::Accepted {
                mode: ExecutionMode::Probe,
            },
            AllowProbeResult::Rejected => Self::Rejected,
        }
    }
}

/// Trait defining the behavior of a probing mechanism in a circuit breaker.
pub(crate) trait ProbeOperation: Send + Sync + Debug + 'static {
    fn allow_probe(&mut self, now: Instant) -> AllowProbeResult;

    fn record(&mut self, result: ExecutionResult, now: Instant) -> ProbingResult;
}

/// View over multiple probe types.
#[derive(Debug)]
pub(crate) enum Probe {
    Single(SingleProbe),
    Health(HealthProbe),
}

impl Probe {
    pub fn new(options: ProbeOptions) -> Self {
        match options {
            ProbeOptions::SingleProbe { cooldown } => Self::Single(SingleProbe::new(cooldown)),
            ProbeOptions::HealthProbe(options) => Self::Health(HealthProbe::new(options)),
        }
    }
}

impl ProbeOperation for Probe {
    fn allow_probe(&mut self, now: Instant) -> AllowProbeResult {
        match self {
            Self::Single(probe) => probe.allow_probe(now),
            Self::Health(health) => health.allow_probe(now),
        }
    }

    /// Record the result of a probing attempt.
    ///
    /// Once the probe reports success or failure, it is considered complete and
    /// should never be used again.
    fn record(&mut self, result: ExecutionResult, now: Instant) -> ProbingResult {
        match self {
            Self::Single(probe) => probe.record(result, now),
            Self::Health(health) => health.record(result, now),
        }
    }
}
