// Copyright (c) Microsoft Corporation.

use std::time::Instant;
use std::vec;

use super::{AllowProbeResult, Probe, ProbeOperation, ProbeOptions, ProbesOptions, ProbingResult};
use crate::circuit_breaker::ExecutionResult;

/// Manages a sequence of probes.
#[derive(Debug)]
pub(crate) struct Probes {
    probes: vec::IntoIter<ProbeOptions>,
    current: Probe,
}

impl Probes {
    pub fn new(options: &ProbesOptions) -> Self {
        let mut probes = options.probes();
        let probe = probes.next().expect("probes are never empty because ProbesOptions enforces that");

        Self {
            probes,
            current: Probe::new(probe),
        }
    }

    pub fn allow_probe(&mut self, now: Instant) -> AllowProbeResult {
        self.current.allow_probe(now)
    }

    pub fn record(&mut self, result: ExecutionResult, now: Instant) -> ProbingResult {
        match self.current.record(result, now) {
            ProbingResult::Success => {
                // check if there are more probes to try
                match self.probes.next() {
                    Some(probe) => {
                        self.current = Probe::new(probe);
                        ProbingResult::Pending
                    }
                    None => ProbingResult::Success,
                }
            }
            ProbingResult::Pending => ProbingResult::Pending,
            ProbingResult::Failure => ProbingResult::Failure,
        }
    }
}
