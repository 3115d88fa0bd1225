// Copyright (c) Microsoft Corporation.

pub(super) const CIRCUIT_OPENED_EVENT_NAME: &str = "circuit_opened";
pub(super) const CIRCUIT_CLOSED_EVENT_NAME: &str = "circuit_closed";
pub(super) const CIRCUIT_REJECTED_EVENT_NAME: &str = "circuit_rejected";
pub(super) const CIRCUIT_PROBE_EVENT_NAME: &str = "circuit_probe";
pub(super) const CIRCUIT_STATE: &str = "resilience.circuit_breaker.state";
pub(super) const CIRCUIT_PROBE_RESULT: &str = "resilience.circuit_breaker.probe.result";
pub(super) const CIRCUIT_PARTITION: &str = "resilience.circuit_breaker.partition";
