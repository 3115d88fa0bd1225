// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;

use tick::Clock;

pub(crate) const DEFAULT_PIPELINE_NAME: &str = "default";

/// Shared configuration and dependencies for a pipeline of resilience middleware.
///
/// Pass a single `PipelineContext` to all middleware in a pipeline (retry, timeout,
/// circuit breaker, etc.) to share a clock and telemetry configuration.
#[derive(Debug)]
#[non_exhaustive]
pub struct PipelineContext<In, Out> {
    clock: Clock,
    name: Cow<'static, str>,
    #[cfg(any(feature = "metrics", test))]
    meter: Option<opentelemetry::metrics::Meter>,
    logs_enabled: bool,
    _in: std::marker::PhantomData<fn() -> In>,
    _out: std::marker::PhantomData<fn() -> Out>,
}

impl<In, Out> PipelineContext<In, Out> {
    /// Create a context with a clock. Initializes with `name = "default"`.
    pub fn new(clock: impl AsRef<Clock>) -> Self {
        Self {
            clock: clock.as_ref().clone(),
            name: Cow::Borrowed(DEFAULT_PIPELINE_NAME),
            #[cfg(any(feature = "metrics", test))]
            meter: None,
            logs_enabled: false,
            _in: std::marker::PhantomData,
            _out: std::marker::PhantomData,
        }
    }

    /// Get the configured clock for timing operations.
    #[must_use]
    #[cfg(any(feature = "retry", feature = "circuit", feature = "timeout", test))]
    pub(crate) fn get_clock(&self) -> &Clock {
        &self.clock
    }

    /// Set the pipeline name for telemetry correlation. Prefer `snake_case`.
    #[must_use]
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Enable metrics reporting with the given OpenTelemetry meter provider.
    #[must_use]
    #[cfg(any(feature = "metrics", test))]
    pub fn enable_metrics(self, provider: &dyn opentelemetry::metrics::MeterProvider) -> Self {
        Self {
            meter: Some(crate::metrics::create_meter(provider)),
            ..self
        }
    }

    /// Enable structured logging for resilience events.
    #[must_use]
    #[cfg(any(feature = "logs", test))]
    pub fn enable_logs(self) -> Self {
        Self {
            logs_enabled: true,
            ..self
        }
    }

    #[cfg_attr(
        not(any(feature = "metrics", feature = "logs", test)),
        expect(unused_variables, reason = "unused when logs nor metrics are used")
    )]
    #[cfg(any(feature = "retry", feature = "circuit", feature = "timeout", test))]
    pub(crate) fn create_telemetry(&self, strategy_name: Cow<'static, str>) -> crate::utils::TelemetryHelper {
        crate::utils::TelemetryHelper {
            #[cfg(any(feature = "metrics", test))]
            event_reporter: self.meter.as_ref().map(crate::metrics::create_resilience_event_counter),
            #[cfg(any(feature = "metrics", feature = "logs", test))]
            pipeline_name: self.name.clone(),
            #[cfg(any(feature = "metrics", feature = "logs", test))]
            strategy_name,
            #[cfg(any(feature = "logs", test))]
            logs_enabled: self.logs_enabled,
        }
    }
}

impl<In, Out> Clone for PipelineContext<In, Out> {
    fn clone(&self) -> Self {
        Self {
            clock: self.clock.clone(),
            name: self.name.clone(),
            #[cfg(any(feature = "metrics", test))]
            meter: self.meter.clone(),
            _in: std::marker::PhantomData,
            _out: std::marker::PhantomData,
            logs_enabled: self.logs_enabled,
        }
    }
}
