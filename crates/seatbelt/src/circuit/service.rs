// Copyright (c) Microsoft Corporation.

use std::ops::ControlFlow;

use layered::Service;
use tick::Clock;

use super::{
    CircuitLayer, CircuitEngine, Engines, EnterCircuitResult, ExecutionMode, ExecutionResult, ExitCircuitResult, OnClosed,
    OnClosedArgs, OnOpened, OnOpenedArgs, OnProbing, OnProbingArgs, PartionKeyProvider, PartitionKey, RecoveryArgs, RejectedInput,
    RejectedInputArgs, ShouldRecover,
};
use crate::{EnableIf, NotSet};

/// Applies circuit breaker logic to prevent cascading failures.
///
/// `Circuit` wraps an inner [`Service`] and monitors the success and failure rates
/// of operations. When the failure rate exceeds a configured threshold, the circuit breaker opens
/// and temporarily blocks requests to give the downstream service time to recover.
///
/// This middleware is designed to be used across services, applications, and libraries
/// to prevent cascading failures in distributed systems.
///
/// `Circuit` is configured by calling [`Circuit::layer`] and using the
/// builder methods on the returned [`CircuitLayer`] instance.
///
/// For comprehensive examples and usage patterns, see the [`circuit_breaker` module][crate::circuit] documentation.
#[derive(Debug)]
pub struct Circuit<In, Out, S> {
    pub(super) inner: S,
    pub(super) clock: Clock,
    pub(super) recovery: ShouldRecover<Out>,
    pub(super) rejected_input: RejectedInput<In, Out>,
    pub(super) enable_if: EnableIf<In>,
    pub(super) engines: Engines,
    pub(super) partition_key: Option<PartionKeyProvider<In>>,
    pub(super) on_opened: Option<OnOpened<Out>>,
    pub(super) on_closed: Option<OnClosed<Out>>,
    pub(super) on_probing: Option<OnProbing<In>>,
}

impl<In, Out> Circuit<In, Out, ()> {
    /// Creates a new circuit breaker layer with the specified name and options.
    ///
    /// Returns a [`CircuitLayer`] that must be configured with required parameters
    /// before it can be used to build a circuit breaker service.
    pub fn layer(
        name: impl Into<std::borrow::Cow<'static, str>>,
        options: &crate::SeatbeltOptions<In, Out>,
    ) -> CircuitLayer<In, Out, NotSet, NotSet> {
        CircuitLayer::new(name.into().into(), options)
    }
}

impl<In, Out: Send, S> Service<In> for Circuit<In, Out, S>
where
    In: Send,
    S: Service<In, Out = Out>,
{
    type Out = Out;

    async fn execute(&self, input: In) -> Self::Out {
        // Check if a circuit breaker is enabled for this input
        if !self.enable_if.call(&input) {
            return self.inner.execute(input).await;
        }

        // Determine the partition key for this input
        let partition_key = self
            .partition_key
            .as_ref()
            .map_or_else(PartitionKey::default, |partition_key| partition_key.call(&input));

        // Retrieve the engine for this partition
        let engine = self.engines.get_engine(&partition_key);

        // Before
        let (input, mode) = match self.before_execute(engine.as_ref(), input, &partition_key) {
            ControlFlow::Continue(input) => input,
            ControlFlow::Break(output) => return output,
        };

        // Execute the inner service
        let output = self.inner.execute(input).await;

        // After
        self.after_execute(engine.as_ref(), &output, mode, &partition_key);

        output
    }
}

impl<In, Out, S> Circuit<In, Out, S> {
    #[inline]
    fn before_execute(
        &self,
        engine: &impl CircuitEngine,
        mut input: In,
        partition_key: &PartitionKey,
    ) -> ControlFlow<Out, (In, ExecutionMode)> {
        // Try to enter the circuit
        match engine.enter() {
            EnterCircuitResult::Accepted { mode } => {
                match mode {
                    // regular execution, do nothing special
                    ExecutionMode::Normal => ControlFlow::Continue((input, ExecutionMode::Normal)),
                    // This is a probing execution that happens when the circuit is half-open.
                    // Invoke the on_probing callback if configured.
                    ExecutionMode::Probe => {
                        if let Some(on_probing) = &self.on_probing {
                            on_probing.call(&mut input, OnProbingArgs { partition_key });
                        }

                        ControlFlow::Continue((input, ExecutionMode::Probe))
                    }
                }
            }
            // Circuit is open, return rejected input output
            EnterCircuitResult::Rejected => ControlFlow::Break(self.rejected_input.call(input, RejectedInputArgs { partition_key })),
        }
    }

    fn after_execute(&self, engine: &impl CircuitEngine, output: &Out, mode: ExecutionMode, partition_key: &PartitionKey) {
        let recovery = self.recovery.call(
            output,
            RecoveryArgs {
                partition_key,
                clock: &self.clock,
            },
        );

        // Evaluate the execution result based on recovery decision
        let execution_result = ExecutionResult::from_recovery(&recovery);

        // Exit the circuit and handle state transitions
        match engine.exit(execution_result, mode) {
            ExitCircuitResult::Unchanged | ExitCircuitResult::Reopened => {
                // we explicitly do nothing here
            }
            ExitCircuitResult::Opened(_health) => {
                if let Some(on_opened) = &self.on_opened {
                    on_opened.call(output, OnOpenedArgs { partition_key });
                }
            }
            ExitCircuitResult::Closed(stats) => {
                if let Some(on_closed) = &self.on_closed {
                    on_closed.call(
                        output,
                        OnClosedArgs {
                            partition_key,
                            open_duration: stats.opened_duration(self.clock.instant()),
                        },
                    );
                }
            }
        }
    }
}
