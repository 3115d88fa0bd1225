// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The boundary between the dispatcher core and whatever actually runs a call: a thread,
//! a child process, or a web worker. The dispatcher never knows which; it only ever holds
//! a [`WorkerHandle`].

use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::error::Result;
use crate::stats::WorkerCallStats;
use crate::task::{TaskOptions, TaskResolver};

/// A live worker as seen by the dispatcher core.
///
/// Implementations own the actual transport (thread, process, or web worker) and are
/// responsible for eventually settling every [`TaskResolver`] handed to `exec`, even on
/// crash — the dispatcher never re-queues a dispatched task itself.
#[cfg_attr(feature = "dyn-worker", dynosaur::dynosaur(pub DynWorkerHandle = dyn(box) WorkerHandle, bridge(none)))]
pub trait WorkerHandle: Send + Sync + Debug {
    /// Hands `method`/`params` to the underlying transport and settles `resolver` with
    /// the result once the call completes. The returned future resolves when the call
    /// has fully drained, which is what triggers the dispatcher's next `advance`.
    fn exec(
        &self,
        method: String,
        params: Vec<Value>,
        options: TaskOptions,
        resolver: TaskResolver,
    ) -> impl Future<Output = Result<()>> + Send;

    /// True if this worker may accept another call right now.
    fn available(&self) -> bool;

    /// True if this worker is currently executing at least one call.
    ///
    /// The default follows from `available`/`terminated`; transports whose concurrency
    /// model makes this cheaper to track directly may override it.
    fn busy(&self) -> bool {
        !self.available() && !self.terminated()
    }

    /// True once this worker has exited; it is never reused or re-entered.
    fn terminated(&self) -> bool;

    /// Ends the worker. When `force` is true, in-flight calls are aborted (their
    /// resolvers rejected); otherwise the worker is allowed to drain first.
    fn terminate(&self, force: bool) -> impl Future<Output = Result<()>> + Send;

    /// Same as `terminate`, with a hard deadline after which the worker is treated as
    /// gone regardless of whether it acknowledged.
    fn terminate_and_notify(
        &self,
        force: bool,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Identifying information the dispatcher surfaces through introspection but never
    /// interprets itself.
    fn descriptor(&self) -> &WorkerDescriptor;

    /// Call-timing counters for this worker, folded into the pool-wide
    /// [`crate::stats::WorkerStatsSummary`].
    ///
    /// Transports that don't track per-call timing can leave this at its default.
    fn call_stats(&self) -> WorkerCallStats {
        WorkerCallStats::default()
    }
}

impl<T> WorkerHandle for Arc<T>
where
    T: WorkerHandle,
{
    fn exec(
        &self,
        method: String,
        params: Vec<Value>,
        options: TaskOptions,
        resolver: TaskResolver,
    ) -> impl Future<Output = Result<()>> + Send {
        (**self).exec(method, params, options, resolver)
    }

    fn available(&self) -> bool {
        (**self).available()
    }

    fn busy(&self) -> bool {
        (**self).busy()
    }

    fn terminated(&self) -> bool {
        (**self).terminated()
    }

    fn terminate(&self, force: bool) -> impl Future<Output = Result<()>> + Send {
        (**self).terminate(force)
    }

    fn terminate_and_notify(&self, force: bool, timeout: Option<Duration>) -> impl Future<Output = Result<()>> + Send {
        (**self).terminate_and_notify(force, timeout)
    }

    fn descriptor(&self) -> &WorkerDescriptor {
        (**self).descriptor()
    }

    fn call_stats(&self) -> WorkerCallStats {
        (**self).call_stats()
    }
}

/// How the dispatcher should ask the [`WorkerFactory`] to stand up a worker's transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkerType {
    /// Let the factory pick based on its own defaults.
    #[default]
    Auto,
    /// Run on a plain OS thread within the current process.
    Thread,
    /// Run in a child process.
    Process,
    /// Run in a web worker (e.g. when embedded in a wasm host).
    Web,
}

/// Identifying information for a worker, surfaced by [`WorkerHandle::descriptor`].
///
/// The dispatcher never interprets these fields; it only requires `debug_port` to stay
/// unique among live workers so it can hand the value back out through introspection.
#[derive(Debug, Clone)]
pub struct WorkerDescriptor {
    /// The script or module the worker was started with, if any.
    pub script: Option<String>,
    /// Extra arguments passed to the process/thread entry point at fork time.
    pub fork_args: Vec<String>,
    /// Transport-specific fork options, passed through verbatim.
    pub fork_opts: serde_json::Map<String, Value>,
    /// The debug port allocated to this worker by the [`crate::debug_port::DebugPortAllocator`].
    pub debug_port: u16,
}

/// Pool-level parameters passed to [`WorkerFactory::create`], merged with any
/// per-call override supplied by an `on_create_worker` hook.
#[derive(Debug, Clone, Default)]
pub struct WorkerFactoryParams {
    /// Transport choice for the new worker.
    pub worker_type: WorkerType,
    /// Per-worker maximum number of in-flight calls, if bounded.
    pub concurrency: Option<usize>,
    /// Per-worker lifetime call cap, if bounded.
    pub max_exec: Option<usize>,
    /// If true, the worker is marked not-ready immediately after each call until the
    /// transport signals readiness again.
    pub mark_not_ready_after_exec: bool,
    /// How long to wait for a steady-state readiness signal before treating the worker
    /// as failed.
    pub ready_timeout: Option<Duration>,
    /// How long to wait for the worker's *first* readiness signal after fork, which may
    /// legitimately take longer than steady-state `ready_timeout`.
    pub init_ready_timeout: Option<Duration>,
    /// The debug port allocated for this worker; the factory passes it to the
    /// underlying transport so it can bind a debugger/inspector if one is supported.
    pub debug_port: u16,
}

/// Constructs worker transports on behalf of the dispatcher.
///
/// Supplied by the embedder; the dispatcher calls `create` once per worker it needs to
/// spawn, whether to satisfy `min_workers` at construction or to grow the pool under
/// load.
pub trait WorkerFactory: Send + Sync {
    /// The concrete worker handle this factory produces.
    type Handle: WorkerHandle + 'static;

    /// Builds one new worker from the given parameters.
    fn create(&self, params: WorkerFactoryParams) -> impl Future<Output = Result<Self::Handle>> + Send;
}
