// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The dispatcher itself: construction, the submit/terminate/introspection surface, and
//! the private actor that owns the queue and worker set.
//!
//! The dispatcher's mutable state is owned by a single async task (the "actor"), driven
//! by an mpsc command channel. Every public method on [`Dispatcher`] is a thin client
//! that sends a command and awaits a reply, so the state is never touched from two
//! call-sites concurrently even though `Dispatcher` itself may be shared freely.

use std::collections::{HashMap, VecDeque};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use crate::debug_port::DebugPortAllocator;
use crate::error::{DispatchError, Result as DispatchResult};
use crate::method::Method;
use crate::stats::{PoolStats, WorkerCallStats, WorkerStatsSummary};
use crate::task::{self, TaskOptions, TaskRecord};
use crate::worker::{DynWorkerHandle, WorkerDescriptor, WorkerFactory, WorkerFactoryParams, WorkerHandle, WorkerType};

pub use crate::task::TaskHandle;

/// A hook invoked just before a worker is created, given the pool-level factory
/// parameters and returning the parameters actually used. The identity hook
/// (`|p| p`) is the default.
pub type CreateWorkerHook = Arc<dyn Fn(WorkerFactoryParams) -> WorkerFactoryParams + Send + Sync>;

/// A hook invoked after a worker has been removed and terminated, given its descriptor.
pub type TerminateWorkerHook = Arc<dyn Fn(&WorkerDescriptor) + Send + Sync>;

/// How many workers the pool keeps alive at minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinWorkers {
    /// Keep exactly `n` workers alive (raising `max_workers` at construction time if
    /// `n` exceeds it).
    Fixed(usize),
    /// Track `max_workers`: the pool always keeps itself fully scaled up.
    MatchMax,
}

impl MinWorkers {
    fn resolve(self, max_workers: usize) -> usize {
        match self {
            Self::Fixed(n) => n,
            Self::MatchMax => max_workers,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WorkerId(u64);

struct WorkerEntry {
    id: WorkerId,
    handle: Arc<DynWorkerHandle<'static>>,
}

/// A callable bound to one worker-exposed method name, returned by
/// [`Dispatcher::proxy`].
#[derive(Clone)]
pub struct MethodProxy {
    name: String,
    cmd_tx: mpsc::Sender<Command>,
}

impl MethodProxy {
    /// Submits a call to this method, equivalent to `Dispatcher::submit(name, ...)`.
    pub async fn call(&self, params: Vec<Value>, options: TaskOptions) -> DispatchResult<TaskHandle> {
        submit_named(&self.cmd_tx, self.name.clone(), params, options).await
    }
}

impl std::fmt::Debug for MethodProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodProxy").field("name", &self.name).finish_non_exhaustive()
    }
}

enum Command {
    Submit {
        method: String,
        params: Vec<Value>,
        options: TaskOptions,
        reply: oneshot::Sender<DispatchResult<TaskHandle>>,
    },
    Stats(oneshot::Sender<PoolStats>),
    WorkerStats(oneshot::Sender<WorkerStatsSummary>),
    AvailableWorkerCount(oneshot::Sender<usize>),
    Terminate {
        force: bool,
        timeout: Option<Duration>,
        reply: oneshot::Sender<()>,
    },
    ExecSettled {
        worker_id: WorkerId,
        failed: bool,
    },
    /// Sent by the gradual-scaling gate timer once it reopens, so a task left queued
    /// behind a saturated pool gets a chance to trigger growth instead of waiting for
    /// the next unrelated submit or worker settlement.
    GateReopened,
}

async fn submit_named(
    cmd_tx: &mpsc::Sender<Command>,
    method: String,
    params: Vec<Value>,
    options: TaskOptions,
) -> DispatchResult<TaskHandle> {
    let (reply, rx) = oneshot::channel();
    cmd_tx
        .send(Command::Submit { method, params, options, reply })
        .await
        .map_err(|_| DispatchError::PoolTerminated)?;
    rx.await.map_err(|_| DispatchError::PoolTerminated)?
}

/// Builds a [`Dispatcher`] from a [`WorkerFactory`] and pool-shape configuration.
pub struct PoolBuilder<F> {
    factory: F,
    max_workers: Option<NonZeroUsize>,
    min_workers: MinWorkers,
    max_queue_size: Option<usize>,
    gradual_scaling: Option<Duration>,
    round_robin: bool,
    worker_type: WorkerType,
    concurrency: Option<usize>,
    max_exec: Option<usize>,
    mark_not_ready_after_exec: bool,
    ready_timeout: Option<Duration>,
    init_ready_timeout: Option<Duration>,
    debug_port_start: u16,
    on_create_worker: Option<CreateWorkerHook>,
    on_terminate_worker: Option<TerminateWorkerHook>,
    spawner: Option<anyspawn::Spawner>,
}

impl<F> PoolBuilder<F>
where
    F: WorkerFactory + 'static,
{
    pub(crate) fn new(factory: F) -> Self {
        Self {
            factory,
            max_workers: None,
            min_workers: MinWorkers::Fixed(0),
            max_queue_size: None,
            gradual_scaling: None,
            round_robin: false,
            worker_type: WorkerType::Auto,
            concurrency: None,
            max_exec: None,
            mark_not_ready_after_exec: false,
            ready_timeout: None,
            init_ready_timeout: None,
            debug_port_start: 9229,
            on_create_worker: None,
            on_terminate_worker: None,
            spawner: None,
        }
    }

    /// Caps the number of live workers. Defaults to `max(available_parallelism - 1, 1)`.
    #[must_use]
    pub const fn max_workers(mut self, max_workers: NonZeroUsize) -> Self {
        self.max_workers = Some(max_workers);
        self
    }

    /// Sets the minimum number of workers the pool keeps alive. Defaults to
    /// `MinWorkers::Fixed(0)`.
    #[must_use]
    pub const fn min_workers(mut self, min_workers: MinWorkers) -> Self {
        self.min_workers = min_workers;
        self
    }

    /// Bounds the queue. Submissions beyond this depth fail synchronously with
    /// `DispatchError::QueueFull`. Defaults to unbounded.
    #[must_use]
    pub const fn max_queue_size(mut self, max_queue_size: usize) -> Self {
        self.max_queue_size = Some(max_queue_size);
        self
    }

    /// Limits worker creation to at most one per `window`, gated by a single flag armed
    /// by a timer. Defaults to unthrottled growth.
    #[must_use]
    pub const fn gradual_scaling(mut self, window: Duration) -> Self {
        self.gradual_scaling = Some(window);
        self
    }

    /// Enables round-robin selection for tasks without affinity. Defaults to `false`
    /// (first-available scan).
    #[must_use]
    pub const fn round_robin(mut self, round_robin: bool) -> Self {
        self.round_robin = round_robin;
        self
    }

    /// Sets the transport kind passed to the worker factory. Defaults to `Auto`.
    #[must_use]
    pub const fn worker_type(mut self, worker_type: WorkerType) -> Self {
        self.worker_type = worker_type;
        self
    }

    /// Sets the per-worker in-flight call cap passed to the worker factory.
    #[must_use]
    pub const fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    /// Sets the per-worker lifetime call cap passed to the worker factory.
    #[must_use]
    pub const fn max_exec(mut self, max_exec: usize) -> Self {
        self.max_exec = Some(max_exec);
        self
    }

    /// Marks workers not-ready immediately after each call, until the transport signals
    /// readiness again.
    #[must_use]
    pub const fn mark_not_ready_after_exec(mut self, value: bool) -> Self {
        self.mark_not_ready_after_exec = value;
        self
    }

    /// Sets the steady-state readiness timeout passed to the worker factory.
    #[must_use]
    pub const fn ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = Some(timeout);
        self
    }

    /// Sets the initial readiness timeout passed to the worker factory.
    #[must_use]
    pub const fn init_ready_timeout(mut self, timeout: Duration) -> Self {
        self.init_ready_timeout = Some(timeout);
        self
    }

    /// Sets the base port that the `DebugPortAllocator` starts searching from.
    /// Defaults to `9229`.
    #[must_use]
    pub const fn debug_port_start(mut self, base: u16) -> Self {
        self.debug_port_start = base;
        self
    }

    /// Installs a hook run just before a worker is created; it may override the
    /// factory parameters.
    #[must_use]
    pub fn on_create_worker(mut self, hook: CreateWorkerHook) -> Self {
        self.on_create_worker = Some(hook);
        self
    }

    /// Installs a hook run after a worker has been removed and terminated.
    #[must_use]
    pub fn on_terminate_worker(mut self, hook: TerminateWorkerHook) -> Self {
        self.on_terminate_worker = Some(hook);
        self
    }

    /// Overrides the spawner used for the dispatcher's actor loop and internal timers.
    /// Defaults to `anyspawn::Spawner::new_tokio()`.
    #[must_use]
    pub fn spawner(mut self, spawner: anyspawn::Spawner) -> Self {
        self.spawner = Some(spawner);
        self
    }

    /// Builds the dispatcher, spawning its actor task and, if `min_workers` is set,
    /// synchronously scaling up to meet it before returning.
    pub async fn build(self) -> DispatchResult<Dispatcher> {
        let default_max = NonZeroUsize::new(
            std::thread::available_parallelism().map(NonZeroUsize::get).unwrap_or(2).saturating_sub(1).max(1),
        )
        .expect("max(.., 1) is never zero");

        let mut max_workers = self.max_workers.unwrap_or(default_max);
        if let MinWorkers::Fixed(n) = self.min_workers {
            if n > max_workers.get() {
                max_workers = NonZeroUsize::new(n).expect("n > max_workers.get() >= 1 implies n >= 1");
            }
        }

        let spawner = self.spawner.unwrap_or_else(anyspawn::Spawner::new_tokio);
        let (cmd_tx, cmd_rx) = mpsc::channel(64);

        let mut state = PoolState {
            factory: self.factory,
            workers: Vec::new(),
            next_worker_id: WorkerId(0),
            tasks: VecDeque::new(),
            max_workers,
            min_workers: self.min_workers,
            max_queue_size: self.max_queue_size,
            gradual_scaling: self.gradual_scaling,
            can_create_worker: Arc::new(AtomicBool::new(true)),
            round_robin: self.round_robin,
            last_chosen: -1,
            worker_type: self.worker_type,
            concurrency: self.concurrency,
            max_exec: self.max_exec,
            mark_not_ready_after_exec: self.mark_not_ready_after_exec,
            ready_timeout: self.ready_timeout,
            init_ready_timeout: self.init_ready_timeout,
            debug_port_start: self.debug_port_start,
            debug_ports: DebugPortAllocator::new(),
            on_create_worker: self.on_create_worker,
            on_terminate_worker: self.on_terminate_worker,
            spawner: spawner.clone(),
            terminated: false,
        };

        state.ensure_min_workers().await;

        let actor = spawner.spawn(run_actor(state, cmd_rx, cmd_tx.clone()));

        Ok(Dispatcher { cmd_tx, _actor: actor })
    }
}

struct PoolState<F: WorkerFactory> {
    factory: F,
    workers: Vec<WorkerEntry>,
    next_worker_id: WorkerId,
    tasks: VecDeque<TaskRecord>,
    max_workers: NonZeroUsize,
    min_workers: MinWorkers,
    max_queue_size: Option<usize>,
    gradual_scaling: Option<Duration>,
    can_create_worker: Arc<AtomicBool>,
    round_robin: bool,
    last_chosen: isize,
    worker_type: WorkerType,
    concurrency: Option<usize>,
    max_exec: Option<usize>,
    mark_not_ready_after_exec: bool,
    ready_timeout: Option<Duration>,
    init_ready_timeout: Option<Duration>,
    debug_port_start: u16,
    debug_ports: DebugPortAllocator,
    on_create_worker: Option<CreateWorkerHook>,
    on_terminate_worker: Option<TerminateWorkerHook>,
    spawner: anyspawn::Spawner,
    terminated: bool,
}

impl<F: WorkerFactory> PoolState<F> {
    fn enqueue(&mut self, method: String, params: Vec<Value>, options: TaskOptions) -> TaskHandle {
        let (resolver, handle, control) = task::pair(self.spawner.clone());
        self.tasks.push_back(TaskRecord { method, params, options, resolver, control });
        handle
    }

    /// Picks at most one queued task and hands it to a worker. Not a loop: re-triggered
    /// by the caller whenever the queue or worker set may have changed.
    async fn advance(&mut self, cmd_tx: &mpsc::Sender<Command>) {
        loop {
            if self.tasks.is_empty() {
                return;
            }
            let affinity = self.tasks.front().expect("checked above").options.affinity;

            let Some(worker_id) = self.select_worker(affinity, cmd_tx).await else {
                return;
            };

            let task = self.tasks.pop_front().expect("checked above");
            if !task.control.pending() {
                // Cancelled while queued - drop it and try the next one.
                continue;
            }

            self.dispatch(worker_id, task, cmd_tx);
            return;
        }
    }

    fn dispatch(&mut self, worker_id: WorkerId, task: TaskRecord, cmd_tx: &mpsc::Sender<Command>) {
        // select_worker and dispatch run back-to-back within one actor turn, so the
        // worker it just picked is always still present.
        let Some(entry) = self.workers.iter().find(|entry| entry.id == worker_id) else {
            return;
        };

        let handle = Arc::clone(&entry.handle);
        task.control.mark_dispatched();

        let TaskRecord { method, params, options, resolver, control: _ } = task;
        let cmd_tx = cmd_tx.clone();

        tracing::debug!(worker = worker_id.0, method = %method, "dispatching task");

        drop(self.spawner.spawn(async move {
            let result = handle.exec(method, params, options, resolver).await;
            let failed = result.is_err();
            if let Err(err) = &result {
                tracing::debug!(worker = worker_id.0, error = %err, "worker exec failed");
            }
            let _ = cmd_tx.send(Command::ExecSettled { worker_id, failed }).await;
        }));
    }

    async fn select_worker(&mut self, affinity: Option<usize>, cmd_tx: &mpsc::Sender<Command>) -> Option<WorkerId> {
        let mut chosen = None;

        if let Some(i) = affinity {
            if !self.workers.is_empty() {
                let idx = i % self.workers.len();
                chosen = Some(self.workers[idx].id);
            }
        }

        if chosen.is_none() && self.round_robin && !self.workers.is_empty() {
            let len = self.workers.len() as isize;
            self.last_chosen = (self.last_chosen + 1).rem_euclid(len);
            chosen = Some(self.workers[self.last_chosen as usize].id);
        }

        if chosen.is_none() {
            chosen = self.workers.iter().find(|entry| entry.handle.available()).map(|entry| entry.id);
        }

        if self.workers.len() < self.max_workers.get() {
            let should_create = match self.gradual_scaling {
                None => true,
                Some(_) => self.can_create_worker.swap(false, Ordering::AcqRel),
            };

            if should_create {
                if let Some(window) = self.gradual_scaling {
                    let gate = Arc::clone(&self.can_create_worker);
                    let cmd_tx = cmd_tx.clone();
                    drop(self.spawner.spawn(async move {
                        tokio::time::sleep(window).await;
                        gate.store(true, Ordering::Release);
                        // A task may be sitting queued precisely because growth was
                        // gated when it last ran select_worker; wake the actor so it
                        // gets another shot instead of waiting on an unrelated event.
                        let _ = cmd_tx.send(Command::GateReopened).await;
                    }));
                }

                match self.create_worker().await {
                    Ok(new_id) => chosen = chosen.or(Some(new_id)),
                    Err(err) => tracing::warn!(%err, "failed to grow worker pool"),
                }
            }
        }

        chosen
    }

    async fn ensure_min_workers(&mut self) {
        let target = self.min_workers.resolve(self.max_workers.get());
        while self.workers.len() < target {
            if let Err(err) = self.create_worker().await {
                tracing::warn!(%err, "failed to create worker toward min_workers");
                break;
            }
        }
    }

    async fn create_worker(&mut self) -> DispatchResult<WorkerId> {
        let mut params = WorkerFactoryParams {
            worker_type: self.worker_type,
            concurrency: self.concurrency,
            max_exec: self.max_exec,
            mark_not_ready_after_exec: self.mark_not_ready_after_exec,
            ready_timeout: self.ready_timeout,
            init_ready_timeout: self.init_ready_timeout,
            debug_port: 0,
        };
        if let Some(hook) = &self.on_create_worker {
            params = hook(params);
        }

        let debug_port = self.debug_ports.next_available_starting_at(self.debug_port_start);
        params.debug_port = debug_port;

        let handle = match self.factory.create(params).await {
            Ok(handle) => handle,
            Err(err) => {
                self.debug_ports.release(debug_port);
                return Err(err);
            }
        };

        let id = self.next_worker_id;
        self.next_worker_id = WorkerId(id.0 + 1);
        tracing::debug!(worker = id.0, debug_port, "worker created");
        self.workers.push(WorkerEntry { id, handle: DynWorkerHandle::new_arc(handle) });
        Ok(id)
    }

    async fn remove_worker(&mut self, worker_id: WorkerId) {
        let Some(pos) = self.workers.iter().position(|entry| entry.id == worker_id) else {
            return;
        };
        let entry = self.workers.remove(pos);
        self.debug_ports.release(entry.handle.descriptor().debug_port);

        // The minimum must be restored before we even attempt to terminate the
        // outgoing worker, so a slow/failing termination never leaves the pool
        // under-provisioned in the meantime.
        self.ensure_min_workers().await;

        if let Err(err) = entry.handle.terminate(false).await {
            tracing::debug!(worker = worker_id.0, %err, "error terminating removed worker");
        }
        if let Some(hook) = &self.on_terminate_worker {
            hook(entry.handle.descriptor());
        }
    }
}

async fn run_actor<F: WorkerFactory>(mut state: PoolState<F>, mut cmd_rx: mpsc::Receiver<Command>, cmd_tx: mpsc::Sender<Command>) {
    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            Command::Submit { method, params, options, reply } => {
                let queue_full = state.max_queue_size.is_some_and(|max| state.tasks.len() >= max);
                let outcome = if state.terminated {
                    Err(DispatchError::PoolTerminated)
                } else if queue_full {
                    Err(DispatchError::QueueFull(state.max_queue_size.expect("queue_full implies Some")))
                } else {
                    Ok(state.enqueue(method, params, options))
                };
                let _ = reply.send(outcome);
                state.advance(&cmd_tx).await;
            }
            Command::Stats(reply) => {
                let total_workers = state.workers.len();
                let busy_workers = state.workers.iter().filter(|entry| entry.handle.busy()).count();
                let available_workers = state.workers.iter().filter(|entry| entry.handle.available()).count();
                let _ = reply.send(PoolStats {
                    total_workers,
                    busy_workers,
                    available_workers,
                    idle_workers: total_workers - busy_workers,
                    pending_tasks: state.tasks.len(),
                    active_tasks: busy_workers,
                });
            }
            Command::WorkerStats(reply) => {
                let per_worker: Vec<WorkerCallStats> = state.workers.iter().map(|entry| entry.handle.call_stats()).collect();
                let ready = state.workers.iter().filter(|entry| entry.handle.available()).count();
                let _ = reply.send(WorkerStatsSummary::reduce(&per_worker, ready));
            }
            Command::AvailableWorkerCount(reply) => {
                let count = state.workers.iter().filter(|entry| entry.handle.available()).count();
                let _ = reply.send(count);
            }
            Command::Terminate { force, timeout, reply } => {
                if !state.terminated {
                    state.terminated = true;
                    for task in state.tasks.drain(..) {
                        task.resolver.reject(DispatchError::PoolTerminated);
                    }

                    let workers = std::mem::take(&mut state.workers);
                    for entry in workers {
                        if let Err(err) = entry.handle.terminate_and_notify(force, timeout).await {
                            tracing::debug!(worker = entry.id.0, %err, "error terminating worker");
                        }
                        state.debug_ports.release(entry.handle.descriptor().debug_port);
                        if let Some(hook) = &state.on_terminate_worker {
                            hook(entry.handle.descriptor());
                        }
                    }
                }
                let _ = reply.send(());
            }
            Command::ExecSettled { worker_id, failed } => {
                if failed {
                    let crashed = state.workers.iter().find(|entry| entry.id == worker_id).is_some_and(|entry| entry.handle.terminated());
                    if crashed {
                        state.remove_worker(worker_id).await;
                    }
                }
                state.advance(&cmd_tx).await;
            }
            Command::GateReopened => {
                state.advance(&cmd_tx).await;
            }
        }
    }
}

/// A bounded set of long-lived workers fed from a FIFO queue, with affinity,
/// round-robin, or first-available selection and gradual scale-up.
///
/// Construct one with [`Dispatcher::builder`]. Cloning a `Dispatcher` is not supported;
/// instead, share it behind an `Arc` - every method here takes `&self` and is safe to
/// call concurrently from any number of callers.
pub struct Dispatcher {
    cmd_tx: mpsc::Sender<Command>,
    _actor: anyspawn::JoinHandle<()>,
}

impl Dispatcher {
    /// Starts building a dispatcher backed by `factory`.
    pub fn builder<F>(factory: F) -> PoolBuilder<F>
    where
        F: WorkerFactory + 'static,
    {
        PoolBuilder::new(factory)
    }

    /// Submits a call and returns a handle resolving to its result.
    ///
    /// `method` accepts a method name directly (`"doWork".into()`), or
    /// [`Method::Inline`] for a serialized callable, which is rewritten to a call to the
    /// worker's built-in `"run"` method before it ever reaches selection.
    pub async fn submit(&self, method: impl Into<Method>, params: Vec<Value>, options: TaskOptions) -> DispatchResult<TaskHandle> {
        let (method, params) = method.into().rewrite(params);
        submit_named(&self.cmd_tx, method, params, options).await
    }

    /// Discovers the worker's exposed methods (via its built-in `"methods"` call) and
    /// returns a proxy for each, so `proxy()["doWork"].call(params, options)` is
    /// equivalent to `submit("doWork", params, options)`.
    pub async fn proxy(&self) -> DispatchResult<HashMap<String, MethodProxy>> {
        let handle = submit_named(&self.cmd_tx, "methods".to_owned(), Vec::new(), TaskOptions::default()).await?;
        let value = handle.await?;
        let names: Vec<String> =
            serde_json::from_value(value).map_err(|err| DispatchError::Worker(format!("malformed methods response: {err}")))?;

        Ok(names
            .into_iter()
            .map(|name| {
                let proxy = MethodProxy { name: name.clone(), cmd_tx: self.cmd_tx.clone() };
                (name, proxy)
            })
            .collect())
    }

    /// A snapshot of the pool's current shape: worker counts and queue depth.
    pub async fn stats(&self) -> DispatchResult<PoolStats> {
        self.request(Command::Stats).await
    }

    /// Aggregated per-worker call-timing counters across the pool.
    pub async fn worker_stats(&self) -> DispatchResult<WorkerStatsSummary> {
        self.request(Command::WorkerStats).await
    }

    /// The number of workers currently able to accept another call.
    pub async fn available_worker_count(&self) -> DispatchResult<usize> {
        self.request(Command::AvailableWorkerCount).await
    }

    /// Rejects every queued task, then terminates every live worker.
    ///
    /// Safe to call more than once: once the first call has completed, later calls
    /// resolve immediately and never re-invoke `on_terminate_worker`.
    pub async fn terminate(&self, force: bool, timeout: Option<Duration>) -> DispatchResult<()> {
        let (reply, rx) = oneshot::channel();
        if self.cmd_tx.send(Command::Terminate { force, timeout, reply }).await.is_err() {
            return Ok(());
        }
        rx.await.map_err(|_| DispatchError::PoolTerminated)
    }

    async fn request<T>(&self, make_command: impl FnOnce(oneshot::Sender<T>) -> Command) -> DispatchResult<T> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx.send(make_command(reply)).await.map_err(|_| DispatchError::PoolTerminated)?;
        rx.await.map_err(|_| DispatchError::PoolTerminated)
    }
}
