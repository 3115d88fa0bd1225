// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The pending-result primitive shared between a submitted task's caller, the dispatcher,
//! and the worker that eventually executes it.
//!
//! [`TaskResolver`], [`TaskHandle`], and the crate-private [`TaskControl`] are three views
//! onto the same [`Shared`] state. Exactly one of resolution, rejection, cancellation, or
//! timeout wins the race to settle the result — whichever reaches the slot first.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{Map, Value};
use tokio::sync::oneshot;

use crate::error::{DispatchError, Result as DispatchResult};

/// What a task eventually resolves to.
pub type Outcome = DispatchResult<Value>;

/// Per-task overrides accepted by [`crate::Dispatcher::submit`].
#[derive(Debug, Clone, Default)]
pub struct TaskOptions {
    /// Pins this task to `workers[affinity % workers.len()]`, bypassing availability.
    pub affinity: Option<usize>,

    /// A deadline for the call. If the task is still queued when set, it is recorded and
    /// armed only once the task is handed to a worker (see [`TaskHandle::timeout`]).
    pub timeout: Option<Duration>,

    /// Transport-level keys passed through verbatim to the worker.
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy)]
enum Lifecycle {
    Queued { deferred_timeout: Option<Duration> },
    Dispatched,
}

struct Shared {
    slot: Mutex<Option<oneshot::Sender<Outcome>>>,
    lifecycle: Mutex<Lifecycle>,
    spawner: anyspawn::Spawner,
}

impl Shared {
    fn settle(&self, outcome: Outcome) {
        if let Some(tx) = self.slot.lock().take() {
            // The caller may have dropped the handle; nothing to do if so.
            let _ = tx.send(outcome);
        }
    }

    fn pending(&self) -> bool {
        self.slot.lock().is_some()
    }

    fn request_timeout(self: &Arc<Self>, duration: Duration) {
        let mut lifecycle = self.lifecycle.lock();
        match &mut *lifecycle {
            Lifecycle::Queued { deferred_timeout } => *deferred_timeout = Some(duration),
            Lifecycle::Dispatched => {
                drop(lifecycle);
                self.arm_timer(duration);
            }
        }
    }

    /// Transitions a still-queued task to dispatched, arming any timeout that was
    /// recorded while it waited in the queue. Called exactly once, by the dispatcher, at
    /// the moment a task is handed to a worker.
    fn mark_dispatched(self: &Arc<Self>) {
        let deferred = {
            let mut lifecycle = self.lifecycle.lock();
            let deferred = match &*lifecycle {
                Lifecycle::Queued { deferred_timeout } => *deferred_timeout,
                Lifecycle::Dispatched => None,
            };
            *lifecycle = Lifecycle::Dispatched;
            deferred
        };

        if let Some(duration) = deferred {
            self.arm_timer(duration);
        }
    }

    fn arm_timer(self: &Arc<Self>, duration: Duration) {
        let shared = Arc::clone(self);
        drop(self.spawner.spawn(async move {
            tokio::time::sleep(duration).await;
            shared.settle(Err(DispatchError::timeout_after(duration)));
        }));
    }
}

/// Handed to a [`crate::WorkerHandle`] so it can settle the call it was asked to run.
pub struct TaskResolver {
    shared: Arc<Shared>,
}

impl TaskResolver {
    /// Resolves the task with `value`. A no-op if the task already settled.
    pub fn resolve(&self, value: Value) {
        self.shared.settle(Ok(value));
    }

    /// Rejects the task with `err`. A no-op if the task already settled.
    pub fn reject(&self, err: DispatchError) {
        self.shared.settle(Err(err));
    }
}

impl fmt::Debug for TaskResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskResolver")
            .field("pending", &self.shared.pending())
            .finish()
    }
}

/// Returned by [`crate::Dispatcher::submit`]. Implements [`Future`] to await the worker's
/// result, and exposes `cancel`/`timeout` for controlling a still-pending task.
pub struct TaskHandle {
    rx: oneshot::Receiver<Outcome>,
    shared: Arc<Shared>,
}

impl TaskHandle {
    /// True until the task resolves, rejects, is cancelled, or times out.
    #[must_use]
    pub fn pending(&self) -> bool {
        self.shared.pending()
    }

    /// Cancels the task. If it is still queued, `advance` silently drops it on its next
    /// turn; if already dispatched, this races the worker's own settlement.
    pub fn cancel(&self) {
        self.shared.settle(Err(DispatchError::Cancelled));
    }

    /// Arms a timeout of `duration`. If the task is still queued, the timer does not
    /// start until the task is handed to a worker; if already dispatched, it starts now.
    pub fn timeout(&self, duration: Duration) {
        self.shared.request_timeout(duration);
    }
}

impl Future for TaskHandle {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            // The sender side was dropped without settling - the owning worker is gone.
            Poll::Ready(Err(_)) => Poll::Ready(Err(DispatchError::WorkerCrashed)),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("pending", &self.pending())
            .finish()
    }
}

/// The dispatcher's private view of a task's shared state: just enough to check
/// `pending()` before dispatch and to arm a deferred timeout at dispatch time.
pub(crate) struct TaskControl {
    shared: Arc<Shared>,
}

impl TaskControl {
    pub(crate) fn pending(&self) -> bool {
        self.shared.pending()
    }

    pub(crate) fn mark_dispatched(&self) {
        self.shared.mark_dispatched();
    }
}

/// Creates a linked resolver/handle/control triple for one task.
pub(crate) fn pair(spawner: anyspawn::Spawner) -> (TaskResolver, TaskHandle, TaskControl) {
    let (tx, rx) = oneshot::channel();
    let shared = Arc::new(Shared {
        slot: Mutex::new(Some(tx)),
        lifecycle: Mutex::new(Lifecycle::Queued { deferred_timeout: None }),
        spawner,
    });

    (
        TaskResolver { shared: Arc::clone(&shared) },
        TaskHandle { rx, shared: Arc::clone(&shared) },
        TaskControl { shared },
    )
}

/// A task awaiting dispatch, or already handed to a worker.
pub(crate) struct TaskRecord {
    pub(crate) method: String,
    pub(crate) params: Vec<Value>,
    pub(crate) options: TaskOptions,
    pub(crate) resolver: TaskResolver,
    pub(crate) control: TaskControl,
}

impl fmt::Debug for TaskRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRecord")
            .field("method", &self.method)
            .field("affinity", &self.options.affinity)
            .finish_non_exhaustive()
    }
}
