// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::collections::vec_deque::Drain;
use std::pin::Pin;
use std::rc::Rc;
use std::{fmt, thread};

use crate::{AsyncTask, LocalJoinHandle, Task};

/// Maintains the queue of new local tasks to be spawned. The worker uses this to enqueue tasks
/// received from other threads and the tasks on the same thread use this (via the context) to spawn
/// more tasks on the same thread.
///
/// # Ownership
///
/// Shared ownership between worker and its tasks - we use interior mutability. There cannot be any
/// concurrent borrowing because the worker is single-threaded, and we are careful about reentrancy
/// internally.
///
/// The type is only owned via Rc and shares references to itself with the tasks it enqueues.
///
/// # Safety
///
/// For correct operation, the queue must be drained by the worker that created it before dropping
/// that worker's reference. Failure to do so will result in a panic when the queue is dropped.
pub struct SpawnQueue {
    new_tasks: RefCell<VecDeque<Pin<Box<dyn AsyncTask>>>>,
}

impl SpawnQueue {
    /// # Safety
    ///
    /// For correct operation, the queue must be drained by the worker that
    /// created it before dropping that worker's reference.
    pub unsafe fn new() -> Rc<Self> {
        Rc::new(Self {
            new_tasks: RefCell::new(VecDeque::new()),
        })
    }

    /// Spawns a new local task whose body will be the future constructed via the provided factory.
    /// This method allows tasks with single-threaded state and single-threaded return values.
    ///
    /// This is ONLY intended to be used from within the same thread, as part of reentrant logic
    /// initiated from a currently executing task.
    ///
    /// # Remote spawning
    ///
    /// There is no concept in the worker itself of spawning remote tasks - a remote task that is
    /// scheduled from another thread is simply a local task that happens to forward its result to
    /// a different thread via some cross-thread communication mechanism. The worker is ignorant.
    pub(crate) fn spawn_local<FF, F, R>(self: &Rc<Self>, future_factory: FF) -> LocalJoinHandle<R>
    where
        FF: FnOnce() -> F + 'static,
        F: Future<Output = R> + 'static,
        R: 'static,
    {
        // SAFETY: We are not allowed to drop the task until it signals that it is inert. We fulfil
        // this responsibility by requiring the caller to drain the queue before it can be dropped.
        let mut task = unsafe { Task::new(future_factory()) };

        let join_handle = task.join_handle();

        self.enqueue(task);

        join_handle
    }

    /// Enqueue an already pinned and prepared task.
    pub(crate) fn enqueue(self: &Rc<Self>, task: Pin<Box<dyn AsyncTask>>) {
        self.new_tasks.borrow_mut().push_back(task);
    }

    /// Drains all the tasks from the queue, passing them to the provided callback.
    ///
    /// # Panics
    ///
    /// Panics if an attempt is made to enqueue new tasks during the drain.
    ///
    /// # Safety
    ///
    /// Refer to safety comments of `AsyncTask` - any tasks provided to the callback must not be
    /// dropped until they signal that they are inert.
    pub unsafe fn drain<CB, R>(self: &Rc<Self>, mut cb: CB) -> R
    where
        CB: FnMut(&mut Drain<Pin<Box<dyn AsyncTask>>>) -> R,
    {
        let mut tasks = self.new_tasks.borrow_mut();

        let mut drain = tasks.drain(..);
        cb(&mut drain)
    }

    pub(crate) fn has_new_tasks(&self) -> bool {
        !self.new_tasks.borrow().is_empty()
    }
}

impl Drop for SpawnQueue {
    // The only way to get here in the current implementation is to first call `shutdown()`
    // which makes this function a no-op, so mutating it does nothing useful.
    #[cfg_attr(test, mutants::skip)]
    fn drop(&mut self) {
        if thread::panicking() {
            // We skip the assertion if we are already panicking because a double panic more often
            // does not help anything and may even obscure the initial panic in test runs.
            return;
        }

        assert!(
            self.new_tasks.borrow().is_empty(),
            "the worker must drain the spawn queue before dropping it"
        );
    }
}

impl fmt::Debug for SpawnQueue {
    #[cfg_attr(test, mutants::skip)] // We have no contract to test here - can return anything.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpawnQueue")
            .field("new_tasks", &self.new_tasks.borrow().len())
            .finish()
    }
}
