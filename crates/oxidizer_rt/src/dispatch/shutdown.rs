// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;
use std::{mem, thread};

use async_lock::Mutex;

use crate::once_event;

/// Asynchronously waits for the runtime to shut down, allowing for multiple concurrent waiters.
#[cfg_attr(test, mockall::automock)]
pub trait WaitForShutdown {
    fn wait(&self) -> impl Future<Output = ()> + 'static;
}

#[derive(Debug)]
pub struct ThreadWaiter {
    state: Arc<Mutex<ThreadWaiterState>>,
}

#[derive(Debug)]
enum ThreadWaiterState {
    /// Nobody has started waiting for the threads to exit yet.
    Initialized {
        threads: Vec<thread::JoinHandle<()>>,
    },

    /// The first waiter has shown up and started the wait operation.
    /// Additional waiters can add themselves to the list of waiters.
    Waiting {
        completed_txs: Vec<once_event::shared::InefficientSender<()>>,
    },

    /// All threads have already exited - no more waiting is happening.
    Completed,
}

impl ThreadWaiter {
    pub fn new(threads: Vec<thread::JoinHandle<()>>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ThreadWaiterState::Initialized { threads })),
        }
    }
}

impl WaitForShutdown for ThreadWaiter {
    fn wait(&self) -> impl Future<Output = ()> + 'static {
        let state_arc = Arc::clone(&self.state);

        async move {
            let mut state = state_arc.lock().await;

            match &mut *state {
                ThreadWaiterState::Initialized { .. } => {
                    // We are the first waiter, so we need to wait for the threads to exit.
                    let (tx, rx) = once_event::shared::new_inefficient();

                    let completed_txs = vec![tx];
                    let initialized_state =
                        mem::replace(&mut *state, ThreadWaiterState::Waiting { completed_txs });

                    // The waiting occurs in a new thread since it is a synchronous operation.
                    thread::spawn({
                        let state = Arc::clone(&state_arc);

                        move || {
                            let ThreadWaiterState::Initialized { threads } = initialized_state
                            else {
                                unreachable!(
                                    "we already matched this and know the state we are in"
                                );
                            };

                            // TODO: What to do if a thread panicked and this returns an error?
                            // For now, we ignore it but we might want a more thought-through plan.
                            for thread in threads {
                                _ = thread.join();
                            }

                            // All threads have exited. Signal the waiters!
                            let mut state = state.lock_blocking();

                            let ThreadWaiterState::Waiting { completed_txs } = &mut *state else {
                                unreachable!(
                                    "there is nothing else that could transition us out of the waiting state"
                                );
                            };

                            for tx in completed_txs.drain(..) {
                                tx.set(());
                            }

                            // The state is locked, so nothing can add an extra waiter before we get here.
                            *state = ThreadWaiterState::Completed;
                        }
                    });

                    // Drop the lock and wait for the "transitioned into Completed state" signal.
                    drop(state);
                    rx.await;

                    // We have received the completion signal and are good to continue.
                }
                ThreadWaiterState::Waiting { completed_txs } => {
                    // Add ourselves to the list of waiters.
                    let (tx, rx) = once_event::shared::new_inefficient();
                    completed_txs.push(tx);

                    // Drop the lock and wait for the "transitioned into Completed state" signal.
                    drop(state);
                    rx.await;

                    // We have received the completion signal and are good to continue.
                }
                ThreadWaiterState::Completed => {
                    // Nothing to do, all threads have already exited.
                }
            }
        }
    }
}
