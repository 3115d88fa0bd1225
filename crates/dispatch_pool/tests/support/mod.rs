// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! A hand-written `WorkerHandle` test double with controllable behavior, mirroring the
//! teacher's own precedent of pairing hand-rolled doubles alongside `mockall`-based ones
//! where a trait's async shape makes mocking awkward.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use dispatch_pool::{DispatchError, Result, TaskOptions, TaskResolver, WorkerDescriptor, WorkerFactory, WorkerFactoryParams, WorkerHandle};
use parking_lot::Mutex;
use serde_json::Value;

/// How a [`FakeWorker`] responds to its next `exec` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeBehavior {
    /// Resolves the task with its params echoed back as a JSON array.
    Echo,
    /// Never settles the task and never returns from `exec` - simulates a hung call.
    Stall,
    /// Rejects the task and reports itself as terminated, simulating a crash.
    Crash,
}

/// A `WorkerHandle` double whose behavior, latency, and crash state are controlled from
/// test code via shared `Arc` handles kept alongside the one handed to the dispatcher.
#[derive(Debug)]
pub struct FakeWorker {
    descriptor: WorkerDescriptor,
    behavior: Mutex<FakeBehavior>,
    latency: Mutex<Option<Duration>>,
    busy: AtomicBool,
    terminated: AtomicBool,
    exec_count: AtomicUsize,
}

impl FakeWorker {
    pub fn new(debug_port: u16) -> Arc<Self> {
        Arc::new(Self {
            descriptor: WorkerDescriptor { script: None, fork_args: Vec::new(), fork_opts: serde_json::Map::new(), debug_port },
            behavior: Mutex::new(FakeBehavior::Echo),
            latency: Mutex::new(None),
            busy: AtomicBool::new(false),
            terminated: AtomicBool::new(false),
            exec_count: AtomicUsize::new(0),
        })
    }

    pub fn set_behavior(&self, behavior: FakeBehavior) {
        *self.behavior.lock() = behavior;
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = Some(latency);
    }

    pub fn exec_count(&self) -> usize {
        self.exec_count.load(Ordering::Acquire)
    }

    pub fn debug_port(&self) -> u16 {
        self.descriptor.debug_port
    }
}

impl WorkerHandle for FakeWorker {
    async fn exec(&self, method: String, params: Vec<Value>, _options: TaskOptions, resolver: TaskResolver) -> Result<()> {
        self.busy.store(true, Ordering::Release);
        self.exec_count.fetch_add(1, Ordering::AcqRel);

        if let Some(latency) = *self.latency.lock() {
            tokio::time::sleep(latency).await;
        }

        let outcome = match *self.behavior.lock() {
            FakeBehavior::Echo => {
                resolver.resolve(Value::Array(params));
                Ok(())
            }
            FakeBehavior::Stall => {
                std::future::pending::<()>().await;
                unreachable!("pending future never completes")
            }
            FakeBehavior::Crash => {
                self.terminated.store(true, Ordering::Release);
                resolver.reject(DispatchError::WorkerCrashed);
                Err(DispatchError::Worker(format!("{method} crashed")))
            }
        };

        self.busy.store(false, Ordering::Release);
        outcome
    }

    fn available(&self) -> bool {
        !self.busy.load(Ordering::Acquire) && !self.terminated.load(Ordering::Acquire)
    }

    fn terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }

    async fn terminate(&self, _force: bool) -> Result<()> {
        self.terminated.store(true, Ordering::Release);
        Ok(())
    }

    async fn terminate_and_notify(&self, force: bool, _timeout: Option<Duration>) -> Result<()> {
        self.terminate(force).await
    }

    fn descriptor(&self) -> &WorkerDescriptor {
        &self.descriptor
    }
}

/// Builds [`FakeWorker`]s and keeps a record of every one it created, so tests can reach
/// back in and control workers the dispatcher already took ownership of.
#[derive(Debug, Default, Clone)]
pub struct FakeWorkerFactory {
    created: Arc<Mutex<Vec<Arc<FakeWorker>>>>,
}

impl FakeWorkerFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> Vec<Arc<FakeWorker>> {
        self.created.lock().clone()
    }

    pub fn create_count(&self) -> usize {
        self.created.lock().len()
    }
}

impl WorkerFactory for FakeWorkerFactory {
    type Handle = Arc<FakeWorker>;

    async fn create(&self, params: WorkerFactoryParams) -> Result<Self::Handle> {
        let worker = FakeWorker::new(params.debug_port);
        self.created.lock().push(Arc::clone(&worker));
        Ok(worker)
    }
}

/// A factory whose `n`th call fails, for exercising `create_worker`'s error path.
#[derive(Debug, Clone)]
pub struct FlakyWorkerFactory {
    inner: FakeWorkerFactory,
    fail_at: usize,
    attempts: Arc<AtomicUsize>,
}

impl FlakyWorkerFactory {
    pub fn new(fail_at: usize) -> Self {
        Self { inner: FakeWorkerFactory::new(), fail_at, attempts: Arc::new(AtomicUsize::new(0)) }
    }
}

impl WorkerFactory for FlakyWorkerFactory {
    type Handle = Arc<FakeWorker>;

    async fn create(&self, params: WorkerFactoryParams) -> Result<Self::Handle> {
        let attempt = self.attempts.fetch_add(1, Ordering::AcqRel);
        if attempt == self.fail_at {
            return Err(DispatchError::Worker("factory refused to create a worker".to_owned()));
        }
        self.inner.create(params).await
    }
}
