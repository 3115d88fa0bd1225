// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

//! A worker-pool dispatcher: a bounded, queued, and scaled set of long-lived workers
//! behind a single submission surface.
//!
//! [`Dispatcher`] owns a FIFO task queue and a set of workers implementing the
//! [`WorkerHandle`] trait - threads, processes, or any other transport the embedder
//! chooses to implement. Submitting a call with [`Dispatcher::submit`] returns a
//! [`TaskHandle`] that resolves once a worker has run it.
//!
//! # Selection policy
//!
//! Each queued task picks a worker through a priority chain:
//!
//! 1. **Affinity**: `TaskOptions::affinity` pins a task to `workers[i % workers.len()]`
//!    unconditionally, even if that worker is already busy - its own concurrency
//!    absorbs the pressure.
//! 2. **Round-robin**: if enabled and affinity didn't pick, the next worker in cyclic
//!    order is chosen, again without an availability check.
//! 3. **First-available**: otherwise, the first worker reporting `available() == true`.
//!
//! Independently of selection, the pool grows toward `max_workers` whenever there is
//! room, gated by `gradual_scaling` if configured.
//!
//! # Example
//!
//! ```no_run
//! use std::num::NonZeroUsize;
//!
//! use dispatch_pool::{Dispatcher, TaskOptions};
//! # use dispatch_pool::{Result, WorkerFactory};
//! # async fn run(factory: impl WorkerFactory + 'static) -> Result<()> {
//! let dispatcher = Dispatcher::builder(factory)
//!     .max_workers(NonZeroUsize::new(4).unwrap())
//!     .round_robin(true)
//!     .build()
//!     .await?;
//!
//! let handle = dispatcher.submit("doWork", vec![serde_json::json!(1)], TaskOptions::default()).await?;
//! let result = handle.await?;
//! # let _ = result;
//! # Ok(())
//! # }
//! ```

mod debug_port;
mod error;
mod method;
#[cfg(feature = "dyn-worker")]
mod pool;
mod stats;
mod task;
mod worker;

pub use error::{DispatchError, Result};
pub use method::Method;
#[cfg(feature = "dyn-worker")]
pub use pool::{CreateWorkerHook, Dispatcher, MethodProxy, MinWorkers, PoolBuilder, TerminateWorkerHook};
pub use stats::{PoolStats, WorkerCallStats, WorkerStatsSummary};
pub use task::{TaskHandle, TaskOptions, TaskResolver};
pub use worker::{WorkerDescriptor, WorkerFactory, WorkerFactoryParams, WorkerHandle, WorkerType};
#[cfg(feature = "dyn-worker")]
pub use worker::DynWorkerHandle;
