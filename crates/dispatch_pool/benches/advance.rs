// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Throughput of `submit`/`advance` under a saturated pool: every worker is always
//! `available()` immediately after it settles its current call, so each benchmark
//! iteration exercises the full select-worker/dispatch/advance round trip rather than
//! just queuing behind a stalled worker.

#![allow(
    missing_docs,
    clippy::items_after_statements,
    clippy::unwrap_used,
    reason = "Benchmarks don't require documentation and should fail fast on errors"
)]

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use criterion::{Criterion, criterion_group, criterion_main};
use dispatch_pool::{Dispatcher, Result, TaskOptions, TaskResolver, WorkerDescriptor, WorkerFactory, WorkerFactoryParams, WorkerHandle};
use serde_json::Value;

#[derive(Debug)]
struct EchoWorker {
    descriptor: WorkerDescriptor,
}

impl WorkerHandle for EchoWorker {
    async fn exec(&self, _method: String, params: Vec<Value>, _options: TaskOptions, resolver: TaskResolver) -> Result<()> {
        resolver.resolve(Value::Array(params));
        Ok(())
    }

    fn available(&self) -> bool {
        true
    }

    fn terminated(&self) -> bool {
        false
    }

    async fn terminate(&self, _force: bool) -> Result<()> {
        Ok(())
    }

    async fn terminate_and_notify(&self, force: bool, _timeout: Option<std::time::Duration>) -> Result<()> {
        self.terminate(force).await
    }

    fn descriptor(&self) -> &WorkerDescriptor {
        &self.descriptor
    }
}

#[derive(Debug, Default)]
struct EchoWorkerFactory;

impl WorkerFactory for EchoWorkerFactory {
    type Handle = Arc<EchoWorker>;

    async fn create(&self, params: WorkerFactoryParams) -> Result<Self::Handle> {
        let descriptor = WorkerDescriptor {
            script: None,
            fork_args: Vec::new(),
            fork_opts: serde_json::Map::new(),
            debug_port: params.debug_port,
        };
        Ok(Arc::new(EchoWorker { descriptor }))
    }
}

fn entry(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("advance");

    for worker_count in [1usize, 4, 16] {
        let dispatcher = rt.block_on(async {
            Dispatcher::builder(EchoWorkerFactory)
                .max_workers(NonZeroUsize::new(worker_count).unwrap())
                .min_workers(dispatch_pool::MinWorkers::MatchMax)
                .build()
                .await
                .unwrap()
        });
        let dispatcher = Arc::new(dispatcher);
        static COUNTER: AtomicUsize = AtomicUsize::new(0);

        group.bench_function(format!("single_call/{worker_count}_workers"), |b| {
            b.to_async(&rt).iter(|| {
                let dispatcher = Arc::clone(&dispatcher);
                async move {
                    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
                    let handle = dispatcher.submit("echo", vec![serde_json::json!(n)], TaskOptions::default()).await.unwrap();
                    handle.await.unwrap()
                }
            });
        });

        group.bench_function(format!("round_robin_fanout/{worker_count}_workers"), |b| {
            b.to_async(&rt).iter(|| {
                let dispatcher = Arc::clone(&dispatcher);
                async move {
                    let mut set = tokio::task::JoinSet::new();
                    for i in 0..worker_count {
                        let dispatcher = Arc::clone(&dispatcher);
                        set.spawn(async move { dispatcher.submit("echo", vec![serde_json::json!(i)], TaskOptions::default()).await.unwrap().await.unwrap() });
                    }
                    set.join_all().await
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, entry);
criterion_main!(benches);
