// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use recoverable::{Recover, Recovery};
use thiserror::Error;

/// A specialized `Result` type for dispatcher operations that return a
/// [`DispatchError`] on failure.
pub type Result<T> = std::result::Result<T, DispatchError>;

/// An error originating in the worker-pool dispatcher.
///
/// This is an umbrella type for everything the dispatcher can report: programmer errors
/// at the submission boundary, queue/lifecycle conditions, and errors re-packaged from
/// the worker transport. Future versions may add additional variants.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DispatchError {
    /// `params` was not an ordered sequence, or `method` was neither a name nor an
    /// inline callable.
    #[error("invalid submission: {0}")]
    InvalidParams(String),

    /// The queue already holds `max_queue_size` tasks.
    #[error("max queue size of {0} reached")]
    QueueFull(usize),

    /// The pool was terminated while this task was still queued or in flight.
    #[error("pool terminated")]
    PoolTerminated,

    /// The task's timeout elapsed before it settled.
    #[error("task timed out")]
    Timeout,

    /// The caller cancelled the task before it settled.
    #[error("task cancelled")]
    Cancelled,

    /// The worker transport reported a failure executing the call.
    #[error("worker error: {0}")]
    Worker(String),

    /// The worker that owned this task exited or crashed before the call drained.
    #[error("worker crashed before the call completed")]
    WorkerCrashed,
}

impl Recover for DispatchError {
    /// Classifies whether retrying a failed submission is likely to help.
    ///
    /// Crashes and timeouts are transient by nature — a replacement worker picks up the
    /// next submission. Submission-shape errors and deliberate cancellation/shutdown are
    /// never worth retrying.
    fn recovery(&self) -> Recovery {
        match self {
            Self::Timeout | Self::WorkerCrashed => Recovery::retry(),
            Self::Worker(_) => Recovery::unknown(),
            Self::InvalidParams(_) | Self::QueueFull(_) | Self::PoolTerminated | Self::Cancelled => {
                Recovery::never()
            }
        }
    }
}

impl DispatchError {
    /// Builds the error reported when a submission times out after `elapsed`.
    ///
    /// Kept as a constructor (rather than a bare unit variant) so the duration can be
    /// logged at the call site without every caller re-deriving it.
    #[must_use]
    pub fn timeout_after(elapsed: Duration) -> Self {
        tracing::debug!(?elapsed, "task timed out");
        Self::Timeout
    }
}
