// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use tick::Clock;

use crate::{Attempt, RecoveryInfo};

/// Arguments for the [`clone_input_with`][super::RetryLayer::clone_input_with] callback function.
///
/// Provides context for input cloning operations.
#[derive(Debug)]
pub struct CloneArgs {
    pub(super) attempt: Attempt,
    pub(super) previous_recovery: Option<RecoveryInfo>,
}

impl CloneArgs {
    /// Returns the current attempt information.
    #[must_use]
    pub fn attempt(&self) -> Attempt {
        self.attempt
    }

    /// Returns the recovery information from the previous attempt, if any.
    #[must_use]
    pub fn previous_recovery(&self) -> Option<&RecoveryInfo> {
        self.previous_recovery.as_ref()
    }
}

/// Arguments for the [`recovery_with`][super::RetryLayer::recovery_with] callback function.
///
/// Provides context for recovery classification.
#[derive(Debug)]
pub struct RecoveryArgs<'a> {
    pub(super) attempt: Attempt,
    pub(super) clock: &'a Clock,
}

impl RecoveryArgs<'_> {
    /// Returns the current attempt information.
    #[must_use]
    pub fn attempt(&self) -> Attempt {
        self.attempt
    }

    /// Returns the clock used for time-related operations.
    #[must_use]
    pub fn clock(&self) -> &Clock {
        self.clock
    }
}

/// Arguments for the [`on_retry`][super::RetryLayer::on_retry] callback function.
///
/// Provides context for retry notifications.
#[derive(Debug)]
pub struct OnRetryArgs {
    pub(super) attempt: Attempt,
    pub(super) retry_delay: Duration,
    pub(super) recovery: RecoveryInfo,
}

impl OnRetryArgs {
    /// Returns the current attempt information.
    #[must_use]
    pub fn attempt(&self) -> Attempt {
        self.attempt
    }

    /// Returns the delay before the next retry attempt.
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Returns the recovery information that triggered this retry.
    #[must_use]
    pub fn recovery(&self) -> &RecoveryInfo {
        &self.recovery
    }
}

/// Arguments for the [`restore_input`][super::RetryLayer::restore_input] callback function.
///
/// Provides context for input restoration when cloning is unavailable.
#[derive(Debug)]
pub struct RestoreInputArgs {
    pub(super) attempt: Attempt,
    pub(super) recovery: RecoveryInfo,
}

impl RestoreInputArgs {
    /// Returns the current attempt information.
    #[must_use]
    pub fn attempt(&self) -> Attempt {
        self.attempt
    }

    /// Returns the recovery information that triggered this restoration attempt.
    #[must_use]
    pub fn recovery(&self) -> &RecoveryInfo {
        &self.recovery
    }
}
