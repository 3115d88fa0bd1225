// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// The name of the retry event for telemetry reporting.
pub(super) const RETRY_EVENT: &str = "retry";
