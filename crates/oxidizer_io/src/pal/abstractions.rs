// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

mod completion_notification;
mod completion_queue;
mod completion_queue_waker;
mod elementary_operation;
mod memory_pool;
mod platform;
mod primitive;

pub use completion_notification::*;
pub use completion_queue::*;
pub use completion_queue_waker::*;
pub use elementary_operation::*;
pub use memory_pool::*;
pub use platform::*;
pub use primitive::*;