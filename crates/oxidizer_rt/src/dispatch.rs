// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

mod abstractions;
mod dispatcher_client;
mod dispatcher_core;
#[cfg(test)]
mod mocks;
mod shutdown;

pub use abstractions::*;
pub use dispatcher_client::*;
pub use dispatcher_core::*;
#[cfg(test)]
pub use mocks::*;
pub use shutdown::*;