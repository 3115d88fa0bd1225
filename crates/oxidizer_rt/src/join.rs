// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

mod local_join;
mod remote_join;

pub use local_join::*;
pub use remote_join::*;