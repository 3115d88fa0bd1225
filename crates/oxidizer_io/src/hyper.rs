// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

mod read;
mod write;

pub use read::*;
pub use write::*;