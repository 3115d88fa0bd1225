// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builders for creating task metadata objects. Typically you would use `TaskMeta::builder()`
//! and related functions instead of accessing these types directly.

mod local_meta_builder;
mod system_meta_builder;
mod task_meta_builder;

pub use local_meta_builder::*;
pub use system_meta_builder::*;
pub use task_meta_builder::*;