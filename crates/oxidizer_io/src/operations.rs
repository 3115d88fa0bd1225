// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

mod begin_result;
mod control_operation;
mod operation;
mod read_operation;
mod user_resources;
mod write_operation;

pub use begin_result::*;
pub use control_operation::*;
pub use operation::*;
pub use read_operation::*;
pub use user_resources::*;
pub use write_operation::*;