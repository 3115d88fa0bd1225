// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

mod as_native_primitive;
mod bound_primitive;
mod bound_primitive_ref;
mod bound_primitive_registry;
mod unbound_primitive;

pub use as_native_primitive::*;
pub use bound_primitive::*;
pub use bound_primitive_ref::*;
pub use bound_primitive_registry::*;
pub use unbound_primitive::*;