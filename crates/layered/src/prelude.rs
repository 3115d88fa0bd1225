// Copyright (c) Microsoft Corporation.

//! Common imports for working with layered services.
//!
//! Re-exports the most commonly used types from [`layered`][crate].

pub use crate::{Layer, Service, Stack};
