// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! <div class="warning">This crate is a private dependency of <b>oxidizer</b> crate.</div>

#![doc(hidden)]
#![doc(html_no_source)]

pub mod api;
pub mod context;
pub mod runtime;
pub mod stability;
pub mod syn_helpers;
pub mod traverse;