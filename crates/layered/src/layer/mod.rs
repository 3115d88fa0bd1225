// Copyright (c) Microsoft Corporation.

mod service_builder;
mod tuples;

#[doc(inline)]
pub use service_builder::ServiceBuilder;
#[doc(inline)]
pub use tower_layer::Layer;
