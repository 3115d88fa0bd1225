// Copyright (c) Microsoft Corporation.

use opentelemetry::InstrumentationScope;
use opentelemetry::metrics::{Counter, Meter, MeterProvider};

const METER_NAME: &str = "seatbelt";
const VERSION: &str = "v0.1.0";
const SCHEMA_URL: &str = "https://opentelemetry.io/schemas/1.47.0";

pub(crate) fn create_meter(meter_provider: &dyn MeterProvider) -> Meter {
    meter_provider.meter_with_scope(
        InstrumentationScope::builder(METER_NAME)
            .with_version(VERSION)
            .with_schema_url(SCHEMA_URL)
            .build(),
    )
}

pub(crate) fn create_resilience_event_counter(meter: &Meter) -> Counter<u64> {
    meter
        .u64_counter("resilience.event")
        .with_description("Emitted upon the occurrence of a resilience event.")
        .with_unit("u64")
        .build()
}
