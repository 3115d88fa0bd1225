// Copyright (c) Microsoft Corporation.

//! Cache telemetry integration with OpenTelemetry.
//!
//! This module provides telemetry recording for cache operations using
//! OpenTelemetry metrics and logs. When the `telemetry` feature is enabled,
//! all cache operations emit structured logs and metrics.

#[cfg(feature = "telemetry")]
use cache::CacheTelemetryInner;
#[cfg(feature = "telemetry")]
use opentelemetry::logs::Severity;

use thread_aware::{Arc, PerCore};

#[cfg(feature = "telemetry")]
pub(crate) mod cache;
pub(crate) mod ext;

/// Cache telemetry provider for OpenTelemetry integration.
///
/// This type wraps OpenTelemetry logger and meter providers, enabling
/// automatic recording of cache operations as structured logs and metrics.
///
/// Construct this and pass it to the cache builder via `.telemetry()`.
#[derive(Clone, Debug)]
pub struct CacheTelemetry {
    #[cfg(feature = "telemetry")]
    inner: Arc<CacheTelemetryInner, PerCore>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum CacheOperation {
    Get,
    Insert,
    Invalidate,
    Clear,
}

impl CacheOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Insert => "insert",
            Self::Invalidate => "invalidate",
            Self::Clear => "clear",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum CacheEvent {
    Hit,
    Expired,
    Miss,
    RefreshHit,
    RefreshMiss,
    Inserted,
    Invalidated,
    Ok,
    #[cfg_attr(not(test), expect(dead_code, reason = "Reserved for future telemetry integration"))]
    Fallback,
    FallbackPromotion,
    Error,
}

impl CacheEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Expired => "expired",
            Self::Miss => "miss",
            Self::RefreshHit => "refresh_hit",
            Self::RefreshMiss => "refresh_miss",
            Self::Inserted => "inserted",
            Self::Invalidated => "invalidated",
            Self::Ok => "ok",
            Self::Fallback => "fallback",
            Self::FallbackPromotion => "fallback_promotion",
            Self::Error => "error",
        }
    }

    #[cfg(feature = "telemetry")]
    pub fn severity(self) -> Severity {
        match self {
            Self::Hit | Self::Miss | Self::RefreshHit | Self::Ok => Severity::Debug,
            Self::Expired | Self::RefreshMiss | Self::Inserted | Self::Invalidated | Self::Fallback | Self::FallbackPromotion => {
                Severity::Info
            }
            Self::Error => Severity::Error,
        }
    }
}
