// Copyright (c) Microsoft Corporation.

use std::borrow::Cow;
use std::collections::hash_map::DefaultHasher;
use std::fmt::Display;
use std::hash::Hasher;

/// Key that identifies a partition for which a separate circuit breaker instance is maintained.
///
/// Currently, it supports either integer or string keys. For maximum performance, prefer using integer keys
/// or static string keys (i.e. `&'static str`).
///
/// # Examples
///
/// ## Creation from a number
///
/// ```rust
/// use seatbelt::circuit_breaker::PartitionKey;
///
/// let key = PartitionKey::from(42_u64);
/// assert_eq!(key.to_string(), "42");
/// ```
///
/// ## Creation from HTTP request authority and scheme
///
/// ```rust
/// use seatbelt::circuit_breaker::PartitionKey;
///
/// // Simulate extracting authority and scheme from an HTTP request
/// let scheme = "https";
/// let authority = "api.example.com";
/// let partition_value = format!("{}://{}", scheme, authority);
///
/// let key = PartitionKey::from(partition_value);
/// assert_eq!(key.to_string(), "https://api.example.com");
///
/// // For better performance, use hashing. Note that you must provide a display label
/// // for the hashed key.
/// let hashed_key = PartitionKey::hashed(&(scheme, authority), "scheme_and_authority");
/// assert_eq!(hashed_key.to_string(), "scheme_and_authority");
/// ```
///
/// # Telemetry
///
/// The values used to create partition keys are included in telemetry data (logs and metrics)
/// for observability purposes. **Important**: Ensure that the values from which partition keys
/// are created do not contain any sensitive data such as authentication tokens, personal
/// identifiable information (PII), or other confidential data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionKey(PartitionKeyValue);

impl PartitionKey {
    pub(crate) const fn default() -> Self {
        Self(PartitionKeyValue::String(Cow::Borrowed("default")))
    }

    /// Create a partition key by hashing the given value.
    ///
    /// The value must implement the `Hash` trait. This is useful for creating partition
    /// keys from complex types. The resulting partition key will be based on the hash of
    /// the value. You must provide a `label` that will be used for display and telemetry.
    pub fn hashed<T: std::hash::Hash>(value: &T, label: &'static str) -> Self {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        Self(PartitionKeyValue::Hashed(hasher.finish(), label))
    }
}

impl Display for PartitionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            PartitionKeyValue::Number(n) => write!(f, "{n}"),
            PartitionKeyValue::String(s) => f.write_str(s),
            PartitionKeyValue::Hashed(_, label) => f.write_str(label),
        }
    }
}

impl From<u64> for PartitionKey {
    fn from(value: u64) -> Self {
        Self(PartitionKeyValue::Number(value))
    }
}

impl From<&'static str> for PartitionKey {
    fn from(value: &'static str) -> Self {
        Self(PartitionKeyValue::String(Cow::Borrowed(value)))
    }
}

impl From<String> for PartitionKey {
    fn from(value: String) -> Self {
        Self(PartitionKeyValue::String(Cow::Owned(value)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PartitionKeyValue {
    Number(u64),
    Hashed(u64, &'static str),
    String(Cow<'static, str>),
}
