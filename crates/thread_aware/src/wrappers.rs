// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::{MemoryAffinity, ThreadAware};

/// Allows transferring a value that doesn't implement [`ThreadAware`]
///
/// Since the [`ThreadAware`] trait is not commonly implemented, this wrapper can
/// be used to allow transferring values that don't implement [`ThreadAware`].
///
/// Care must be taken when using this type - since the value will be moved
/// as is, if it contains shared references to data other threads may use,
/// it can introduce contention, resulting in performance impact. As a rule
/// of thumb, if the wrapped value contains an Arc with interior mutability
/// somewhere inside, this wrapper should not be used, and a [`PerCore`](`crate::PerCore`) or [`PerNuma`](`crate::PerNuma`)
/// with independent initialization per affinity is a better option.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Unaware<T>(pub T);

// The only way this could cause issues is if you had a `fn generic<T>(x: impl From<Unaware<T>>)` or similar,
// which in practice is extremely unlikely to occur, especially since `Unaware` is not a common type.
impl<T> From<T> for Unaware<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> Deref for Unaware<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for Unaware<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T> ThreadAware for Unaware<T> {
    fn relocated(self, _source: MemoryAffinity, _destination: MemoryAffinity) -> Self {
        self
    }
}

impl<T> Unaware<T> {
    /// Consumes the wrapper and returns the inner value.
    pub fn into_inner(self) -> T {
        self.0
    }

    /// Converts an `Arc<Unaware<T>>` into an `Arc<T>`.
    pub fn into_arc(self: Arc<Self>) -> Arc<T> {
        // SAFETY: `Unaware` is a transparent wrapper around `T`,
        unsafe { std::mem::transmute(self) }
    }
}

/// Creates an [`Unaware`] wrapper around a value.
pub const fn unaware<T>(value: T) -> Unaware<T> {
    Unaware(value)
}
