// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use crate::BytesBuf;
use crate::mem::Memory;

/// Implements [`MemoryShared`][crate::mem::MemoryShared] by delegating to a closure.
///
/// This can be used to construct wrapping memory providers that add logic or configuration
/// on top of an existing memory provider.
pub struct CallbackMemory<FReserve>
where
    FReserve: Fn(usize) -> BytesBuf + Send + Sync + 'static,
{
    reserve_fn: Arc<FReserve>,
}

impl<FReserve> CallbackMemory<FReserve>
where
    FReserve: Fn(usize) -> BytesBuf + Send + Sync + 'static,
{
    /// Creates a new instance implemented via the provided callback.
    pub fn new(reserve_fn: FReserve) -> Self {
        Self {
            reserve_fn: Arc::new(reserve_fn),
        }
    }

    /// Reserves at least `min_bytes` bytes of memory capacity.
    ///
    /// Returns an empty [`BytesBuf`] that can be used to fill the reserved memory with data.
    ///
    /// The memory provider may provide more memory than requested.
    ///
    /// The memory reservation request will always be fulfilled, obtaining more memory from the
    /// operating system if necessary.
    ///
    /// # Zero-sized reservations
    ///
    /// Reserving zero bytes of memory is a valid operation and will return a [`BytesBuf`]
    /// with zero or more bytes of capacity.
    ///
    /// # Panics
    ///
    /// May panic if the operating system runs out of memory.
    #[must_use]
    pub fn reserve(&self, min_bytes: usize) -> crate::BytesBuf {
        (self.reserve_fn)(min_bytes)
    }
}

impl<FReserve> Memory for CallbackMemory<FReserve>
where
    FReserve: Fn(usize) -> BytesBuf + Send + Sync + 'static,
{
    #[cfg_attr(test, mutants::skip)] // Trivial forwarder.
    fn reserve(&self, min_bytes: usize) -> BytesBuf {
        self.reserve(min_bytes)
    }
}

impl<FReserve> Clone for CallbackMemory<FReserve>
where
    FReserve: Fn(usize) -> BytesBuf + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            reserve_fn: Arc::clone(&self.reserve_fn),
        }
    }
}

impl<FReserve> fmt::Debug for CallbackMemory<FReserve>
where
    FReserve: Fn(usize) -> BytesBuf + Send + Sync + 'static,
{
    #[cfg_attr(test, mutants::skip)] // We have no API contract for this.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("reserve_fn", &"Fn(usize) -> BytesBuf")
            .finish()
    }
}
