// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::num::NonZero;

use crate::mem::{ProvideMemory, SequenceBuilder};
use crate::pal::MemoryPool;

/// An implementation of [`MemoryPool`] that simply allocates memory from the default
/// Rust memory allocator to create a memory pool.
#[derive(Debug)]
pub struct DefaultMemoryPool {
    inner: oxidizer_mem::DefaultMemoryPool,
    block_size: NonZero<usize>,
}

impl DefaultMemoryPool {
    /// Creates a new `DefaultMemoryPool` with the specified block size.
    pub(crate) fn new(block_size: NonZero<usize>) -> Self {
        Self {
            block_size,
            inner: oxidizer_mem::DefaultMemoryPool::new(block_size),
        }
    }
}

impl MemoryPool for DefaultMemoryPool {
    fn rent(&self, count_bytes: usize, _preferred_block_size: NonZero<usize>) -> SequenceBuilder {
        self.inner.reserve(count_bytes)
    }
}

impl ProvideMemory for DefaultMemoryPool {
    fn reserve(&self, min_bytes: usize) -> SequenceBuilder {
        self.rent(min_bytes, self.block_size)
    }
}
