// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use bytes::Buf;

use crate::ReadStream;
use crate::mem::{FakeMemoryProvider, ProvideMemory, Sequence, SequenceBuilder};

/// A `ReadStream` implementation that reads data from fake I/O memory.
/// For test and example purposes only, not for real I/O.
#[derive(Debug)]
pub struct FakeReadStream {
    inner: Sequence,

    // For testing purposes, we may choose to limit the read size and
    // thereby force the caller to do multiple read operations.
    max_read_size: Option<usize>,
}

impl FakeReadStream {
    // Trivial code for testing and examples, do not spend mutation time on this.
    #[cfg_attr(test, mutants::skip)]
    #[must_use]
    pub const fn new(inner: Sequence) -> Self {
        Self {
            inner,
            max_read_size: None,
        }
    }

    // Trivial code for testing and examples, do not spend mutation time on this.
    #[cfg_attr(test, mutants::skip)]
    #[must_use]
    pub const fn with_max_read_size(inner: Sequence, max_read_size: usize) -> Self {
        Self {
            inner,
            max_read_size: Some(max_read_size),
        }
    }
}

const PREFERRED_READ_SIZE: usize = 100;

impl ReadStream for FakeReadStream {
    async fn read_at_most_into(
        &mut self,
        len: usize,
        mut into: SequenceBuilder,
    ) -> crate::Result<(usize, SequenceBuilder)> {
        let bytes_to_read = len
            .min(self.inner.remaining())
            .min(self.max_read_size.unwrap_or(usize::MAX));

        if bytes_to_read == 0 {
            return Ok((0, into));
        }

        let sequence_to_read = self.inner.slice(0..bytes_to_read);
        into.append(sequence_to_read);

        self.inner.advance(bytes_to_read);

        Ok((bytes_to_read, into))
    }

    async fn read_more_into(
        &mut self,
        into: SequenceBuilder,
    ) -> crate::Result<(usize, SequenceBuilder)> {
        self.read_at_most_into(PREFERRED_READ_SIZE, into).await
    }

    async fn read_any(&mut self) -> crate::Result<SequenceBuilder> {
        Ok(self
            .read_at_most_into(PREFERRED_READ_SIZE, SequenceBuilder::new())
            .await?
            .1)
    }
}

impl ProvideMemory for FakeReadStream {
    // Trivial code for testing and examples, do not spend mutation time on this.
    #[cfg_attr(test, mutants::skip)]
    fn reserve(&self, min_bytes: usize) -> SequenceBuilder {
        FakeMemoryProvider.reserve(min_bytes)
    }
}
