// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::io::{self, BufRead, Read};

use crate::BytesView;

/// Adapter that implements [`Read`] and [`BufRead`] for [`BytesView`].
///
/// Create an instance via [`BytesView::reader()`][1].
///
/// Because [`BytesView`] is already buffered, this adapter implements [`BufRead`] directly
/// without needing an intermediate buffer. Prefer this over wrapping in [`std::io::BufReader`].
///
/// [1]: crate::BytesView::reader
#[derive(Debug)]
pub struct BytesViewReader<'b> {
    inner: &'b mut BytesView,
}

impl<'b> BytesViewReader<'b> {
    #[must_use]
    pub(crate) const fn new(inner: &'b mut BytesView) -> Self {
        Self { inner }
    }
}

impl Read for BytesViewReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.inner.is_empty() {
            return Ok(0);
        }

        let to_read = buf.len().min(self.inner.len());
        self.inner.copy_to_slice(&mut buf[..to_read]);
        Ok(to_read)
    }
}

impl BufRead for BytesViewReader<'_> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        Ok(self.inner.first_slice())
    }

    fn consume(&mut self, amount: usize) {
        self.inner.advance(amount);
    }
}
