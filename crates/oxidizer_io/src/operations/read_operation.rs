// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::{Arc, Weak};

use bytes::BufMut;
use negative_impl::negative_impl;
use tracing::{Level, event};

use crate::mem::{SequenceBuilder, SequenceBuilderAvailableIterator};
use crate::pal::ElementaryOperationKey;
use crate::{BeginResult, BoundPrimitiveRef, Operation, Resources, UserResource};

/// An I/O operation that reads some bytes of data by issuing a
/// single elementary "read" operation to the operating system.
///
/// User code typically does not need to interact with this type directly, as it is primarily used
/// to build higher-level I/O endpoint types (e.g. file, socket, tcp server, ...).
///
/// # Vectored read support in native I/O APIs
///
/// Not every native API supports vectored I/O. Some APIs support it but only when certain
/// preconditions are met (e.g. aligned buffers). If the conditions are not suitable to use
/// vectored I/O, a typical implementation is to only read enough data to fill the first chunk
/// in the callback provided to `begin()`.
#[derive(Debug)]
pub struct ReadOperation {
    // This ensures that the primitive we are operating on is kept alive until we issue the I/O
    // to the operating system (assuming that it is even alive once we start the operation - there
    // may be a delay between the user enqueuing I/O and the operation actually starting).
    primitive: Weak<BoundPrimitiveRef>,

    offset: u64,
    user_resources: Option<Box<dyn UserResource>>,
    buffer: SequenceBuilder,
    resources: Arc<Resources>,
}

impl ReadOperation {
    /// # Panics
    ///
    /// Panics if the sequence builder has a capacity of 0. A read with no capacity is likely to be
    /// a programming error. If you truly need to read 0 bytes, model it as a control operation.
    pub(crate) fn new(
        primitive: Weak<BoundPrimitiveRef>,
        buffer: SequenceBuilder,
        resources: Arc<Resources>,
    ) -> Self {
        assert_ne!(
            buffer.capacity(),
            0,
            "a read operation requires more than 0 bytes of capacity"
        );

        Self {
            primitive,
            offset: 0,
            user_resources: None,
            buffer,
            resources,
        }
    }

    /// For seekable I/O primitives (e.g. files), sets the offset where the operation
    /// should be performed.
    ///
    /// An I/O endpoint implementation must not set an offset (i.e. not call this method)
    /// if the I/O primitive has no concept of seeking/offset. Even specifying a value of 0
    /// indicates that a concept of "offset" is recognized by the I/O primitive.
    #[must_use]
    pub const fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Attaches an arbitrary value to the operation, to be dropped once the operation completes.
    ///
    /// This can be used to ensure some resources remain alive while the operation is in progress,
    /// even if the future driving the operation is dropped.
    #[must_use]
    pub fn with_resources(mut self, resources: impl UserResource) -> Self {
        self.user_resources = Some(Box::new(resources));
        self
    }

    /// Begins an asynchronous I/O operation by performing exactly one asynchronous system call
    /// in the callback provided to this method.
    ///
    /// The callback must perform exactly one system call, and return a `BeginResult` indicating
    /// whether the operation completed synchronously or was scheduled for asynchronous completion.
    ///
    /// The callback may be called at any point up until the returned future completes. In
    /// particular, it is not guaranteed to be called during `begin()` and not even guaranteed
    /// to be called on the same thread.
    ///
    /// If the primitive is closed before the future completes, the operation may be canceled and
    /// the callback may never get called.
    ///
    /// If the operation succeeds, the output will be a tuple with the number of bytes read and
    /// the same `SequenceBuilder` that was used to create the operation, now with the read
    /// bytes appended to it.
    ///
    /// # Panics
    ///
    /// Panics if the callback was called but it never requested the platform-specific system call
    /// parameters from the `ReadOperationArgs` struct, indicating that it did not perform any
    /// system call as was required.
    pub async fn begin<C>(mut self, callback: C) -> Result<(usize, SequenceBuilder), crate::Error>
    where
        C: for<'operation, 'callback> FnOnce(
                &'callback BoundPrimitiveRef,
                ReadOperationArgs<'operation, 'callback>,
            ) -> BeginResult<()>
            + Send
            + 'static,
    {
        // Note: in the future, all of this logic here may be deferred and batched. The current
        // implementation does it all immediately but while still valid, this is a special case.

        // We keep the primitive alive until we start the operation. Once the operation has
        // started (i.e. once the callback has been called), we no longer need to keep it alive
        // and drop this to allow cleanup if this operation is the last one keeping it alive,
        // at which point the OS may simply cancel the operation itself (which is fine).
        let Some(primitive) = self.primitive.upgrade() else {
            // The primitive was already closed before we started the operation.
            return Err(crate::Error::Canceled);
        };

        let usable_remaining = self.buffer.remaining_mut();

        // We constrain the capacity we are willing to use to u32::MAX because the operating
        // system APIs can only handle this many bytes per elementary operation.
        //
        // As we are dealing with a read operation, which has "at most" behavior, we cannot
        // automatically re-issue the operation to read more data because it may be valid and
        // intentional to terminate the read at any point - it depends on the caller's logic.
        let usable_remaining = usable_remaining.min(u32::MAX as usize);

        // We are reading bytes by writing them into a SequenceBuilder, which is a "read"
        // operation in terms of I/O primitive but a "write" in terms of SequenceBuilder.
        //
        // Even if the underlying I/O primitive does not support vectored I/O, we still treat it
        // as vectored - the I/O subsystem does not know if the callback is capable of filling
        // multiple chunks sequentially, so we just assume it is. If not, the 2nd and further
        // chunks will simply be ignored by the callback and remain empty.
        let mut vectored_write = self
            .buffer
            .begin_vectored_write_checked(Some(usable_remaining))
            .expect("guarded by usable_remaining logic above");

        // This guard will keep the I/O blocks alive until the operation completes, ensuring
        // that the memory remains valid even if the caller abandons this operation and drops the
        // future (releasing the SequenceBuilder we keep in the state machine). From Rust code,
        // the SequenceBuilder (and the SpanBuilder inside) have exclusive access, so we can be sure
        // that even if the Rust side is dropped, no concurrent access from Rust will occur while
        // the operating system is using the referenced memory in these blocks. Note that the I/O
        // blocks may also include memory not covered by our SpanBuilder instances, which is
        // accessed independently and out of our jurisdiction.
        let memory_guard = vectored_write.extend_lifetime();

        // This is where the callback will write any read bytes.
        let chunks_iter = vectored_write.iter_chunks_mut();

        let mut operation = Operation::new(
            self.offset,
            memory_guard,
            self.user_resources.take(),
            self.resources.pal(),
        );

        event!(
            Level::TRACE,
            message = "elementary begin",
            key = operation.elementary_operation_key().0
        );

        let result_rx = operation.take_result_rx();
        let elementary_operation_key = operation.elementary_operation_key();

        let mut bytes_read_synchronously: u32 = 0;

        let args = ReadOperationArgs {
            chunks_iter,
            elementary_operation_key: Some(elementary_operation_key),
            bytes_read: &mut bytes_read_synchronously,
        };

        let synchronous_result = callback(&primitive, args);

        // The operation has started (or synchronously completed) and we no longer have
        // any need to keep the primitive alive (especially if we are going to suspend and await).
        // If someone cares about the operation completing asynchronously, they need to
        // keep the primitive alive themselves.
        drop(primitive);

        match synchronous_result {
            BeginResult::Asynchronous => {
                // Everything is going well, now we just need to wire up to await the result.
                event!(
                    Level::TRACE,
                    message = "elementary async",
                    key = elementary_operation_key.0,
                );
            }
            BeginResult::CompletedSynchronously(result) => {
                event!(
                    Level::TRACE,
                    message = "elementary immediate",
                    result = ?result,
                    key = elementary_operation_key.0,
                    bytes_read_synchronously
                );

                return match result {
                    Ok(()) => {
                        // The operation completed synchronously. This means we will not get a
                        // completion notification and must handle the result inline.

                        let bytes_read_synchronously_usize = usize::try_from(bytes_read_synchronously)
                            .expect("the operation uses a buffer constrained to <= usize::MAX, so it cannot transfer more than usize::MAX");

                        // If the number of bytes read went over our capacity, we have
                        // overflowed a buffer (e.g. because syscall arguments were improperly
                        // prepared) and it is no longer safe to continue process execution.
                        assert!(bytes_read_synchronously_usize <= usable_remaining);

                        // SAFETY: We have to ensure that the bytes really were initialized with
                        // data. The callback says they were and we have no reason not to trust it.
                        unsafe {
                            vectored_write.commit(bytes_read_synchronously_usize);
                        }

                        Ok((bytes_read_synchronously_usize, self.buffer))
                    }
                    Err(e) => {
                        // Something went wrong. In this case, the elementary operation
                        // was not written by the OS and no completion notification will
                        // be received by the completion queue.
                        Err(e)
                    }
                };
            }
        }

        // We register the operation in the resource set so that the I/O driver
        // can find it once we receive the completion notification.
        self.resources
            .operations_mut()
            .insert(elementary_operation_key, operation);

        let bytes_read = result_rx
            .await
            .expect("I/O driver side of an I/O operation vanished while awaiting result")?;

        let bytes_read_usize = usize::try_from(bytes_read)
            .expect("the operation uses a buffer constrained to <= usize::MAX, so it cannot transfer more than usize::MAX");

        // If the number of bytes read went over our capacity, we have
        // overflowed a buffer (e.g. because syscall arguments were improperly
        // prepared) and it is no longer safe to continue process execution.
        assert!(bytes_read_usize <= usable_remaining);

        // SAFETY: We have to ensure that the bytes really were initialized with
        // data. The callback says they were and we have no reason not to trust it.
        unsafe {
            vectored_write.commit(bytes_read_usize);
        }

        Ok((bytes_read_usize, self.buffer))
    }
}

/// Arguments provided by the I/O subsystem to the `begin()` callback that executes an elementary
/// I/O operation to induce the operating system to read some bytes of data.
///
/// # Resource management
///
/// References with the `'operation` lifetime are valid for the entire duration of the elementary
/// operation, up until the operating system notifies us that the operation has been completed.
///
/// This means the references remain valid even when moved out of the domain of the Rust borrow
/// checker as pointers, and may be handed to the operating system. The full I/O operation
/// lifetime does not map to a single Rust lifetime - the `'operation` lifetime is merely a marker.
///
/// References with the `'callback` lifetime are valid for the duration of the callback
/// that provides this arguments object.
#[derive(Debug)]
pub struct ReadOperationArgs<'operation, 'callback> {
    chunks_iter: SequenceBuilderAvailableIterator<'operation>,
    bytes_read: &'callback mut u32,

    // This is Option because it can only be called once (to consume it) because each `begin()` is
    // only intended to start a single system call. We use the Option to protect against double-get
    // and to ensure (via Drop check) that the caller does consume it (if not - no syscall made?!)
    //
    // Of course, even if the callback asks for the system call parameters exactly once, there is
    // no guarantee we can get here that it will use the parameters to actually make a system call
    // but if it does not, that is merely a memory leak and not a safety issue, so good enough.
    elementary_operation_key: Option<ElementaryOperationKey>,
}

impl<'operation> ReadOperationArgs<'operation, '_> {
    /// Iterate over the chunks of memory that may be filled by the elementary I/O operation.
    ///
    /// The operation may fill the chunks in any amount (including producing 0 bytes) but must fill
    /// them in order and without leaving any gaps when the chunks are viewed as a concatenated
    /// sequence.
    pub const fn iter_chunks(&mut self) -> &mut SequenceBuilderAvailableIterator<'operation> {
        &mut self.chunks_iter
    }

    /// Gets an exclusive reference to a field that must be set to the number of bytes that were
    /// read by the operation if the operation completes synchronously, as signaled by
    /// a callback return value of [`BeginResult::CompletedSynchronously`].
    ///
    /// This field is ignored if the operation will complete asynchronously, as signaled by a
    /// callback return value of [`BeginResult::Asynchronous`].
    pub const fn bytes_read_synchronously_as_mut(&mut self) -> &mut u32 {
        self.bytes_read
    }

    /// # Panics
    ///
    /// Panics if called more than once.
    pub(crate) const fn consume_elementary_operation_key(&mut self) -> ElementaryOperationKey {
        self.elementary_operation_key
            .take()
            .expect("elementary operation consumed more than once from ReadOperationArgs")
    }
}

impl Drop for ReadOperationArgs<'_, '_> {
    fn drop(&mut self) {
        assert!(
            self.elementary_operation_key.is_none(),
            "system call parameters not consumed from ReadOperationArgs - no system call could have been made"
        );
    }
}

#[negative_impl]
impl !Send for ReadOperationArgs<'_, '_> {}
#[negative_impl]
impl !Sync for ReadOperationArgs<'_, '_> {}
