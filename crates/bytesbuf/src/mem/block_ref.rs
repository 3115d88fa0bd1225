// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::any::Any;
use std::marker::PhantomData;
use std::ptr::NonNull;

/// References a block of memory capacity rented from a memory provider.
///
/// While a memory provider only leases each block to one caller at a time, this caller may further
/// share and subdivide the block between multiple co-owners. These co-owners will coordinate the
/// read/write permissions over different slices of the block via their own logic, with the
/// `BlockRef` only used to represent the block as a whole, each co-owner having a cloned
/// `BlockRef` to the same block.
///
/// # Implementation design
///
/// Each memory provider implements its own accounting logic for tracking the memory blocks it
/// provides. This takes the form of a "manual" dynamic dispatch implementation via a function
/// table and data pointer passed to [`new()`][1].
///
/// You can think of `BlockRef` as an `Arc<RealBlock>`, except we are intentionally obscuring the
/// `RealBlock` from the API surface to allow all code upstream of `BlockRef` to be ignorant of the
/// real type of the block.
///
/// The assumption is that an efficient memory provider will allocate its data objects in a pool,
/// so if the `BlockRef` itself is held on the stack, there are no heap allocations necessary to
/// operate on memory blocks. This would be infeasible to achieve with trait objects, which are
/// unsized and have significant limitations on how they can be used. This is why we use the
/// manual dynamic dispatch mechanism instead of using Rust's trait system.
///
/// [1]: Self::new
#[derive(Debug)]
pub struct BlockRef {
    // Note that this entire object is simply a fat pointer - there is no real state.
    // At rent-time, some state is presented to the `SpanBuilder` that takes ownership
    // of the memory block but this is not preserved in the block reference itself.
    state: OpaqueStatePtr,
    vtable: &'static BlockRefVTableInner,
}

impl BlockRef {
    /// Creates a new block reference using the provided dynamic implementation
    /// state and matching function table.
    ///
    /// # Safety
    ///
    /// `state` must remain valid for reads and writes until `BlockRefDynamic::drop`
    /// is called via `vtable`.
    #[must_use]
    pub const unsafe fn new<T: BlockRefDynamic>(state: NonNull<T::State>, vtable: &'static BlockRefVTable<T>) -> Self {
        Self {
            state: state.cast(),
            vtable: &vtable.inner,
        }
    }

    /// Memory provider specific metadata describing the block.
    #[must_use]
    pub fn meta(&self) -> Option<&dyn Any> {
        self.vtable.meta.map(|f| {
            // SAFETY: We are required to pass the original `state` here. We do.
            let meta_ptr = unsafe { f(self.state) };

            // SAFETY: The implementation is required to return a pointer that is valid for
            // reads for the lifetime of the `BlockRef`, so all is well here
            // because the returned reference borrows the `BlockRef`.
            unsafe { meta_ptr.as_ref() }
        })
    }
}

impl Clone for BlockRef {
    fn clone(&self) -> Self {
        // SAFETY: We are required to pass the original `state` here. We do.
        let new_data = unsafe { (self.vtable.clone)(self.state) };

        Self {
            state: new_data,
            vtable: self.vtable,
        }
    }
}

impl Drop for BlockRef {
    fn drop(&mut self) {
        // SAFETY: We are required to pass the original `state` here. We do.
        unsafe { (self.vtable.drop)(self.state) }
    }
}

type OpaqueStatePtr = NonNull<()>;

// # Safety
//
// These functions must always be called with the original `OpaqueStatePtr` supplied by the memory
// provider when creating the BlockRef (with clones using the clone's `OpaqueStatePtr`, respectively).
type CloneFn = unsafe fn(state: OpaqueStatePtr) -> OpaqueStatePtr;
type DropFn = unsafe fn(state: OpaqueStatePtr);
type MetaFn = unsafe fn(state: OpaqueStatePtr) -> NonNull<dyn Any>;

// SAFETY: The safety requirements of the dynamic implementation traits require thread-safety.
// The type itself consists entirely of data fields treated as read-only, so the
// thread-safety guarantee only relies on the implementation behind the trait being thread-safe.
unsafe impl Send for BlockRef {}

// SAFETY: The safety requirements of the dynamic implementation traits require thread-safety.
// The type itself consists entirely of data fields treated as read-only, so the
// thread-safety guarantee only relies on the implementation behind the trait being thread-safe.
unsafe impl Sync for BlockRef {}

#[derive(Debug)]
struct BlockRefVTableInner {
    clone: CloneFn,
    drop: DropFn,
    meta: Option<MetaFn>,
}

/// Function table that implements [`BlockRef`] for a specific memory provider.
///
/// Wraps a specific memory provider's [`BlockRefDynamic`] or [`BlockRefDynamicWithMeta`]
/// implementation into a form required to construct a [`BlockRef`].
#[derive(Debug)]
pub struct BlockRefVTable<T> {
    inner: BlockRefVTableInner,
    _t: PhantomData<T>,
}

impl<T: BlockRefDynamicWithMeta> BlockRefVTable<T> {
    #[expect(missing_docs, reason = "TODO")]
    #[must_use]
    pub const fn from_trait_with_meta() -> Self {
        Self {
            inner: BlockRefVTableInner {
                clone: wrap_clone::<T>,
                drop: wrap_drop::<T>,
                meta: Some(wrap_meta::<T>),
            },
            _t: PhantomData,
        }
    }
}

impl<T: BlockRefDynamic> BlockRefVTable<T> {
    #[expect(missing_docs, reason = "TODO")]
    #[must_use]
    pub const fn from_trait() -> Self {
        Self {
            inner: BlockRefVTableInner {
                clone: wrap_clone::<T>,
                drop: wrap_drop::<T>,
                meta: None,
            },
            _t: PhantomData,
        }
    }
}

#[cfg_attr(test, mutants::skip)] // Mutations can violate memory safety and cause UB.
fn wrap_clone<T: BlockRefDynamic>(state_ptr: OpaqueStatePtr) -> OpaqueStatePtr {
    T::clone(state_ptr.cast()).cast()
}

#[cfg_attr(test, mutants::skip)] // Mutations can violate memory safety and cause UB.
fn wrap_drop<T: BlockRefDynamic>(state_ptr: OpaqueStatePtr) {
    T::drop(state_ptr.cast());
}

fn wrap_meta<T: BlockRefDynamicWithMeta>(state_ptr: OpaqueStatePtr) -> NonNull<dyn Any> {
    T::meta(state_ptr.cast())
}

/// Implements [`BlockRefVTable`] via a trait, without publishing block metadata.
///
/// This is the minimal that required to implement a [`BlockRef`] for a memory provider.
///
/// A typical high-efficiency implementation for a pooling memory provider will resemble something
/// like an `Arc<...>`, with cloning and dropping adjusting the reference count and potentially
/// returning the block to the pool.
///
/// # Safety
///
/// A [`BlockRef`] may move between threads and be accessed from any thread, while different
/// clones of a [`BlockRef`] may be accessed concurrently from different threads.
///
/// The implementation must accordingly be thread-safe to the degree required to
/// correctly operate under these conditions.
pub unsafe trait BlockRefDynamic {
    /// The inner state passed from the [`BlockRef`] to the implementation
    /// of this trait with each function call.
    type State;

    /// Will be called when a [`BlockRef`] is cloned, which means ownership of the block is
    /// to be shared with another co-owner.
    ///
    /// The owners themselves coordinate who owns which part of the block and the [`BlockRef`]
    /// always represents the block as a whole.
    ///
    /// # Returns
    ///
    /// Returns a pointer to use for the dynamic implementation state of the new clone.
    /// The same state may be reused between clones, so the returned pointer may just be
    /// a pointer to the first function parameter received here.
    ///
    /// The pointer must be valid for reads for the lifetime of the clone and there must never
    /// exist any exclusive references to it, as the caller will create shared references on
    /// demand.
    fn clone(state_ptr: NonNull<Self::State>) -> NonNull<Self::State>;

    /// Will be called when a [`BlockRef`] is dropped.
    ///
    /// The caller will not access `state` after this call, so it is safe to deallocate the
    /// backing memory if the implementation itself no longer needs the state.
    fn drop(state_ptr: NonNull<Self::State>);
}

/// Implements [`BlockRefVTable`] via a trait.
///
/// This is an extension of [`BlockRefDynamic`] that adds the ability to
/// retrieve metadata about the memory block.
///
/// # Safety
///
/// A [`BlockRef`] may move between threads and be accessed from any thread, while different
/// clones of a [`BlockRef`] may be accessed concurrently from different threads.
///
/// The implementation must accordingly be thread-safe to the degree required to
/// correctly operate under these conditions.
pub unsafe trait BlockRefDynamicWithMeta: BlockRefDynamic {
    /// Will be called to retrieve the memory provider specific metadata of the memory block.
    ///
    /// Must return a pointer to an object whose lifetime it least as long as all clones of
    /// the [`BlockRef`] and which is valid for reads.
    fn meta(state_ptr: NonNull<Self::State>) -> NonNull<dyn Any>;
}
