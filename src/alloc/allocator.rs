use std::cmp;
use std::mem;
use std::ptr;

use crate::alloc::{InvalidFree, OutOfMemory, OwnedBuffer};
use crate::util::panic::Panic;

/// The capability of handing out and reclaiming [`OwnedBuffer`]s.
///
/// Methods take `&self` so that several buffers from one allocator can be live at once. Stateful
/// strategies keep their bookkeeping in [`Cell`](std::cell::Cell)s, which makes them `!Sync`:
/// sharing one between threads needs external synchronization.
///
/// # Contract
/// - `allocate(size, align)` returns a buffer of exactly `size` bytes aligned to `align`, which
///   doesn't overlap any other live buffer from the same allocator. A `size` of zero returns an
///   [empty buffer](OwnedBuffer::empty).
/// - `deallocate` consumes a buffer previously returned by the same allocator. Empty buffers are
///   always accepted. Anything else the allocator can identify as foreign is an [`InvalidFree`].
///
/// # Panics
/// Implementations panic if `align` isn't a power of two.
pub trait Allocator {
    fn allocate(&self, size: usize, align: usize) -> Result<OwnedBuffer<'_>, OutOfMemory>;

    fn deallocate(&self, buffer: OwnedBuffer<'_>) -> Result<(), InvalidFree>;

    /// Changes the size of `buffer` to `new_size`, keeping the first `min(old, new)` bytes. On
    /// failure, `buffer` is left untouched.
    ///
    /// The default implementation allocates a new buffer, copies the contents across and
    /// deallocates the old one.
    ///
    /// # Panics
    /// Panics if `buffer` wasn't issued by this allocator.
    fn reallocate<'a>(
        &'a self,
        buffer: &mut OwnedBuffer<'a>,
        new_size: usize,
    ) -> Result<(), OutOfMemory> {
        reallocate_by_copy(self, buffer, new_size)
    }
}

/// The fallback reallocation strategy shared by every [`Allocator`].
pub(crate) fn reallocate_by_copy<'a, A: Allocator + ?Sized>(
    allocator: &'a A,
    buffer: &mut OwnedBuffer<'a>,
    new_size: usize,
) -> Result<(), OutOfMemory> {
    if new_size == buffer.len() {
        return Ok(());
    }

    let mut new_buffer = allocator.allocate(new_size, buffer.align())?;
    let count = cmp::min(buffer.len(), new_size);

    // SAFETY: Both buffers are valid for at least count bytes and are distinct live allocations,
    // so they can't overlap.
    unsafe {
        ptr::copy_nonoverlapping(buffer.as_ptr(), new_buffer.as_mut_ptr(), count);
    }

    let old_buffer = mem::replace(buffer, new_buffer);
    if let Err(err) = allocator.deallocate(old_buffer) {
        err.panic()
    }

    Ok(())
}

impl<A: Allocator + ?Sized> Allocator for &A {
    fn allocate(&self, size: usize, align: usize) -> Result<OwnedBuffer<'_>, OutOfMemory> {
        (**self).allocate(size, align)
    }

    fn deallocate(&self, buffer: OwnedBuffer<'_>) -> Result<(), InvalidFree> {
        (**self).deallocate(buffer)
    }

    fn reallocate<'a>(
        &'a self,
        buffer: &mut OwnedBuffer<'a>,
        new_size: usize,
    ) -> Result<(), OutOfMemory> {
        (**self).reallocate(buffer, new_size)
    }
}
