use std::cell::Cell;
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::alloc::align::check_align;
use crate::alloc::allocator::reallocate_by_copy;
use crate::alloc::{Allocator, InvalidFree, OutOfMemory, OwnedBuffer, UnknownBufferError, align_up};

/// A bump allocator working entirely within a caller-supplied region.
///
/// Each allocation aligns the cursor and advances it past the new buffer; once the region is
/// exhausted, allocation fails with [`OutOfMemory`]. Deallocation only reclaims memory for the most
/// recently issued buffer, by retracting the cursor to its start. Everything else stays used until
/// [`reset`](FixedBufferAllocator::reset).
///
/// # Time Complexity
/// | Method | Complexity |
/// |-|-|
/// | `allocate` | `O(1)` |
/// | `deallocate` | `O(1)` |
/// | `reallocate` | `O(1)`*, `O(n)` |
///
/// \* When resizing the most recent buffer while the region has room.
///
/// # Examples
/// ```
/// # use standard_sampler::alloc::{Allocator, FixedBufferAllocator, OutOfMemory};
/// let mut region = [0_u8; 64];
/// let fixed = FixedBufferAllocator::new(&mut region);
///
/// let a = fixed.allocate(40, 1).unwrap();
/// assert_eq!(fixed.allocate(40, 1).unwrap_err(), OutOfMemory);
///
/// // Freeing the last buffer gives its space back.
/// fixed.deallocate(a).unwrap();
/// assert!(fixed.allocate(40, 1).is_ok());
/// ```
#[derive(Debug)]
pub struct FixedBufferAllocator<'r> {
    region: NonNull<u8>,
    len: usize,
    end_index: Cell<usize>,
    _region: PhantomData<&'r mut [u8]>,
}

impl<'r> FixedBufferAllocator<'r> {
    /// Creates an allocator which hands out parts of `region`. The region is borrowed for as long as
    /// the allocator lives, so it can be inspected again once the allocator is dropped.
    pub fn new(region: &'r mut [u8]) -> FixedBufferAllocator<'r> {
        FixedBufferAllocator {
            len: region.len(),
            region: NonNull::from(region).cast(),
            end_index: Cell::new(0),
            _region: PhantomData,
        }
    }

    /// Returns the size of the backing region.
    pub const fn capacity(&self) -> usize {
        self.len
    }

    /// Returns the offset of the cursor within the region, which is the number of bytes used,
    /// including any alignment padding.
    pub fn end_index(&self) -> usize {
        self.end_index.get()
    }

    pub fn remaining(&self) -> usize {
        self.len - self.end_index.get()
    }

    /// Makes the whole region available again. Taking `&mut self` guarantees that no buffer from
    /// this allocator is still live.
    pub fn reset(&mut self) {
        self.end_index.set(0);
    }

    fn base(&self) -> usize {
        self.region.as_ptr().addr()
    }

    /// Returns true if the buffer lies inside the region.
    pub fn owns(&self, buffer: &OwnedBuffer<'_>) -> bool {
        let range = buffer.addr_range();
        range.start >= self.base() && range.end <= self.base() + self.len
    }

    fn is_last(&self, buffer: &OwnedBuffer<'_>) -> bool {
        self.owns(buffer) && buffer.addr_range().end - self.base() == self.end_index.get()
    }
}

impl Allocator for FixedBufferAllocator<'_> {
    fn allocate(&self, size: usize, align: usize) -> Result<OwnedBuffer<'_>, OutOfMemory> {
        check_align(align);
        if size == 0 {
            return Ok(OwnedBuffer::empty(align));
        }

        let base = self.base();
        // base + end_index is inside the region, so only the alignment can overflow.
        let start = align_up(base + self.end_index.get(), align).ok_or(OutOfMemory)? - base;
        let end = start.checked_add(size).ok_or(OutOfMemory)?;

        if end > self.len {
            return Err(OutOfMemory);
        }

        self.end_index.set(end);

        // SAFETY: start < end <= len, so the new buffer is inside the region, and it begins at or
        // after the previous cursor, so it doesn't overlap any live buffer. The region is an
        // initialized byte slice borrowed mutably for 'r.
        unsafe {
            let ptr = self.region.add(start);
            Ok(OwnedBuffer::from_raw_parts(ptr, size, align))
        }
    }

    fn deallocate(&self, buffer: OwnedBuffer<'_>) -> Result<(), InvalidFree> {
        if buffer.is_empty() {
            return Ok(());
        }

        if !self.owns(&buffer) {
            return Err(UnknownBufferError { addr: buffer.addr() }.into());
        }

        if self.is_last(&buffer) {
            self.end_index.set(buffer.addr() - self.base());
        }

        Ok(())
    }

    fn reallocate<'a>(
        &'a self,
        buffer: &mut OwnedBuffer<'a>,
        new_size: usize,
    ) -> Result<(), OutOfMemory> {
        if new_size > 0 && !buffer.is_empty() && self.is_last(buffer) {
            let start = buffer.addr() - self.base();
            match start.checked_add(new_size) {
                Some(end) if end <= self.len => {
                    self.end_index.set(end);
                    // SAFETY: The buffer is the last one issued, so everything from its start up
                    // to end is inside the region and unused by any other buffer.
                    unsafe { buffer.set_len(new_size) };
                    return Ok(());
                },
                _ => {},
            }
        }

        reallocate_by_copy(self, buffer, new_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhaustion() {
        let mut region = [0_u8; 100];
        let fixed = FixedBufferAllocator::new(&mut region);

        let mut total = 0;
        let mut buffers = Vec::new();
        loop {
            match fixed.allocate(7, 1) {
                Ok(buf) => {
                    total += buf.len();
                    buffers.push(buf);
                },
                Err(OutOfMemory) => break,
            }
        }

        assert_eq!(buffers.len(), 14, "100 bytes should hold 14 buffers of 7 bytes.");
        assert!(total <= fixed.capacity(), "Allocations should never exceed the region.");
        assert_eq!(
            fixed.allocate(7, 1).unwrap_err(),
            OutOfMemory,
            "The allocation following exhaustion should fail."
        );
        assert!(fixed.allocate(2, 1).is_ok(), "Smaller requests can still fit in the tail.");
    }

    #[test]
    fn test_alignment_padding() {
        let mut region = [0_u8; 64];
        let fixed = FixedBufferAllocator::new(&mut region);

        let _a = fixed.allocate(1, 1).unwrap();
        let b = fixed.allocate(8, 8).unwrap();
        assert_eq!(b.addr() % 8, 0, "The cursor should be aligned before bumping.");
        assert!(fixed.end_index() >= 9);
    }

    #[test]
    fn test_retract_last() {
        let mut region = [0_u8; 32];
        let fixed = FixedBufferAllocator::new(&mut region);

        let a = fixed.allocate(8, 1).unwrap();
        let b = fixed.allocate(8, 1).unwrap();
        let b_addr = b.addr();

        fixed.deallocate(a).unwrap();
        assert_eq!(fixed.end_index(), 16, "Freeing an earlier buffer shouldn't move the cursor.");

        fixed.deallocate(b).unwrap();
        assert_eq!(fixed.end_index(), 8, "Freeing the last buffer should retract the cursor.");

        let c = fixed.allocate(8, 1).unwrap();
        assert_eq!(c.addr(), b_addr, "The retracted space should be reused.");
    }

    #[test]
    fn test_in_place_reallocate() {
        let mut region = [0_u8; 32];
        let fixed = FixedBufferAllocator::new(&mut region);

        let mut a = fixed.allocate(4, 1).unwrap();
        a.copy_from_slice(b"abcd");
        let addr = a.addr();

        fixed.reallocate(&mut a, 12).unwrap();
        assert_eq!(a.addr(), addr, "The last buffer should grow in place.");
        assert_eq!(&a[..4], b"abcd");
        assert_eq!(fixed.end_index(), 12);

        let mut b = fixed.allocate(4, 1).unwrap();
        b.copy_from_slice(b"wxyz");
        fixed.reallocate(&mut a, 16).unwrap();
        assert_ne!(a.addr(), addr, "A buffer which isn't last has to move.");
        assert_eq!(&a[..4], b"abcd", "Moving should keep the contents.");

        assert_eq!(fixed.reallocate(&mut a, 64).unwrap_err(), OutOfMemory);
        assert_eq!(a.len(), 16, "A failed reallocation should leave the buffer untouched.");
        assert_eq!(&*b, b"wxyz");
    }

    #[test]
    fn test_foreign_and_reset() {
        let mut other = [0_u8; 8];
        let mut region = [0_u8; 16];
        let mut fixed = FixedBufferAllocator::new(&mut region);

        // SAFETY: other outlives the buffer and isn't touched meanwhile.
        let foreign = unsafe { OwnedBuffer::from_raw_parts(NonNull::from(&mut other).cast(), 8, 1) };
        assert!(fixed.deallocate(foreign).unwrap_err().is_unknown_buffer());

        let _ = fixed.allocate(16, 1).unwrap();
        assert_eq!(fixed.remaining(), 0);
        fixed.reset();
        assert_eq!(fixed.remaining(), 16, "Reset should make the region available again.");
    }
}
