use std::cell::Cell;
use std::cmp;
use std::mem::{self, ManuallyDrop};
use std::ptr::{self, NonNull};

use crate::alloc::align::check_align;
use crate::alloc::{Allocator, InvalidFree, OutOfMemory, OwnedBuffer, UnknownBufferError, align_up};

const MIN_CHUNK_SIZE: usize = 256;
const GROWTH_FACTOR: usize = 2;

/// The link stored at the start of every chunk, pointing back to the chunk obtained before it.
struct ChunkHeader {
    prev: Option<NonNull<ChunkHeader>>,
    len: usize,
    issuer: usize,
}

const HEADER_SIZE: usize = mem::size_of::<ChunkHeader>();
const HEADER_ALIGN: usize = mem::align_of::<ChunkHeader>();

#[derive(Debug, Clone, Copy)]
enum ArenaState {
    Empty,
    Active {
        head: NonNull<ChunkHeader>,
        cursor: usize,
    },
}

/// An allocator which bump-allocates from chunks obtained from a child allocator and releases them
/// all at once.
///
/// When the current chunk can't fit a request, a new chunk at least twice as large is requested
/// from the child. The chunks form a linked list threaded through their own headers,
/// so the arena needs no memory of its own. Deallocating an individual buffer does nothing: every
/// chunk goes back to the child when the arena is dropped or [`reset`](ArenaAllocator::reset).
///
/// The arena is either empty (no chunks) or active (a chunk list and a cursor into its newest
/// chunk). Tearing it down releases everything; there is no partial release.
///
/// # Examples
/// ```
/// # use standard_sampler::alloc::{Allocator, ArenaAllocator, FixedBufferAllocator};
/// let mut region = [0_u8; 4096];
/// let fixed = FixedBufferAllocator::new(&mut region);
/// {
///     let arena = ArenaAllocator::new(&fixed);
///     for i in 0..20 {
///         let buf = arena.allocate(i * 4 + 1, 4).unwrap();
///         assert_eq!(buf.len(), i * 4 + 1);
///     }
///     assert!(arena.chunk_count() > 1);
/// }
/// // Every chunk has been handed back to the child.
/// assert!(fixed.allocate(4000, 1).is_ok());
/// ```
pub struct ArenaAllocator<A: Allocator> {
    child: A,
    state: Cell<ArenaState>,
}

impl<A: Allocator> ArenaAllocator<A> {
    /// Creates an empty arena. No memory is requested from `child` until the first allocation.
    pub const fn new(child: A) -> ArenaAllocator<A> {
        ArenaAllocator {
            child,
            state: Cell::new(ArenaState::Empty),
        }
    }

    pub const fn child(&self) -> &A {
        &self.child
    }

    /// Returns the number of chunks currently obtained from the child allocator.
    pub fn chunk_count(&self) -> usize {
        self.chunks().count()
    }

    /// Returns the total size of all chunks, including their headers.
    pub fn capacity(&self) -> usize {
        self.chunks()
            // SAFETY: Every chunk in the list has an initialized header.
            .map(|head| unsafe { head.as_ref().len })
            .sum()
    }

    /// Returns every chunk to the child allocator, leaving the arena empty. Taking `&mut self`
    /// guarantees that no buffer from this arena is still live.
    pub fn reset(&mut self) {
        self.release();
    }

    /// Tears down the arena and returns the child allocator.
    pub fn into_child(self) -> A {
        let mut this = ManuallyDrop::new(self);
        this.release();
        // SAFETY: this is never used or dropped again, so the child is moved out exactly once.
        unsafe { ptr::read(&this.child) }
    }

    fn chunks(&self) -> impl Iterator<Item = NonNull<ChunkHeader>> + '_ {
        let head = match self.state.get() {
            ArenaState::Empty => None,
            ArenaState::Active { head, .. } => Some(head),
        };
        // SAFETY: Every chunk in the list has an initialized header.
        std::iter::successors(head, |chunk| unsafe { chunk.as_ref().prev })
    }

    /// Bumps the cursor of `head` to fit `size` bytes, returning the start of the new buffer and the
    /// new cursor, or [`None`] if the chunk is too full.
    fn bump(
        head: NonNull<ChunkHeader>,
        cursor: usize,
        size: usize,
        align: usize,
    ) -> Option<(NonNull<u8>, usize)> {
        let base = head.as_ptr().addr();
        // SAFETY: head is a chunk in the list, which always has an initialized header.
        let chunk_len = unsafe { head.as_ref().len };

        let start = align_up(base + cursor, align)? - base;
        let end = start.checked_add(size)?;
        if end > chunk_len {
            return None;
        }

        // SAFETY: start < end <= chunk_len, so the pointer is within the chunk.
        Some((unsafe { head.cast::<u8>().add(start) }, end))
    }

    /// Obtains a new chunk from the child allocator, large enough for a buffer of `size` bytes at
    /// `align`, and makes it the current chunk.
    fn grow(&self, size: usize, align: usize) -> Result<NonNull<ChunkHeader>, OutOfMemory> {
        let prev = match self.state.get() {
            ArenaState::Empty => None,
            ArenaState::Active { head, .. } => Some(head),
        };
        // SAFETY: The previous head has an initialized header.
        let prev_len = prev.map_or(0, |head| unsafe { head.as_ref().len });

        // Chunk lengths stay multiples of the header alignment so that consecutive chunks from a
        // bump allocator pack without padding.
        let needed = HEADER_SIZE
            .checked_add(size)
            .and_then(|len| len.checked_add(align - 1))
            .and_then(|len| align_up(len, HEADER_ALIGN))
            .ok_or(OutOfMemory)?;
        let preferred = cmp::max(
            cmp::max(prev_len.saturating_mul(GROWTH_FACTOR), MIN_CHUNK_SIZE),
            needed,
        );

        // Fall back to the bare minimum if the child can't supply a generously sized chunk.
        let chunk = match self.child.allocate(preferred, HEADER_ALIGN) {
            Ok(chunk) => chunk,
            Err(_) if preferred > needed => self.child.allocate(needed, HEADER_ALIGN)?,
            Err(err) => return Err(err),
        };

        let issuer = chunk.issuer();
        let (ptr, len, _) = chunk.into_raw_parts();
        let head = ptr.cast::<ChunkHeader>();

        // SAFETY: The chunk is at least HEADER_SIZE bytes, aligned for a ChunkHeader and owned by
        // the arena from now on.
        unsafe { head.write(ChunkHeader { prev, len, issuer }) };
        self.state.set(ArenaState::Active { head, cursor: HEADER_SIZE });

        log::debug!("arena obtained a {len} byte chunk at {:#x}", head.as_ptr().addr());
        Ok(head)
    }

    fn release(&mut self) {
        let mut next = match self.state.replace(ArenaState::Empty) {
            ArenaState::Empty => None,
            ArenaState::Active { head, .. } => Some(head),
        };

        while let Some(head) = next {
            // SAFETY: Every chunk in the list has an initialized header, which is read before the
            // chunk is released.
            let ChunkHeader { prev, len, issuer } = unsafe { head.read() };

            // SAFETY: The chunk was decomposed from a buffer of len bytes aligned to HEADER_ALIGN,
            // issued by the child with this tag. No buffer carved from it can still be live.
            let chunk = unsafe {
                OwnedBuffer::from_raw_parts(head.cast(), len, HEADER_ALIGN).with_issuer(issuer)
            };
            if let Err(err) = self.child.deallocate(chunk) {
                log::warn!("failed to return arena chunk to its allocator: {err}");
            }

            next = prev;
        }
    }
}

impl<A: Allocator> Allocator for ArenaAllocator<A> {
    fn allocate(&self, size: usize, align: usize) -> Result<OwnedBuffer<'_>, OutOfMemory> {
        check_align(align);
        if size == 0 {
            return Ok(OwnedBuffer::empty(align));
        }

        if let ArenaState::Active { head, cursor } = self.state.get() {
            if let Some((ptr, cursor)) = Self::bump(head, cursor, size, align) {
                self.state.set(ArenaState::Active { head, cursor });
                // SAFETY: The buffer lies in the unused tail of the current chunk, which is
                // initialized memory from the child allocator.
                return Ok(unsafe { OwnedBuffer::from_raw_parts(ptr, size, align) });
            }
        }

        let head = self.grow(size, align)?;
        // A fresh chunk always has room for the request that caused it.
        let (ptr, cursor) = Self::bump(head, HEADER_SIZE, size, align).ok_or(OutOfMemory)?;
        self.state.set(ArenaState::Active { head, cursor });

        // SAFETY: As above.
        Ok(unsafe { OwnedBuffer::from_raw_parts(ptr, size, align) })
    }

    fn deallocate(&self, buffer: OwnedBuffer<'_>) -> Result<(), InvalidFree> {
        if buffer.is_empty() {
            return Ok(());
        }

        let range = buffer.addr_range();
        let owned = self.chunks().any(|head| {
            let start = head.as_ptr().addr();
            // SAFETY: Every chunk in the list has an initialized header.
            let end = start + unsafe { head.as_ref().len };
            range.start >= start + HEADER_SIZE && range.end <= end
        });

        if owned {
            Ok(())
        } else {
            Err(UnknownBufferError { addr: range.start }.into())
        }
    }
}

impl<A: Allocator> Drop for ArenaAllocator<A> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::{FixedBufferAllocator, GeneralPurposeAllocator};

    #[test]
    fn test_many_allocations() {
        let mut region = [0_u8; 1 << 16];
        let fixed = FixedBufferAllocator::new(&mut region);
        let arena = ArenaAllocator::new(&fixed);

        let mut buffers = Vec::new();
        for i in 0..500_usize {
            let mut buf = arena.allocate(i % 37 + 1, 1 << (i % 4)).unwrap();
            buf.fill(i as u8);
            buffers.push(buf);
        }

        for (i, buf) in buffers.iter().enumerate() {
            assert!(
                buf.iter().all(|b| *b == i as u8),
                "No buffer should be overwritten by a later allocation."
            );
            assert_eq!(buf.addr() % (1 << (i % 4)), 0);
        }

        assert!(arena.chunk_count() > 1, "The arena should have grown past its first chunk.");
    }

    #[test]
    fn test_chunk_growth() {
        let mut region = [0_u8; 1 << 14];
        let fixed = FixedBufferAllocator::new(&mut region);
        let arena = ArenaAllocator::new(&fixed);

        let _first = arena.allocate(200, 1).unwrap();
        let first_capacity = arena.capacity();
        let _second = arena.allocate(200, 1).unwrap();

        assert_eq!(arena.chunk_count(), 2);
        assert!(
            arena.capacity() >= first_capacity * 3,
            "Each new chunk should be at least twice the size of the last."
        );
    }

    #[test]
    fn test_child_exhaustion() {
        let mut region = [0_u8; 1024];
        let fixed = FixedBufferAllocator::new(&mut region);
        let arena = ArenaAllocator::new(&fixed);

        assert!(arena.allocate(900, 8).is_ok());
        assert_eq!(
            arena.allocate(900, 8).unwrap_err(),
            OutOfMemory,
            "The arena should only fail when its child can't supply a chunk."
        );
        assert!(arena.allocate(16, 8).is_ok(), "Small requests should still fit.");
    }

    #[test]
    fn test_release_to_child() {
        let mut region = [0_u8; 1 << 15];
        let gpa = GeneralPurposeAllocator::new(FixedBufferAllocator::new(&mut region));
        {
            let arena = ArenaAllocator::new(&gpa);
            for i in 0..40 {
                let buf = arena.allocate(i + 1, 8).unwrap();
                arena.deallocate(buf).unwrap();
                let _kept = arena.allocate(i + 1, 8).unwrap();
            }
            assert!(gpa.live_count() > 0, "The chunks should be live in the child.");
        }

        assert_eq!(gpa.live_count(), 0, "Dropping the arena should return every chunk.");
        assert!(gpa.deinit().is_ok(), "No chunk should be leaked by the arena.");
    }

    #[test]
    fn test_reset_and_into_child() {
        let mut region = [0_u8; 2048];
        let fixed = FixedBufferAllocator::new(&mut region);
        let mut arena = ArenaAllocator::new(&fixed);

        let _ = arena.allocate(100, 1).unwrap();
        assert_eq!(arena.chunk_count(), 1);
        arena.reset();
        assert_eq!(arena.chunk_count(), 0, "Reset should release every chunk.");
        assert!(fixed.end_index() < HEADER_ALIGN, "Only alignment padding should remain used.");

        let _ = arena.allocate(100, 1).unwrap();
        let child = arena.into_child();
        assert!(
            child.end_index() < HEADER_ALIGN,
            "into_child should release every chunk first."
        );
    }

    #[test]
    fn test_foreign_free() {
        let mut region = [0_u8; 1024];
        let fixed = FixedBufferAllocator::new(&mut region);
        let arena = ArenaAllocator::new(&fixed);

        let _ = arena.allocate(8, 1).unwrap();
        let foreign = fixed.allocate(8, 1).unwrap();
        assert!(arena.deallocate(foreign).unwrap_err().is_unknown_buffer());
    }
}
