use std::ptr::{self, NonNull};
use std::sync::atomic::{AtomicUsize, Ordering};

use libc::{MAP_ANONYMOUS, MAP_FAILED, MAP_PRIVATE, PROT_READ, PROT_WRITE, c_void};

use crate::alloc::align::check_align;
use crate::alloc::buffer::UNTAGGED;
use crate::alloc::{Allocator, InvalidFree, OutOfMemory, OwnedBuffer, UnknownBufferError, align_up};

const FALLBACK_PAGE_SIZE: usize = 4096;

// Starts above UNTAGGED so that no allocator shares its tag with unclaimed buffers.
static NEXT_ID: AtomicUsize = AtomicUsize::new(UNTAGGED + 1);

/// An allocator which maps fresh pages from the OS for every request and unmaps them as soon as
/// they are deallocated.
///
/// Requests are rounded up to the page size, so small allocations waste most of their mapping and
/// every call is a syscall. The only bookkeeping is an identity stamped on every buffer, so that a
/// buffer from another allocator (or another `PageAllocator`) is rejected instead of unmapped.
///
/// # Examples
/// ```
/// # use standard_sampler::alloc::{Allocator, PageAllocator};
/// let pages = PageAllocator::new();
/// let mut buf = pages.allocate(100, 8).unwrap();
/// assert_eq!(buf.len(), 100);
/// buf.fill(7);
/// pages.deallocate(buf).unwrap();
/// ```
#[derive(Debug)]
pub struct PageAllocator {
    id: usize,
}

impl PageAllocator {
    pub fn new() -> PageAllocator {
        PageAllocator {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Returns the granularity of the OS's page mappings.
    pub fn page_size() -> usize {
        // SAFETY: sysconf has no memory safety requirements.
        match unsafe { libc::sysconf(libc::_SC_PAGESIZE) } {
            size if size > 0 => size as usize,
            _ => FALLBACK_PAGE_SIZE,
        }
    }
}

impl Default for PageAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl Allocator for PageAllocator {
    fn allocate(&self, size: usize, align: usize) -> Result<OwnedBuffer<'_>, OutOfMemory> {
        check_align(align);
        if size == 0 {
            return Ok(OwnedBuffer::empty(align));
        }

        let page_size = Self::page_size();
        let mapped_len = align_up(size, page_size).ok_or(OutOfMemory)?;

        let ptr = if align <= page_size {
            map(mapped_len)?
        } else {
            // Map enough extra that an aligned start must exist, then give back the slack on
            // either side. Both ends stay page aligned because align is a multiple of page_size.
            let over_len = mapped_len.checked_add(align - page_size).ok_or(OutOfMemory)?;
            let base = map(over_len)?;
            let base_addr = base.as_ptr().addr();
            let prefix = align_up(base_addr, align).ok_or(OutOfMemory)? - base_addr;
            let suffix = over_len - prefix - mapped_len;

            // SAFETY: prefix + mapped_len + suffix == over_len, so every range is inside the
            // mapping that was just created and nothing else refers to the trimmed pages.
            unsafe {
                if prefix > 0 {
                    unmap(base.as_ptr(), prefix);
                }
                if suffix > 0 {
                    unmap(base.as_ptr().add(prefix + mapped_len), suffix);
                }
                base.add(prefix)
            }
        };

        log::trace!("mapped {mapped_len} bytes at {:#x}", ptr.as_ptr().addr());

        // SAFETY: The mapping is readable, writable and zero-filled for at least size bytes, and
        // is aligned either by page alignment or by the trimming above. It was mapped by self.
        Ok(unsafe { OwnedBuffer::from_raw_parts(ptr, size, align).with_issuer(self.id) })
    }

    fn deallocate(&self, buffer: OwnedBuffer<'_>) -> Result<(), InvalidFree> {
        if buffer.is_empty() {
            return Ok(());
        }

        // An address alone can't tell a mapping of ours from memory another allocator carved out
        // of one, so only buffers stamped by this instance are unmapped.
        let addr = buffer.addr();
        if buffer.issuer() != self.id {
            return Err(UnknownBufferError { addr }.into());
        }

        let page_size = Self::page_size();

        let (ptr, len, _) = buffer.into_raw_parts();
        // The rounding succeeded when the buffer was allocated, so it can't fail now.
        let mapped_len = align_up(len, page_size).unwrap_or(len);

        // SAFETY: The issuer tag shows the buffer came from allocate on self, which mapped exactly
        // mapped_len bytes here. Consuming the buffer guarantees that nothing else refers to them.
        unsafe { unmap(ptr.as_ptr(), mapped_len) };
        log::trace!("unmapped {mapped_len} bytes at {addr:#x}");

        Ok(())
    }
}

fn map(len: usize) -> Result<NonNull<u8>, OutOfMemory> {
    // SAFETY: An anonymous private mapping with no address hint doesn't alias any existing memory.
    let raw = unsafe {
        libc::mmap(
            ptr::null_mut(),
            len,
            PROT_READ | PROT_WRITE,
            MAP_PRIVATE | MAP_ANONYMOUS,
            -1,
            0,
        )
    };

    if raw == MAP_FAILED {
        return Err(OutOfMemory);
    }

    NonNull::new(raw.cast()).ok_or(OutOfMemory)
}

/// # Safety
/// The range must lie within a mapping created by [`map`] and must no longer be referenced.
unsafe fn unmap(ptr: *mut u8, len: usize) {
    // SAFETY: Upheld by the caller. munmap only fails for invalid arguments, which the caller's
    // guarantees rule out.
    unsafe {
        libc::munmap(ptr.cast::<c_void>(), len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::ArenaAllocator;
    use crate::util::panic::assert_panics;

    #[test]
    fn test_page_rounding() {
        let pages = PageAllocator::new();
        let page_size = PageAllocator::page_size();

        let mut buf = pages.allocate(1, 1).unwrap();
        assert_eq!(buf.len(), 1, "The declared size should be the requested size.");
        assert_eq!(buf.addr() % page_size, 0, "Every mapping should start on a page.");
        assert_eq!(&*buf, &[0], "Fresh pages should be zero-filled.");
        buf[0] = 0xFF;
        pages.deallocate(buf).unwrap();

        let mut big = pages.allocate(page_size * 3 + 17, 16).unwrap();
        big.fill(0x5A);
        assert!(big.iter().all(|b| *b == 0x5A));
        pages.deallocate(big).unwrap();
    }

    #[test]
    fn test_over_aligned() {
        let pages = PageAllocator::new();
        let align = PageAllocator::page_size() * 4;

        let mut buf = pages.allocate(10, align).unwrap();
        assert_eq!(buf.addr() % align, 0, "Alignment above a page should still be honored.");
        buf.fill(1);
        pages.deallocate(buf).unwrap();
    }

    #[test]
    fn test_foreign_buffer() {
        let pages = PageAllocator::new();
        let mut region = [0_u8; 16];
        let ptr = NonNull::from(&mut region[..]).cast::<u8>();

        // SAFETY: The region outlives the buffer and nothing else touches it meanwhile.
        let foreign = unsafe { OwnedBuffer::from_raw_parts(ptr, 4, 1) };
        assert!(
            pages.deallocate(foreign).unwrap_err().is_unknown_buffer(),
            "Memory which was never mapped by the allocator should be rejected."
        );
    }

    #[test]
    fn test_buffer_from_another_instance() {
        let first = PageAllocator::new();
        let second = PageAllocator::new();

        let buf = first.allocate(64, 8).unwrap();
        let addr = buf.addr();
        assert_eq!(addr % PageAllocator::page_size(), 0);

        let (ptr, len, align) = buf.into_raw_parts();
        // SAFETY: The parts were just taken from a live buffer, which is reassembled only once.
        let reassembled = unsafe { OwnedBuffer::from_raw_parts(ptr, len, align) };
        assert!(
            second.deallocate(reassembled).unwrap_err().is_unknown_buffer(),
            "A page aligned address alone shouldn't be enough to unmap it."
        );

        // SAFETY: The previous buffer was rejected, so its memory is still mapped and unreferenced.
        let mut buf = unsafe { OwnedBuffer::from_raw_parts(ptr, len, align).with_issuer(first.id) };
        buf.fill(3);
        first.deallocate(buf).unwrap();
    }

    #[test]
    fn test_arena_buffer_is_not_unmapped() {
        let arena = ArenaAllocator::new(PageAllocator::new());
        let page_size = PageAllocator::page_size();

        let carved = arena.allocate(1, page_size).unwrap();
        let mut neighbour = arena.allocate(8, 1).unwrap();
        assert_eq!(carved.addr() % page_size, 0, "The carved buffer should look like a mapping.");

        assert!(
            PageAllocator::new().deallocate(carved).unwrap_err().is_unknown_buffer(),
            "Memory carved out of a mapping by another allocator should be rejected."
        );
        let other = arena.allocate(8, 1).unwrap();
        assert!(
            arena.child().deallocate(other).unwrap_err().is_unknown_buffer(),
            "Even the PageAllocator behind the arena shouldn't unmap what the arena handed out."
        );

        neighbour.fill(0x42);
        assert!(neighbour.iter().all(|b| *b == 0x42), "The neighbour should stay mapped.");
    }

    #[test]
    fn test_invalid_align() {
        assert_panics!({
            let _ = PageAllocator::new().allocate(8, 3);
        });
    }
}
