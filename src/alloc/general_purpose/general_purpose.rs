use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::mem::{self, ManuallyDrop};
use std::ptr::{self, NonNull};

use super::{GpaOptions, Leak, LeakDetected};
use crate::alloc::align::check_align;
use crate::alloc::{
    Allocator, DoubleFreeError, InvalidFree, LayoutMismatchError, OutOfMemory, OwnedBuffer,
    UnknownBufferError,
};

/// The byte written over freed memory when [`GpaOptions::poison_freed`] is enabled.
pub const POISON: u8 = 0xAA;

/// How many of the most recently freed addresses are remembered when
/// [`GpaOptions::track_freed`] is enabled.
pub const FREED_HISTORY: usize = 256;

#[derive(Debug, Clone, Copy)]
struct Allocation {
    ptr: NonNull<u8>,
    size: usize,
    align: usize,
    issuer: usize,
}

/// An allocator which wraps a backing allocator with bookkeeping that catches misuse.
///
/// Every live allocation is recorded in a registry keyed by its address. Deallocation checks the
/// registry, so freeing a buffer twice (only possible through
/// [`OwnedBuffer::from_raw_parts`]), freeing a buffer from another allocator or freeing with the
/// wrong size are all reported as an [`InvalidFree`] instead of corrupting the backing allocator.
/// When the allocator is torn down, any allocation still in the registry is reported as a leak.
///
/// The checks cost a map lookup per call, which makes this a tool for development and testing
/// rather than for hot paths.
///
/// # Examples
/// ```
/// # use standard_sampler::alloc::{Allocator, FixedBufferAllocator, GeneralPurposeAllocator};
/// let mut region = [0_u8; 256];
/// let gpa = GeneralPurposeAllocator::new(FixedBufferAllocator::new(&mut region));
///
/// let kept = gpa.allocate(16, 8).unwrap();
/// let freed = gpa.allocate(32, 8).unwrap();
/// gpa.deallocate(freed).unwrap();
/// drop(kept);
///
/// let report = gpa.deinit().unwrap_err();
/// assert_eq!(report.leaks.len(), 1);
/// assert_eq!(report.leaks[0].size, 16);
/// ```
pub struct GeneralPurposeAllocator<A: Allocator> {
    backing: A,
    options: GpaOptions,
    live: RefCell<BTreeMap<usize, Allocation>>,
    freed: RefCell<VecDeque<usize>>,
}

impl<A: Allocator> GeneralPurposeAllocator<A> {
    /// Creates a new allocator over `backing` with every check enabled.
    pub const fn new(backing: A) -> GeneralPurposeAllocator<A> {
        Self::with_options(backing, GpaOptions::new())
    }

    pub const fn with_options(backing: A, options: GpaOptions) -> GeneralPurposeAllocator<A> {
        GeneralPurposeAllocator {
            backing,
            options,
            live: RefCell::new(BTreeMap::new()),
            freed: RefCell::new(VecDeque::new()),
        }
    }

    pub const fn options(&self) -> &GpaOptions {
        &self.options
    }

    pub const fn backing(&self) -> &A {
        &self.backing
    }

    /// Returns the number of allocations which haven't been freed yet.
    pub fn live_count(&self) -> usize {
        self.live.borrow().len()
    }

    /// Returns the total size of all allocations which haven't been freed yet.
    pub fn live_bytes(&self) -> usize {
        self.live.borrow().values().map(|allocation| allocation.size).sum()
    }

    /// Returns true if `addr` is the start of a live allocation.
    pub fn is_live(&self, addr: usize) -> bool {
        self.live.borrow().contains_key(&addr)
    }

    /// Reports every allocation which is still registered, without releasing anything. Taking
    /// `&mut self` guarantees that no buffer from this allocator is still held, so everything in
    /// the registry has been leaked.
    pub fn check_leaks(&mut self) -> Result<(), LeakDetected> {
        let leaks: Vec<Leak> = self
            .live
            .get_mut()
            .iter()
            .map(|(addr, allocation)| Leak {
                addr: *addr,
                size: allocation.size,
                align: allocation.align,
            })
            .collect();

        if leaks.is_empty() {
            Ok(())
        } else {
            Err(LeakDetected { leaks })
        }
    }

    /// Tears down the allocator, reporting any leaked allocations. The memory of leaked
    /// allocations is returned to the backing allocator either way.
    pub fn deinit(mut self) -> Result<(), LeakDetected> {
        let leaks = self.take_leaks();

        if leaks.is_empty() {
            Ok(())
        } else {
            Err(LeakDetected { leaks })
        }
    }

    /// Tears down the allocator and returns the backing allocator. Leaks are logged and released
    /// as by [`deinit`](GeneralPurposeAllocator::deinit), but not returned.
    pub fn into_backing(mut self) -> A {
        self.take_leaks();
        let this = ManuallyDrop::new(self);

        // SAFETY: this is wrapped in ManuallyDrop and never used again, so every field is moved
        // out exactly once. The registry is empty, so skipping Drop releases nothing early.
        unsafe {
            drop(ptr::read(&this.live));
            drop(ptr::read(&this.freed));
            ptr::read(&this.backing)
        }
    }

    /// Removes every allocation from the registry, logging each as a leak and returning its memory
    /// to the backing allocator.
    fn take_leaks(&mut self) -> Vec<Leak> {
        let live = mem::take(self.live.get_mut());
        let mut leaks = Vec::with_capacity(live.len());

        for (addr, Allocation { ptr, size, align, issuer }) in live {
            let leak = Leak { addr, size, align };
            log::error!("memory leak detected: {leak}");
            leaks.push(leak);

            // SAFETY: The allocation was issued by the backing allocator with exactly these parts
            // and tag. Exclusive access to self means no buffer referring to it can still be live.
            let buffer =
                unsafe { OwnedBuffer::from_raw_parts(ptr, size, align).with_issuer(issuer) };
            if let Err(err) = self.backing.deallocate(buffer) {
                log::warn!("failed to release leaked allocation: {err}");
            }
        }

        leaks
    }

    fn reject(&self, err: InvalidFree) -> Result<(), InvalidFree> {
        log::error!("invalid free: {err}");
        Err(err)
    }
}

impl<A: Allocator> Allocator for GeneralPurposeAllocator<A> {
    fn allocate(&self, size: usize, align: usize) -> Result<OwnedBuffer<'_>, OutOfMemory> {
        check_align(align);
        if size == 0 {
            return Ok(OwnedBuffer::empty(align));
        }

        let buffer = self.backing.allocate(size, align)?;
        let issuer = buffer.issuer();
        let (ptr, size, align) = buffer.into_raw_parts();
        let addr = ptr.as_ptr().addr();

        self.live.borrow_mut().insert(addr, Allocation { ptr, size, align, issuer });
        if self.options.track_freed {
            self.freed.borrow_mut().retain(|freed| *freed != addr);
        }

        log::trace!("allocated {size} bytes at {addr:#x}");

        // SAFETY: These are the unmodified parts of a buffer issued by the backing allocator,
        // which lives as long as self. The buffer is handed out untagged, so it can only be
        // released through self.
        Ok(unsafe { OwnedBuffer::from_raw_parts(ptr, size, align) })
    }

    fn deallocate(&self, mut buffer: OwnedBuffer<'_>) -> Result<(), InvalidFree> {
        if buffer.is_empty() {
            return Ok(());
        }

        let addr = buffer.addr();
        let Some(allocation) = self.live.borrow().get(&addr).copied() else {
            if self.options.track_freed && self.freed.borrow().contains(&addr) {
                return self.reject(DoubleFreeError { addr }.into());
            }
            return self.reject(UnknownBufferError { addr }.into());
        };

        if allocation.size != buffer.len() || allocation.align != buffer.align() {
            return self.reject(
                LayoutMismatchError {
                    addr,
                    size: buffer.len(),
                    align: buffer.align(),
                    expected_size: allocation.size,
                    expected_align: allocation.align,
                }
                .into(),
            );
        }

        self.live.borrow_mut().remove(&addr);
        if self.options.track_freed {
            let mut freed = self.freed.borrow_mut();
            if freed.len() == FREED_HISTORY {
                freed.pop_front();
            }
            freed.push_back(addr);
        }
        if self.options.poison_freed {
            buffer.fill(POISON);
        }

        log::trace!("freed {} bytes at {addr:#x}", allocation.size);
        // SAFETY: The registry entry shows that the backing allocator issued this buffer.
        self.backing.deallocate(unsafe { buffer.with_issuer(allocation.issuer) })
    }
}

impl<A: Allocator> Drop for GeneralPurposeAllocator<A> {
    fn drop(&mut self) {
        self.take_leaks();
    }
}
