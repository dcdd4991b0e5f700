use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut, Range};
use std::ptr::{self, NonNull};
use std::slice;

/// A contiguous region of bytes handed out by an [`Allocator`](super::Allocator).
///
/// The buffer is owned exclusively by whoever received it until it is passed back through
/// [`Allocator::deallocate`](super::Allocator::deallocate). The lifetime `'a` is the borrow of the
/// issuing allocator, so a buffer can't outlive the allocator which would release its memory.
///
/// An OwnedBuffer has no destructor: dropping one without deallocating it leaks the memory, which
/// is exactly what a [`GeneralPurposeAllocator`](super::GeneralPurposeAllocator) reports.
#[must_use = "dropping an OwnedBuffer without deallocating it leaks its memory"]
pub struct OwnedBuffer<'a> {
    ptr: NonNull<u8>,
    len: usize,
    align: usize,
    issuer: usize,
    _allocator: PhantomData<&'a ()>,
}

/// The issuer tag of buffers which no allocator has claimed. Allocators which can recognize their
/// own memory by address leave their buffers untagged.
pub(crate) const UNTAGGED: usize = 0;

impl<'a> OwnedBuffer<'a> {
    /// Creates an empty buffer with a dangling pointer which is nonetheless aligned to `align`.
    /// Empty buffers never touch an allocator's memory and deallocating one is a no-op.
    ///
    /// # Examples
    /// ```
    /// # use standard_sampler::alloc::OwnedBuffer;
    /// let buf = OwnedBuffer::empty(64);
    /// assert!(buf.is_empty());
    /// assert_eq!(buf.addr() % 64, 0);
    /// ```
    pub const fn empty(align: usize) -> OwnedBuffer<'a> {
        OwnedBuffer {
            // SAFETY: Alignments are powers of two and therefore non-zero.
            ptr: unsafe { NonNull::new_unchecked(ptr::without_provenance_mut(align)) },
            len: 0,
            align,
            issuer: UNTAGGED,
            _allocator: PhantomData,
        }
    }

    /// Returns the declared size of the buffer in bytes.
    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the alignment that the buffer was requested with.
    pub const fn align(&self) -> usize {
        self.align
    }

    pub const fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr().cast_const()
    }

    pub const fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    pub const fn as_non_null(&self) -> NonNull<u8> {
        self.ptr
    }

    /// Returns the address of the first byte, which is the buffer's identity within its allocator.
    pub fn addr(&self) -> usize {
        self.ptr.as_ptr().addr()
    }

    /// Returns the range of addresses covered by the buffer.
    pub fn addr_range(&self) -> Range<usize> {
        self.addr()..(self.addr() + self.len)
    }

    /// Decomposes the buffer into its pointer, length and alignment without releasing it.
    ///
    /// The caller becomes responsible for the memory, which can be turned back into a buffer with
    /// [`OwnedBuffer::from_raw_parts`]. Allocators which can't recognize their memory by address,
    /// such as the page allocator, reject reassembled buffers.
    pub const fn into_raw_parts(self) -> (NonNull<u8>, usize, usize) {
        (self.ptr, self.len, self.align)
    }

    /// Reassembles a buffer from the parts returned by [`OwnedBuffer::into_raw_parts`], or from
    /// memory that an allocator implementation is about to hand out.
    ///
    /// # Safety
    /// For the produced value to be valid:
    /// - `ptr` must be valid for reads and writes of `len` bytes, which must all be initialized
    ///   (their values are unspecified).
    /// - `ptr` must be aligned to `align`, which must be a power of two.
    /// - No other live buffer may overlap the region, and the region must stay valid for `'a`.
    pub const unsafe fn from_raw_parts(ptr: NonNull<u8>, len: usize, align: usize) -> OwnedBuffer<'a> {
        OwnedBuffer {
            ptr,
            len,
            align,
            issuer: UNTAGGED,
            _allocator: PhantomData,
        }
    }

    /// Returns the tag of the allocator instance which issued the buffer, or [`UNTAGGED`].
    ///
    /// Raw parts don't carry the tag, so an allocator which decomposes a buffer from its child
    /// must keep the tag itself and restore it with [`OwnedBuffer::with_issuer`] before handing
    /// the buffer back.
    pub(crate) const fn issuer(&self) -> usize {
        self.issuer
    }

    /// Tags the buffer as issued by the allocator instance identified by `issuer`.
    ///
    /// # Safety
    /// The buffer must actually have been issued by that allocator instance, which will release
    /// its memory on deallocation.
    pub(crate) unsafe fn with_issuer(mut self, issuer: usize) -> OwnedBuffer<'a> {
        self.issuer = issuer;
        self
    }

    /// Changes the declared length of the buffer in place.
    ///
    /// # Safety
    /// The memory from the start of the buffer up to `len` bytes must be owned by this buffer and
    /// initialized, as for [`OwnedBuffer::from_raw_parts`].
    pub(crate) const unsafe fn set_len(&mut self, len: usize) {
        self.len = len;
    }
}

impl Deref for OwnedBuffer<'_> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        // SAFETY: The constructor requires ptr to be valid for len initialized bytes, and this
        // buffer has exclusive access to them. Empty buffers produce an empty slice from an aligned
        // dangling pointer.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl DerefMut for OwnedBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: As above, with the mutable borrow of self preventing any other access.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl Debug for OwnedBuffer<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedBuffer")
            .field("addr", &format_args!("{:#x}", self.addr()))
            .field("len", &self.len)
            .field("align", &self.align)
            .finish()
    }
}
