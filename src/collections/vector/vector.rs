use std::cmp;
use std::fmt::{self, Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};
use std::slice;

use super::{CapacityOverflow, ReserveError};
use crate::alloc::{Allocator, OwnedBuffer};
use crate::util::error::IndexOutOfBounds;
use crate::util::result::ResultExtension;

const MIN_CAP: usize = 2;
const MAX_SIZE: usize = isize::MAX as usize;

const GROWTH_FACTOR: usize = 2;

/// A variable size contiguous collection, storing its elements in a single [`OwnedBuffer`] from
/// the allocator it was created with.
///
/// Every method which may need more memory comes in two flavors: `try_*` returns a
/// [`ReserveError`] if the allocator can't supply it, while the plain method panics with the
/// error's message.
///
/// # Time Complexity
/// For this analysis of time complexity, variables are defined as follows:
/// - `n`: The number of items in the Vector.
/// - `i`: The index of the item in question.
/// - `m`: The number of items being added.
///
/// | Method | Complexity |
/// |-|-|
/// | `len` | `O(1)` |
/// | `push` | `O(1)`*, `O(n)` |
/// | `pop` | `O(1)` |
/// | `insert` | `O(n-i)` |
/// | `remove` | `O(n-i)` |
/// | `reserve` | `O(n)`**, `O(1)` |
/// | `truncate` | `O(n)` |
/// | `extend_from_slice` | `O(n+m)` |
///
/// \* If the Vector doesn't have enough capacity for the new element, `push` will take `O(n)`.
///
/// \** If the Vector has enough capacity for the additional items already, `reserve` is `O(1)`.
///
/// # Examples
/// ```
/// # use standard_sampler::alloc::FixedBufferAllocator;
/// # use standard_sampler::collections::Vector;
/// let mut region = [0_u8; 256];
/// let fixed = FixedBufferAllocator::new(&mut region);
///
/// let mut vec = Vector::new_in(&fixed);
/// for i in 0..10_u32 {
///     vec.push(i * i);
/// }
/// assert_eq!(&vec[..4], &[0, 1, 4, 9]);
/// assert_eq!(vec.cap(), 16);
/// ```
pub struct Vector<'a, T, A: Allocator + ?Sized> {
    buf: OwnedBuffer<'a>,
    cap: usize,
    len: usize,
    alloc: &'a A,
    _phantom: PhantomData<T>,
}

impl<'a, T, A: Allocator + ?Sized> Vector<'a, T, A> {
    /// Creates a new Vector with length and capacity 0. Memory will be requested from `alloc` when
    /// the capacity changes.
    pub const fn new_in(alloc: &'a A) -> Vector<'a, T, A> {
        Vector {
            buf: OwnedBuffer::empty(align_of::<T>()),
            // Zero sized types never need memory, so their capacity is unlimited from the start.
            cap: if size_of::<T>() == 0 { usize::MAX } else { 0 },
            len: 0,
            alloc,
            _phantom: PhantomData,
        }
    }

    /// Creates a new Vector with capacity exactly equal to the provided value, allowing values to
    /// be added without reallocation.
    pub fn try_with_cap_in(cap: usize, alloc: &'a A) -> Result<Vector<'a, T, A>, ReserveError> {
        let mut vec = Vector::new_in(alloc);
        if cap > vec.cap {
            vec.try_realloc_with_cap(cap)?;
        }
        Ok(vec)
    }

    /// Creates a new Vector with capacity exactly equal to the provided value.
    ///
    /// # Panics
    /// Panics if the memory layout size exceeds [`isize::MAX`] or the allocator is out of memory.
    pub fn with_cap_in(cap: usize, alloc: &'a A) -> Vector<'a, T, A> {
        Vector::try_with_cap_in(cap, alloc).throw()
    }

    /// Returns the length of the Vector.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the Vector contains no elements.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the current capacity of the Vector. The capacity is exactly the value provided to
    /// the last capacity manipulation, or [`usize::MAX`] for zero sized types.
    pub const fn cap(&self) -> usize {
        self.cap
    }

    /// Returns the allocator that the Vector obtains its memory from.
    pub const fn allocator(&self) -> &'a A {
        self.alloc
    }

    /// Push the provided value onto the end of the Vector, increasing the capacity if required.
    /// If the capacity can't be increased, `value` is dropped and the Vector is left unchanged.
    pub fn try_push(&mut self, value: T) -> Result<(), ReserveError> {
        if self.len == self.cap {
            self.try_grow()?;
        }

        // SAFETY: The capacity has just been adjusted to support the addition of the new item.
        unsafe { self.ptr().add(self.len).write(value) };
        self.len += 1;
        Ok(())
    }

    /// Push the provided value onto the end of the Vector, increasing the capacity if required.
    ///
    /// # Panics
    /// Panics if the capacity can't be increased.
    pub fn push(&mut self, value: T) {
        self.try_push(value).throw()
    }

    /// Pops the last value off the end of the Vector, returning an owned value if the Vector has
    /// length greater than 0.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }

        // Decrement len before reading, so the value is no longer considered initialized.
        self.len -= 1;
        // SAFETY: The old len was within the capacity, and every value below it is initialized.
        Some(unsafe { self.ptr().add(self.len).read() })
    }

    /// Inserts the provided value at the given index, growing and moving items as necessary. An
    /// index equal to the length appends the value.
    ///
    /// # Panics
    /// Panics if `index > len`.
    pub fn try_insert(&mut self, index: usize, value: T) -> Result<(), ReserveError> {
        if index > self.len {
            Err(IndexOutOfBounds {
                index,
                len: self.len,
            })
            .throw()
        }

        if self.len == self.cap {
            self.try_grow()?;
        }

        // SAFETY: There is capacity for len + 1 elements, so shifting the elements from index
        // onwards up by one stays inside the buffer. The slot at index is then overwritten without
        // dropping, since its old value has been moved.
        unsafe {
            let slot = self.ptr().add(index);
            ptr::copy(slot.as_ptr(), slot.add(1).as_ptr(), self.len - index);
            slot.write(value);
        }
        self.len += 1;
        Ok(())
    }

    /// Inserts the provided value at the given index, growing and moving items as necessary.
    ///
    /// # Panics
    /// Panics if `index > len` or the capacity can't be increased.
    pub fn insert(&mut self, index: usize, value: T) {
        self.try_insert(index, value).throw()
    }

    /// Removes the element at the provided index, moving all following values to fill in the gap.
    ///
    /// # Panics
    /// Panics if the provided index is out of bounds.
    pub fn remove(&mut self, index: usize) -> T {
        self.check_index(index);

        // SAFETY: index < len, so the value is initialized. It is moved out before the following
        // elements are shifted down over its slot.
        unsafe {
            let slot = self.ptr().add(index);
            let value = slot.read();
            ptr::copy(slot.add(1).as_ptr(), slot.as_ptr(), self.len - index - 1);
            self.len -= 1;
            value
        }
    }

    /// Ensures that the Vector has capacity to hold an additional `extra` elements. After a
    /// successful call, the capacity will be >= len + extra.
    pub fn try_reserve(&mut self, extra: usize) -> Result<(), ReserveError> {
        let new_cap = self.len.checked_add(extra).ok_or(CapacityOverflow)?;

        if new_cap <= self.cap {
            return Ok(());
        }

        self.try_realloc_with_cap(new_cap)
    }

    /// Ensures that the Vector has capacity to hold an additional `extra` elements.
    ///
    /// # Panics
    /// Panics if the capacity can't be increased.
    pub fn reserve(&mut self, extra: usize) {
        self.try_reserve(extra).throw()
    }

    /// Drops every element, keeping the capacity.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Drops every element from `len` onwards. Does nothing if the Vector is already shorter.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }

        // SAFETY: len < self.len, so the offset stays inside the buffer.
        let start = unsafe { self.ptr().add(len) };
        let tail = ptr::slice_from_raw_parts_mut(start.as_ptr(), self.len - len);
        // Shorten first, so a panicking destructor can't cause a double drop.
        self.len = len;
        // SAFETY: The tail was initialized and is no longer considered part of the Vector.
        unsafe { ptr::drop_in_place(tail) };
    }

    /// Appends a clone of every element of `other`, reserving space for all of them first. When
    /// the Vector has to grow, it grows by at least the growth factor, so repeated appends stay
    /// amortized.
    pub fn try_extend_from_slice(&mut self, other: &[T]) -> Result<(), ReserveError>
    where
        T: Clone,
    {
        let needed = self.len.checked_add(other.len()).ok_or(CapacityOverflow)?;
        if needed > self.cap {
            let new_cap = cmp::max(self.cap.saturating_mul(GROWTH_FACTOR), needed);
            self.try_realloc_with_cap(new_cap)?;
        }

        for value in other {
            // SAFETY: Capacity for every element of other has been reserved.
            unsafe { self.ptr().add(self.len).write(value.clone()) };
            self.len += 1;
        }
        Ok(())
    }

    /// Appends a clone of every element of `other`.
    ///
    /// # Panics
    /// Panics if the capacity can't be increased.
    pub fn extend_from_slice(&mut self, other: &[T])
    where
        T: Clone,
    {
        self.try_extend_from_slice(other).throw()
    }

    fn ptr(&self) -> NonNull<T> {
        self.buf.as_non_null().cast()
    }

    /// Grows the buffer to allow for the insertion of at least one more element.
    fn try_grow(&mut self) -> Result<(), ReserveError> {
        let new_cap = cmp::max(
            self.cap.checked_mul(GROWTH_FACTOR).ok_or(CapacityOverflow)?,
            MIN_CAP,
        );
        self.try_realloc_with_cap(new_cap)
    }

    /// Reallocates the buffer with the provided capacity, which must not be below the length.
    fn try_realloc_with_cap(&mut self, new_cap: usize) -> Result<(), ReserveError> {
        if size_of::<T>() == 0 {
            return Ok(());
        }

        let size = new_cap
            .checked_mul(size_of::<T>())
            .filter(|size| *size <= MAX_SIZE)
            .ok_or(CapacityOverflow)?;

        self.alloc.reallocate(&mut self.buf, size)?;
        self.cap = new_cap;
        Ok(())
    }

    /// Checks that the provided index is within the bounds of self.
    ///
    /// # Panics
    /// Panics if the provided index is out of bounds.
    fn check_index(&self, index: usize) {
        if index >= self.len {
            Err(IndexOutOfBounds {
                index,
                len: self.len,
            })
            .throw()
        }
    }
}

impl<T, A: Allocator + ?Sized> Drop for Vector<'_, T, A> {
    fn drop(&mut self) {
        self.clear();

        let buf = mem::replace(&mut self.buf, OwnedBuffer::empty(align_of::<T>()));
        if let Err(err) = self.alloc.deallocate(buf) {
            log::error!("vector buffer rejected by its allocator: {err}");
        }
    }
}

impl<T, A: Allocator + ?Sized> Deref for Vector<'_, T, A> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        // SAFETY: Vector is valid as a slice for len values, which are all initialized. The pointer
        // is nonnull and aligned to T, including when the buffer is empty.
        unsafe { slice::from_raw_parts(self.ptr().as_ptr(), self.len) }
    }
}

impl<T, A: Allocator + ?Sized> DerefMut for Vector<'_, T, A> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: As above, with the mutable borrow of self preventing any other access.
        unsafe { slice::from_raw_parts_mut(self.ptr().as_ptr(), self.len) }
    }
}

impl<T, A: Allocator + ?Sized> AsRef<[T]> for Vector<'_, T, A> {
    fn as_ref(&self) -> &[T] {
        self
    }
}

impl<T, A: Allocator + ?Sized> AsMut<[T]> for Vector<'_, T, A> {
    fn as_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T, A: Allocator + ?Sized> Extend<T> for Vector<'_, T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);

        for item in iter {
            self.push(item);
        }
    }
}

impl<'a, T: Clone, A: Allocator + ?Sized> Clone for Vector<'a, T, A> {
    fn clone(&self) -> Self {
        let mut vec = Vector::with_cap_in(self.len, self.alloc);
        vec.extend_from_slice(self);
        vec
    }
}

impl<T: PartialEq, A: Allocator + ?Sized, B: Allocator + ?Sized> PartialEq<Vector<'_, T, B>>
    for Vector<'_, T, A>
{
    fn eq(&self, other: &Vector<'_, T, B>) -> bool {
        **self == **other
    }
}

impl<T: Eq, A: Allocator + ?Sized> Eq for Vector<'_, T, A> {}

impl<T: Hash, A: Allocator + ?Sized> Hash for Vector<'_, T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (**self).hash(state);
    }
}

impl<T: Debug, A: Allocator + ?Sized> Debug for Vector<'_, T, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vector")
            .field("contents", &&**self)
            .field("len", &self.len)
            .field("cap", &self.cap)
            .finish()
    }
}
