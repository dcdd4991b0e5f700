use derive_more::{Display, Error, From, IsVariant};

use crate::util::panic::Panic;

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[display("out of memory")]
pub struct OutOfMemory;

#[derive(Debug, Display, Error)]
#[display("alignment {_0} is not a power of two")]
pub struct InvalidAlignmentPanic(#[error(not(source))] pub usize);
impl Panic for InvalidAlignmentPanic {}

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[display("buffer at {addr:#x} was not issued by this allocator")]
pub struct UnknownBufferError {
    pub addr: usize,
}

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[display("buffer at {addr:#x} has already been freed")]
pub struct DoubleFreeError {
    pub addr: usize,
}

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[display(
    "buffer at {addr:#x} freed as {size} bytes (align {align}) but allocated as {expected_size} \
    bytes (align {expected_align})"
)]
pub struct LayoutMismatchError {
    pub addr: usize,
    pub size: usize,
    pub align: usize,
    pub expected_size: usize,
    pub expected_align: usize,
}

/// A buffer was returned to an allocator which can't accept it. This always indicates a bug in the
/// caller.
#[derive(Debug, Display, Error, From, IsVariant, Clone, Copy, PartialEq, Eq)]
pub enum InvalidFree {
    UnknownBuffer(UnknownBufferError),
    DoubleFree(DoubleFreeError),
    LayoutMismatch(LayoutMismatchError),
}

impl Panic for InvalidFree {}
