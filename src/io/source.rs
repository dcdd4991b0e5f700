use std::cmp;

use crate::alloc::Allocator;
use crate::collections::Vector;
use crate::io::{PipeError, Sink, SourceError};

const PIPE_CHUNK: usize = 512;

/// An origin of bytes, the counterpart of a [`Sink`].
pub trait Source {
    /// Reads up to `buf.len()` bytes into `buf`, returning how many were read. Zero means the end
    /// of the input has been reached (or `buf` is empty).
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError>;

    /// Copies everything remaining into `sink`, returning the number of bytes copied.
    ///
    /// Whatever was copied before a failure stays in the sink.
    fn pipe<S: Sink + ?Sized>(&mut self, sink: &mut S) -> Result<usize, PipeError>
    where
        Self: Sized,
    {
        let mut chunk = [0_u8; PIPE_CHUNK];
        let mut total = 0;

        loop {
            match self.read(&mut chunk)? {
                0 => return Ok(total),
                count => {
                    sink.write_all(&chunk[..count])?;
                    total += count;
                },
            }
        }
    }

    /// Reads everything remaining into a new [`Vector`] from `alloc`.
    fn read_to_end_in<'a, A: Allocator + ?Sized>(
        &mut self,
        alloc: &'a A,
    ) -> Result<Vector<'a, u8, A>, PipeError>
    where
        Self: Sized,
    {
        let mut vec = Vector::new_in(alloc);
        self.pipe(&mut vec)?;
        Ok(vec)
    }
}

impl<S: Source + ?Sized> Source for &mut S {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        (**self).read(buf)
    }
}

/// A source which reads from a borrowed byte slice.
///
/// # Examples
/// ```
/// # use standard_sampler::alloc::FixedBufferAllocator;
/// # use standard_sampler::io::{SliceSource, Source};
/// let mut region = [0_u8; 64];
/// let fixed = FixedBufferAllocator::new(&mut region);
///
/// let mut source = SliceSource::new(b"some bytes");
/// let vec = source.read_to_end_in(&fixed).unwrap();
/// assert_eq!(&*vec, b"some bytes");
/// assert_eq!(source.remaining(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct SliceSource<'s> {
    bytes: &'s [u8],
}

impl<'s> SliceSource<'s> {
    pub const fn new(bytes: &'s [u8]) -> SliceSource<'s> {
        SliceSource { bytes }
    }

    /// Returns the number of bytes which haven't been read yet.
    pub const fn remaining(&self) -> usize {
        self.bytes.len()
    }
}

impl Source for SliceSource<'_> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        let count = cmp::min(buf.len(), self.bytes.len());
        let (read, rest) = self.bytes.split_at(count);

        buf[..count].copy_from_slice(read);
        self.bytes = rest;
        Ok(count)
    }
}
