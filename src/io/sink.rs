use crate::alloc::Allocator;
use crate::collections::Vector;
use crate::io::{EndOfBuffer, SinkError};

/// A destination for bytes.
///
/// `write` reports how many bytes were accepted, which may be fewer than offered. The sinks in
/// this crate either accept everything or fail, but [`write_all`](Sink::write_all) copes with
/// partial acceptance from any implementation.
pub trait Sink {
    fn write(&mut self, bytes: &[u8]) -> Result<usize, SinkError>;

    /// Writes every byte of `bytes`, retrying after partial writes. A sink which accepts nothing
    /// of a non-empty write is treated as full.
    fn write_all(&mut self, mut bytes: &[u8]) -> Result<(), SinkError> {
        while !bytes.is_empty() {
            match self.write(bytes)? {
                0 => Err(EndOfBuffer)?,
                count => bytes = &bytes[count..],
            }
        }
        Ok(())
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn write(&mut self, bytes: &[u8]) -> Result<usize, SinkError> {
        (**self).write(bytes)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        (**self).write_all(bytes)
    }
}

/// A sink which appends everything written to it, growing through its allocator as needed.
///
/// # Examples
/// ```
/// # use standard_sampler::alloc::FixedBufferAllocator;
/// # use standard_sampler::io::{GrowableByteSink, Sink};
/// let mut region = [0_u8; 64];
/// let fixed = FixedBufferAllocator::new(&mut region);
///
/// let mut sink = GrowableByteSink::new_in(&fixed);
/// sink.write_all(b"Hello").unwrap();
/// sink.write_all(b", World!").unwrap();
/// assert_eq!(&*sink, b"Hello, World!");
/// ```
pub type GrowableByteSink<'a, A> = Vector<'a, u8, A>;

impl<A: Allocator + ?Sized> Sink for Vector<'_, u8, A> {
    fn write(&mut self, bytes: &[u8]) -> Result<usize, SinkError> {
        self.try_extend_from_slice(bytes)?;
        Ok(bytes.len())
    }
}
