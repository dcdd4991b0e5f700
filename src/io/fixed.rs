use std::fmt;

use crate::io::{EndOfBuffer, Sink, SinkError};

/// A sink over a fixed backing array, which is never reallocated.
///
/// Writes are all-or-nothing: a write which doesn't fit in the remaining capacity fails with
/// [`EndOfBuffer`] and leaves the content untouched.
///
/// The backing storage can be owned (`[u8; N]`) or borrowed (`&mut [u8]`).
///
/// # Examples
/// ```
/// # use standard_sampler::io::{FixedCapacitySink, Sink};
/// let mut sink = FixedCapacitySink::<[u8; 13]>::with_capacity();
/// sink.write_all(b"Hello").unwrap();
/// sink.write_all(b" Writer!").unwrap();
/// assert_eq!(sink.written(), b"Hello Writer!");
///
/// assert!(sink.write_all(b"?").unwrap_err().is_end_of_buffer());
/// assert_eq!(sink.written(), b"Hello Writer!");
/// ```
#[derive(Debug, Clone)]
pub struct FixedCapacitySink<B: AsRef<[u8]> + AsMut<[u8]>> {
    buf: B,
    len: usize,
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> FixedCapacitySink<B> {
    /// Creates an empty sink which writes into `buf`, whose length is the capacity.
    pub const fn new(buf: B) -> FixedCapacitySink<B> {
        FixedCapacitySink { buf, len: 0 }
    }

    pub fn capacity(&self) -> usize {
        self.buf.as_ref().len()
    }

    /// Returns the number of bytes written so far.
    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn remaining(&self) -> usize {
        self.capacity() - self.len
    }

    /// Returns the bytes written so far.
    pub fn written(&self) -> &[u8] {
        &self.buf.as_ref()[..self.len]
    }

    /// Discards everything written, without clearing the backing storage.
    pub const fn reset(&mut self) {
        self.len = 0;
    }

    pub fn into_inner(self) -> B {
        self.buf
    }
}

impl<const N: usize> FixedCapacitySink<[u8; N]> {
    /// Creates an empty sink over an owned, zeroed array of `N` bytes.
    pub const fn with_capacity() -> FixedCapacitySink<[u8; N]> {
        FixedCapacitySink::new([0; N])
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> Sink for FixedCapacitySink<B> {
    fn write(&mut self, bytes: &[u8]) -> Result<usize, SinkError> {
        if bytes.len() > self.remaining() {
            Err(EndOfBuffer)?
        }

        let end = self.len + bytes.len();
        self.buf.as_mut()[self.len..end].copy_from_slice(bytes);
        self.len = end;
        Ok(bytes.len())
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> fmt::Write for FixedCapacitySink<B> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write(s.as_bytes()).map(|_| ()).map_err(|_| fmt::Error)
    }
}
