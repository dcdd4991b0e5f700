use crate::io::{Sink, SinkError};

/// A sink which passes everything through to another sink, counting the bytes it accepts.
#[derive(Debug, Default)]
pub struct CountingSink<S: Sink> {
    inner: S,
    count: usize,
}

impl<S: Sink> CountingSink<S> {
    pub const fn new(inner: S) -> CountingSink<S> {
        CountingSink { inner, count: 0 }
    }

    /// Returns the total number of bytes accepted by the inner sink.
    pub const fn count(&self) -> usize {
        self.count
    }

    pub const fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Sink> Sink for CountingSink<S> {
    fn write(&mut self, bytes: &[u8]) -> Result<usize, SinkError> {
        let count = self.inner.write(bytes)?;
        self.count += count;
        Ok(count)
    }
}

/// A sink which accepts and discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl Sink for NullSink {
    fn write(&mut self, bytes: &[u8]) -> Result<usize, SinkError> {
        Ok(bytes.len())
    }
}
