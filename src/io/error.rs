use derive_more::{Display, Error, From, IsVariant};

use crate::alloc::OutOfMemory;
use crate::collections::vector::ReserveError;

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[display("end of buffer: the sink can't accept any more bytes")]
pub struct EndOfBuffer;

/// A raw error number reported by the OS.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[display("{}", std::io::Error::from_raw_os_error(*_0))]
pub struct OsError(#[error(not(source))] pub i32);

impl OsError {
    /// Captures the error number of the last failed syscall on this thread.
    #[cfg(feature = "os")]
    pub(crate) fn last() -> OsError {
        OsError(std::io::Error::last_os_error().raw_os_error().unwrap_or(0))
    }
}

#[derive(Debug, Display, Error, From, IsVariant, Clone, Copy, PartialEq, Eq)]
pub enum SinkError {
    EndOfBuffer(EndOfBuffer),
    OutOfMemory(OutOfMemory),
    Os(OsError),
}

impl From<ReserveError> for SinkError {
    fn from(value: ReserveError) -> Self {
        // A capacity overflow is just as unsatisfiable as a refused allocation.
        match value {
            ReserveError::CapacityOverflow(_) | ReserveError::OutOfMemory(_) => OutOfMemory.into(),
        }
    }
}

#[derive(Debug, Display, Error, From, IsVariant, Clone, Copy, PartialEq, Eq)]
pub enum SourceError {
    Os(OsError),
}

/// Copying from a [`Source`](super::Source) into a [`Sink`](super::Sink) failed on one side.
#[derive(Debug, Display, Error, From, IsVariant, Clone, Copy, PartialEq, Eq)]
pub enum PipeError {
    Source(SourceError),
    Sink(SinkError),
}
