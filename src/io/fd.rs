use std::os::fd::{AsRawFd, BorrowedFd};

use crate::io::{OsError, Sink, SinkError, Source, SourceError};

/// A sink which writes to a file descriptor with `write(2)`.
///
/// The descriptor is borrowed, so the sink never closes it.
///
/// # Examples
/// ```
/// # use standard_sampler::io::{FdSink, Sink};
/// let mut out = FdSink::stdout();
/// out.write_all(b"written straight to fd 1\n").unwrap();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FdSink<'f> {
    fd: BorrowedFd<'f>,
}

impl<'f> FdSink<'f> {
    pub const fn new(fd: BorrowedFd<'f>) -> FdSink<'f> {
        FdSink { fd }
    }

    pub fn stdout() -> FdSink<'static> {
        // SAFETY: Standard output is open for the life of the process unless the program closes
        // it itself, which this crate never does.
        FdSink::new(unsafe { BorrowedFd::borrow_raw(libc::STDOUT_FILENO) })
    }

    pub fn stderr() -> FdSink<'static> {
        // SAFETY: As for stdout.
        FdSink::new(unsafe { BorrowedFd::borrow_raw(libc::STDERR_FILENO) })
    }
}

impl Sink for FdSink<'_> {
    fn write(&mut self, bytes: &[u8]) -> Result<usize, SinkError> {
        loop {
            // SAFETY: The pointer and length come from a valid slice, and the descriptor is open
            // for as long as it is borrowed.
            match unsafe { libc::write(self.fd.as_raw_fd(), bytes.as_ptr().cast(), bytes.len()) } {
                -1 => match OsError::last() {
                    OsError(libc::EINTR) => continue,
                    err => Err(err)?,
                },
                count => return Ok(count as usize),
            }
        }
    }
}

/// A source which reads from a file descriptor with `read(2)`.
#[derive(Debug, Clone, Copy)]
pub struct FdSource<'f> {
    fd: BorrowedFd<'f>,
}

impl<'f> FdSource<'f> {
    pub const fn new(fd: BorrowedFd<'f>) -> FdSource<'f> {
        FdSource { fd }
    }

    pub fn stdin() -> FdSource<'static> {
        // SAFETY: As for FdSink::stdout.
        FdSource::new(unsafe { BorrowedFd::borrow_raw(libc::STDIN_FILENO) })
    }
}

impl Source for FdSource<'_> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        loop {
            // SAFETY: The pointer and length come from a valid mutable slice, and the descriptor
            // is open for as long as it is borrowed.
            match unsafe { libc::read(self.fd.as_raw_fd(), buf.as_mut_ptr().cast(), buf.len()) } {
                -1 => match OsError::last() {
                    OsError(libc::EINTR) => continue,
                    err => Err(err)?,
                },
                count => return Ok(count as usize),
            }
        }
    }
}
