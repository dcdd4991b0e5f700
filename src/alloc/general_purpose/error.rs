use std::error::Error;
use std::fmt::{self, Display, Formatter};

use derive_more::Display;

/// A single allocation which was never returned to its allocator.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
#[display("{size} bytes (align {align}) at {addr:#x}")]
pub struct Leak {
    pub addr: usize,
    pub size: usize,
    pub align: usize,
}

/// Returned when a [`GeneralPurposeAllocator`](super::GeneralPurposeAllocator) is torn down with
/// live allocations, listing one [`Leak`] per unfreed buffer in address order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeakDetected {
    pub leaks: Vec<Leak>,
}

impl LeakDetected {
    /// Returns the total number of leaked bytes.
    pub fn leaked_bytes(&self) -> usize {
        self.leaks.iter().map(|leak| leak.size).sum()
    }
}

impl Display for LeakDetected {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} allocation(s) leaked, totalling {} bytes",
            self.leaks.len(),
            self.leaked_bytes()
        )
    }
}

impl Error for LeakDetected {}
