//! Byte sinks and sources.
//!
//! A [`Sink`] accepts bytes and reports how many it took, a [`Source`] hands them out. The
//! formatting facility in [`fmt`](crate::fmt) renders into any sink, so everything here can be the
//! destination of formatted output:
//! - [`GrowableByteSink`] grows through an [`Allocator`](crate::alloc::Allocator).
//! - [`FixedCapacitySink`] fills a fixed array and refuses anything which doesn't fit.
//! - [`CountingSink`] and [`NullSink`] measure and discard.
//! - [`FdSink`] and [`FdSource`] wrap raw file descriptors (with the `os` feature).

mod counting;
mod error;
#[cfg(feature = "os")]
mod fd;
mod fixed;
mod sink;
mod source;
mod tests;

pub use counting::*;
pub use error::*;
#[cfg(feature = "os")]
pub use fd::*;
pub use fixed::*;
pub use sink::*;
pub use source::*;
