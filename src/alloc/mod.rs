//! A pluggable allocator interface and the strategies which implement it.
//!
//! # Purpose
//! Every strategy here hands out [`OwnedBuffer`]s through the same [`Allocator`] interface, so any
//! consumer (such as [`Vector`](crate::collections::Vector)) can be backed by whichever trade-off
//! suits it:
//! - [`PageAllocator`] maps whole pages from the OS for every request.
//! - [`FixedBufferAllocator`] bumps a cursor through a caller-supplied region.
//! - [`ArenaAllocator`] bumps through chunks obtained from a child allocator and frees them all at
//!   once.
//! - [`GeneralPurposeAllocator`] tracks every live allocation of a backing allocator, catching
//!   invalid frees and leaks.
//!
//! # Ownership
//! An [`OwnedBuffer`] borrows the allocator that issued it, so the borrow checker rejects any
//! attempt to use a buffer after its allocator has been torn down. Deallocation consumes the
//! buffer, which leaves the raw parts API as the only way to free a buffer twice. Handing a
//! buffer to the wrong allocator is caught at run time: every strategy rejects memory it didn't
//! issue with an [`InvalidFree`].

mod align;
mod allocator;
mod arena;
mod buffer;
mod error;
mod fixed_buffer;
mod general_purpose;
#[cfg(feature = "os")]
mod page;

pub use align::*;
pub use allocator::*;
pub use arena::*;
pub use buffer::*;
pub use error::*;
pub use fixed_buffer::*;
pub use general_purpose::*;
#[cfg(feature = "os")]
pub use page::*;
