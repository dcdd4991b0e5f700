//! A module containing [`GeneralPurposeAllocator`] and its associated types.
//!
//! [`GpaOptions`] configures the safety checks, while [`LeakDetected`] is returned when the
//! allocator is torn down with allocations still live.

mod error;
mod general_purpose;
mod options;

pub use error::*;
pub use general_purpose::*;
pub use options::*;
