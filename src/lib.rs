//! This crate is a sampler of (some key parts of) a standard library, built around two capability
//! interfaces: where memory comes from, and where bytes go.
//!
//! # Purpose
//! This repo / crate is a learning project, with no expectation for it to be used in production.
//! Each component isolates one idea: a few allocation strategies that share one interface, a
//! collection which grows through whichever of them it is given, and a formatter which renders into
//! anything that accepts bytes.
//!
//! # Allocation
//! Nothing in this crate reaches for a global allocator. Every [`Allocator`](alloc::Allocator) is
//! an ordinary value, constructed and passed explicitly to whatever needs memory:
//! - [`PageAllocator`](alloc::PageAllocator) maps pages straight from the OS.
//! - [`FixedBufferAllocator`](alloc::FixedBufferAllocator) bumps through a caller's region.
//! - [`ArenaAllocator`](alloc::ArenaAllocator) releases everything at once when dropped.
//! - [`GeneralPurposeAllocator`](alloc::GeneralPurposeAllocator) checks every free and reports
//!   leaks.
//!
//! Buffers borrow the allocator which issued them, so the borrow checker refuses to let one outlive
//! its memory.
//!
//! # Error Handling
//! Specifically for a standard library, it is more ergonomic for functions to panic in some cases,
//! because users don't want to be forced to handle an error every time they invoke a method. Broken
//! preconditions (an alignment which isn't a power of two, a template with the wrong number of
//! values) panic. Anything which a correct program can still run into, such as an exhausted
//! allocator or a full sink, is returned.
//!
//! When this crate employs errors via [`Result`]s, it does so in a method that is strongly typed,
//! using enums for static dispatch rather than dynamic, with structs (often ZSTs) that implement
//! [`Error`](std::error::Error).
//!
//! # Logging
//! Diagnostics go through the [`log`] facade: leaks and invalid frees are logged as errors,
//! individual allocations at trace level. This crate never installs a logger itself.
//!
//! # Dependencies
//! The `os` feature (enabled by default) relies on `libc` for the thin syscall wrappers behind
//! [`PageAllocator`](alloc::PageAllocator) and the file descriptor [`io`] types.
//!
//! This crate also depends on some derive macros because they're helpful and remove the need for
//! some very repetitive programming.
// #![warn(missing_docs)]
#![warn(clippy::missing_safety_doc)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(clippy::missing_const_for_fn)]
#![warn(clippy::missing_panics_doc)]
#![warn(clippy::unwrap_used)]
#![allow(clippy::module_inception)]

pub mod alloc;
pub mod collections;
pub mod fmt;
pub mod io;

pub(crate) mod util;
