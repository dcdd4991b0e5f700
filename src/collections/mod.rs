//! Collection types which obtain their memory from an explicitly passed
//! [`Allocator`](crate::alloc::Allocator).
//!
//! # Method
//! Applicable types here implement [`Deref<Target = [T]>`](std::ops::Deref) (and DerefMut), which
//! saves me from writing some of the more repetitive functionality.

pub mod vector;

pub use vector::Vector;
