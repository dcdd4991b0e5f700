use derive_more::{Display, Error, From, IsVariant};

use crate::alloc::OutOfMemory;

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[display("capacity overflow: memory layout would exceed isize::MAX bytes")]
pub struct CapacityOverflow;

/// The capacity of a [`Vector`](super::Vector) couldn't be increased.
#[derive(Debug, Display, Error, From, IsVariant, Clone, Copy, PartialEq, Eq)]
pub enum ReserveError {
    CapacityOverflow(CapacityOverflow),
    OutOfMemory(OutOfMemory),
}
