use derive_more::{Display, Error};

use crate::util::panic::Panic;

#[derive(Debug, Display, Error)]
#[display("index {index} out of bounds for collection with {len} elements")]
pub struct IndexOutOfBounds {
    pub index: usize,
    pub len: usize,
}

impl Panic for IndexOutOfBounds {}
