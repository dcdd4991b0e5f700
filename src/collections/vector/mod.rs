//! A module containing [`Vector`] and the errors raised while growing it.
//!
//! [`Vector`] is also re-exported under the parent module.

mod error;
mod tests;
mod vector;

pub use error::*;
pub use vector::*;
