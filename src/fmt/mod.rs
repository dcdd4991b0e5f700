//! Rendering values into any [`Sink`](crate::io::Sink) through a template.
//!
//! [`format`] substitutes values into the placeholders of a template and writes the result to a
//! sink. Values take part by implementing [`Render`], which the primitive types, strings and
//! sequences already do. A type's own implementation receives the sink directly, so it needs no
//! cooperation from the formatter to render nested values.
//!
//! Malformed templates are programmer errors and cause panics. Only failures of the sink itself
//! are returned.

mod error;
mod format;
mod render;
mod spec;

pub use error::*;
pub use format::{allocate_format, buffer_format, count, format};
pub use render::*;
pub use spec::*;
