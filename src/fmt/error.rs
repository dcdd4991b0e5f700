use derive_more::{Display, Error};

use crate::fmt::Spec;
use crate::util::panic::Panic;

#[derive(Debug, Display, Error)]
#[display("template has {placeholders} placeholders but {values} values were supplied")]
pub struct ArgumentCountPanic {
    pub placeholders: usize,
    pub values: usize,
}
impl Panic for ArgumentCountPanic {}

#[derive(Debug, Display, Error)]
#[display("placeholder opened at byte {offset} is never closed")]
pub struct UnterminatedPlaceholderPanic {
    pub offset: usize,
}
impl Panic for UnterminatedPlaceholderPanic {}

#[derive(Debug, Display, Error)]
#[display("unmatched '}}' at byte {offset}, use '}}}}' for a literal brace")]
pub struct UnmatchedBracePanic {
    pub offset: usize,
}
impl Panic for UnmatchedBracePanic {}

#[derive(Debug, Display, Error)]
#[display("unknown placeholder specifier {_0:?}")]
pub struct UnknownSpecifierPanic(#[error(not(source))] pub String);
impl Panic for UnknownSpecifierPanic {}

#[derive(Debug, Display, Error)]
#[display("specifier '{spec}' is not supported by {type_name}")]
pub struct UnsupportedSpecifierPanic {
    pub spec: Spec,
    pub type_name: &'static str,
}
impl Panic for UnsupportedSpecifierPanic {}
