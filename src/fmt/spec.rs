use derive_more::Display;

/// The specifier inside a placeholder, selecting how its value is rendered.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Spec {
    /// `{}` or `{any}`: the value's natural rendering.
    #[display("any")]
    Any,
    /// `{d}`: a decimal number.
    #[display("d")]
    Decimal,
    /// `{s}`: a string.
    #[display("s")]
    Str,
    /// `{c}`: a single character.
    #[display("c")]
    Char,
    /// `{x}`: lowercase hexadecimal.
    #[display("x")]
    LowerHex,
    /// `{X}`: uppercase hexadecimal.
    #[display("X")]
    UpperHex,
    /// `{b}`: binary.
    #[display("b")]
    Binary,
    /// `{o}`: octal.
    #[display("o")]
    Octal,
}

impl Spec {
    /// Parses the text between a placeholder's braces, returning [`None`] for anything unknown.
    ///
    /// # Examples
    /// ```
    /// # use standard_sampler::fmt::Spec;
    /// assert_eq!(Spec::parse(""), Some(Spec::Any));
    /// assert_eq!(Spec::parse("X"), Some(Spec::UpperHex));
    /// assert_eq!(Spec::parse("q"), None);
    /// ```
    pub fn parse(text: &str) -> Option<Spec> {
        Some(match text {
            "" | "any" => Spec::Any,
            "d" => Spec::Decimal,
            "s" => Spec::Str,
            "c" => Spec::Char,
            "x" => Spec::LowerHex,
            "X" => Spec::UpperHex,
            "b" => Spec::Binary,
            "o" => Spec::Octal,
            _ => return None,
        })
    }

    /// Returns the radix of a numeric specifier.
    pub(crate) const fn radix(self) -> Option<u32> {
        match self {
            Spec::Any | Spec::Decimal => Some(10),
            Spec::LowerHex | Spec::UpperHex => Some(16),
            Spec::Binary => Some(2),
            Spec::Octal => Some(8),
            Spec::Str | Spec::Char => None,
        }
    }
}
