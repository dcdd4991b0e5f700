use std::any;
use std::fmt::Write;

use crate::alloc::Allocator;
use crate::collections::Vector;
use crate::fmt::{Spec, UnsupportedSpecifierPanic};
use crate::io::{EndOfBuffer, FixedCapacitySink, Sink, SinkError};
use crate::util::panic::Panic;

/// A value which can be substituted into a placeholder by [`format`](super::format).
///
/// Implementations write their rendering straight into `sink`, so they may call
/// [`format`](super::format) themselves to render nested values.
///
/// # Panics
/// Implementations panic with an [`UnsupportedSpecifierPanic`] if they don't support `spec`, which
/// [`unsupported`] raises for them.
///
/// # Examples
/// ```
/// # use standard_sampler::fmt::{Render, Spec, unsupported};
/// # use standard_sampler::io::{FixedCapacitySink, Sink, SinkError};
/// # use standard_sampler::render;
/// struct Film {
///     name: &'static str,
///     year: u16,
/// }
///
/// impl Render for Film {
///     fn render(&self, spec: Spec, sink: &mut dyn Sink) -> Result<(), SinkError> {
///         match spec {
///             Spec::Any => render!(sink, "{s} ({d})", self.name, self.year),
///             _ => unsupported::<Self>(spec),
///         }
///     }
/// }
///
/// let mut sink = FixedCapacitySink::<[u8; 32]>::with_capacity();
/// let film = Film { name: "Metropolis", year: 1927 };
/// render!(&mut sink, "Watching {}.", film).unwrap();
/// assert_eq!(sink.written(), b"Watching Metropolis (1927).");
/// ```
pub trait Render {
    fn render(&self, spec: Spec, sink: &mut dyn Sink) -> Result<(), SinkError>;
}

/// Panics because `spec` isn't supported by `T`.
pub fn unsupported<T: ?Sized>(spec: Spec) -> ! {
    UnsupportedSpecifierPanic {
        spec,
        type_name: any::type_name::<T>(),
    }
    .panic()
}

/// Writes `value` in the given radix as a single write. `negative` prefixes a minus sign.
fn render_digits(
    mut value: u128,
    negative: bool,
    radix: u32,
    upper: bool,
    sink: &mut dyn Sink,
) -> Result<(), SinkError> {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";

    // Enough for u128::MAX in binary, plus a sign.
    let mut buf = [0_u8; 129];
    let mut start = buf.len();

    loop {
        start -= 1;
        let digit = DIGITS[(value % radix as u128) as usize];
        buf[start] = if upper { digit.to_ascii_uppercase() } else { digit };
        value /= radix as u128;

        if value == 0 {
            break;
        }
    }

    if negative {
        start -= 1;
        buf[start] = b'-';
    }

    sink.write_all(&buf[start..])
}

macro_rules! impl_render_int {
    ($($int:ty => $unsigned:ty),* $(,)?) => {
        $(
            impl Render for $int {
                fn render(&self, spec: Spec, sink: &mut dyn Sink) -> Result<(), SinkError> {
                    match spec.radix() {
                        Some(10) => render_digits(
                            self.unsigned_abs() as u128,
                            *self < 0,
                            10,
                            false,
                            sink,
                        ),
                        // Other radixes show the two's complement bits, without a sign.
                        Some(radix) => render_digits(
                            *self as $unsigned as u128,
                            false,
                            radix,
                            spec == Spec::UpperHex,
                            sink,
                        ),
                        None => unsupported::<Self>(spec),
                    }
                }
            }
        )*
    };
}

macro_rules! impl_render_uint {
    ($($uint:ty),* $(,)?) => {
        $(
            impl Render for $uint {
                fn render(&self, spec: Spec, sink: &mut dyn Sink) -> Result<(), SinkError> {
                    match spec.radix() {
                        Some(radix) => render_digits(
                            *self as u128,
                            false,
                            radix,
                            spec == Spec::UpperHex,
                            sink,
                        ),
                        None => unsupported::<Self>(spec),
                    }
                }
            }
        )*
    };
}

impl_render_int!(i8 => u8, i16 => u16, i32 => u32, i64 => u64, i128 => u128, isize => usize);
impl_render_uint!(u8, u16, u32, u64, u128, usize);

macro_rules! impl_render_float {
    ($($float:ty),* $(,)?) => {
        $(
            impl Render for $float {
                fn render(&self, spec: Spec, sink: &mut dyn Sink) -> Result<(), SinkError> {
                    match spec {
                        Spec::Any | Spec::Decimal => {
                            // Display never uses an exponent, so a subnormal f64 takes about 330 bytes.
                            let mut buf = FixedCapacitySink::<[u8; 512]>::with_capacity();
                            if write!(buf, "{}", self).is_err() {
                                Err(EndOfBuffer)?
                            }
                            sink.write_all(buf.written())
                        },
                        _ => unsupported::<Self>(spec),
                    }
                }
            }
        )*
    };
}

impl_render_float!(f32, f64);

impl Render for bool {
    fn render(&self, spec: Spec, sink: &mut dyn Sink) -> Result<(), SinkError> {
        match spec {
            Spec::Any | Spec::Str => sink.write_all(if *self { "true" } else { "false" }.as_bytes()),
            _ => unsupported::<Self>(spec),
        }
    }
}

impl Render for char {
    fn render(&self, spec: Spec, sink: &mut dyn Sink) -> Result<(), SinkError> {
        match spec {
            Spec::Any | Spec::Char | Spec::Str => {
                let mut buf = [0_u8; 4];
                sink.write_all(self.encode_utf8(&mut buf).as_bytes())
            },
            _ => unsupported::<Self>(spec),
        }
    }
}

impl Render for str {
    fn render(&self, spec: Spec, sink: &mut dyn Sink) -> Result<(), SinkError> {
        match spec {
            Spec::Any | Spec::Str => sink.write_all(self.as_bytes()),
            _ => unsupported::<Self>(spec),
        }
    }
}

impl Render for String {
    fn render(&self, spec: Spec, sink: &mut dyn Sink) -> Result<(), SinkError> {
        self.as_str().render(spec, sink)
    }
}

impl<T: Render + ?Sized> Render for &T {
    fn render(&self, spec: Spec, sink: &mut dyn Sink) -> Result<(), SinkError> {
        (**self).render(spec, sink)
    }
}

/// Renders `[a, b, c]`, passing `spec` on to every element.
fn render_sequence<T: Render>(items: &[T], spec: Spec, sink: &mut dyn Sink) -> Result<(), SinkError> {
    sink.write_all(b"[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            sink.write_all(b", ")?;
        }
        item.render(spec, sink)?;
    }
    sink.write_all(b"]")
}

impl<T: Render> Render for [T] {
    fn render(&self, spec: Spec, sink: &mut dyn Sink) -> Result<(), SinkError> {
        render_sequence(self, spec, sink)
    }
}

impl<T: Render, const N: usize> Render for [T; N] {
    fn render(&self, spec: Spec, sink: &mut dyn Sink) -> Result<(), SinkError> {
        render_sequence(self, spec, sink)
    }
}

impl<T: Render> Render for Vec<T> {
    fn render(&self, spec: Spec, sink: &mut dyn Sink) -> Result<(), SinkError> {
        render_sequence(self, spec, sink)
    }
}

impl<T: Render, A: Allocator + ?Sized> Render for Vector<'_, T, A> {
    fn render(&self, spec: Spec, sink: &mut dyn Sink) -> Result<(), SinkError> {
        render_sequence(self, spec, sink)
    }
}

impl<T: Render> Render for Option<T> {
    fn render(&self, spec: Spec, sink: &mut dyn Sink) -> Result<(), SinkError> {
        match self {
            Some(value) => value.render(spec, sink),
            None => sink.write_all(b"null"),
        }
    }
}
