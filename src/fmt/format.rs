use crate::alloc::Allocator;
use crate::collections::Vector;
use crate::fmt::{
    ArgumentCountPanic, Render, Spec, UnknownSpecifierPanic, UnmatchedBracePanic,
    UnterminatedPlaceholderPanic,
};
use crate::io::{CountingSink, FixedCapacitySink, NullSink, Sink, SinkError};
use crate::util::panic::Panic;

/// A fragment of a template: either literal text or a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Piece<'t> {
    Literal(&'t str),
    Placeholder(Spec),
}

/// Splits a template into [`Piece`]s, panicking on malformed placeholders.
#[derive(Debug, Clone)]
pub(crate) struct Pieces<'t> {
    template: &'t str,
    offset: usize,
}

impl<'t> Pieces<'t> {
    pub(crate) const fn new(template: &'t str) -> Pieces<'t> {
        Pieces {
            template,
            offset: 0,
        }
    }
}

impl<'t> Iterator for Pieces<'t> {
    type Item = Piece<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.template[self.offset..];
        let start = self.offset;

        let (piece, consumed) = match rest.find(['{', '}']) {
            None if rest.is_empty() => return None,
            None => (Piece::Literal(rest), rest.len()),
            Some(index) if index > 0 => (Piece::Literal(&rest[..index]), index),
            Some(_) if rest.starts_with("{{") => (Piece::Literal("{"), 2),
            Some(_) if rest.starts_with("}}") => (Piece::Literal("}"), 2),
            Some(_) if rest.starts_with('}') => UnmatchedBracePanic { offset: start }.panic(),
            Some(_) => match rest.find('}') {
                None => UnterminatedPlaceholderPanic { offset: start }.panic(),
                Some(close) => {
                    let text = &rest[1..close];
                    match Spec::parse(text) {
                        Some(spec) => (Piece::Placeholder(spec), close + 1),
                        None => UnknownSpecifierPanic(text.to_owned()).panic(),
                    }
                },
            },
        };

        self.offset += consumed;
        Some(piece)
    }
}

/// Renders `values` into the placeholders of `template`, writing to `sink`.
///
/// Every literal fragment and every value is written separately, in order. If a write fails, the
/// error is returned immediately and whatever was written before it stays in the sink.
///
/// # Template Syntax
/// - `{}` or `{any}` renders the next value in its natural form.
/// - `{d}`, `{s}`, `{c}`, `{x}`, `{X}`, `{b}` and `{o}` select a [`Spec`] explicitly.
/// - `{{` and `}}` are literal braces.
///
/// # Panics
/// Panics if the template is malformed, if the number of placeholders doesn't match the number of
/// values, or if a value doesn't support its placeholder's specifier. The template is checked in
/// full before anything is written.
///
/// # Examples
/// ```
/// # use standard_sampler::fmt;
/// # use standard_sampler::io::FixedCapacitySink;
/// let mut sink = FixedCapacitySink::<[u8; 32]>::with_capacity();
/// fmt::format(&mut sink, "{d} + {d} = {d}", &[&9, &10, &19]).unwrap();
/// assert_eq!(sink.written(), b"9 + 10 = 19");
/// ```
pub fn format(
    sink: &mut dyn Sink,
    template: &str,
    values: &[&dyn Render],
) -> Result<(), SinkError> {
    let placeholders = Pieces::new(template)
        .filter(|piece| matches!(piece, Piece::Placeholder(_)))
        .count();

    if placeholders != values.len() {
        ArgumentCountPanic {
            placeholders,
            values: values.len(),
        }
        .panic()
    }

    let mut values = values.iter();
    for piece in Pieces::new(template) {
        match piece {
            Piece::Literal(text) => sink.write_all(text.as_bytes())?,
            Piece::Placeholder(spec) => {
                // The count was checked above, so every placeholder has a value.
                if let Some(value) = values.next() {
                    value.render(spec, sink)?;
                }
            },
        }
    }

    Ok(())
}

/// Renders into a new [`Vector`] from `alloc`, returning the rendered bytes.
///
/// # Panics
/// Panics under the same conditions as [`format`].
///
/// # Examples
/// ```
/// # use standard_sampler::alloc::FixedBufferAllocator;
/// # use standard_sampler::fmt;
/// let mut region = [0_u8; 128];
/// let fixed = FixedBufferAllocator::new(&mut region);
///
/// let bytes = fmt::allocate_format(&fixed, "{} items: {}", &[&3, &[1.5, 2.0, -0.25]]).unwrap();
/// assert_eq!(&*bytes, b"3 items: [1.5, 2, -0.25]");
/// ```
pub fn allocate_format<'a, A: Allocator + ?Sized>(
    alloc: &'a A,
    template: &str,
    values: &[&dyn Render],
) -> Result<Vector<'a, u8, A>, SinkError> {
    let mut vec = Vector::try_with_cap_in(template.len(), alloc)?;
    format(&mut vec, template, values)?;
    Ok(vec)
}

/// Renders into `buf`, returning the part of it which was written.
///
/// # Panics
/// Panics under the same conditions as [`format`].
pub fn buffer_format<'b>(
    buf: &'b mut [u8],
    template: &str,
    values: &[&dyn Render],
) -> Result<&'b [u8], SinkError> {
    let mut sink = FixedCapacitySink::new(buf);
    format(&mut sink, template, values)?;

    let len = sink.len();
    let buf: &'b [u8] = sink.into_inner();
    Ok(&buf[..len])
}

/// Returns the number of bytes that [`format`] would write.
///
/// # Panics
/// Panics under the same conditions as [`format`].
pub fn count(template: &str, values: &[&dyn Render]) -> usize {
    let mut counter = CountingSink::new(NullSink);
    // NullSink accepts everything, so only a failing custom renderer can stop the count early.
    let _ = format(&mut counter, template, values);
    counter.count()
}

/// Renders values into the placeholders of a template, as [`format`] does, building the value
/// list from the given expressions.
///
/// # Examples
/// ```
/// # use standard_sampler::io::FixedCapacitySink;
/// # use standard_sampler::render;
/// let mut sink = FixedCapacitySink::<[u8; 32]>::with_capacity();
/// let name = "Freya";
/// render!(&mut sink, "{s} ({d}), {x}", name, 1970, 255_u8).unwrap();
/// assert_eq!(sink.written(), b"Freya (1970), ff");
/// ```
#[macro_export]
macro_rules! render {
    ($sink:expr, $template:expr $(, $value:expr)* $(,)?) => {{
        let values: &[&dyn $crate::fmt::Render] = &[$(&$value),*];
        $crate::fmt::format($sink, $template, values)
    }};
}
