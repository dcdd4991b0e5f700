use std::error::Error;

use standard_sampler::alloc::{
    Allocator, ArenaAllocator, FixedBufferAllocator, GeneralPurposeAllocator, PageAllocator,
};
use standard_sampler::collections::Vector;
use standard_sampler::fmt::{self, Render, Spec, unsupported};
use standard_sampler::io::{
    FdSink, FixedCapacitySink, GrowableByteSink, Sink, SinkError, SliceSource, Source,
};
use standard_sampler::render;

struct Person {
    name: &'static str,
    year: u16,
}

impl Render for Person {
    fn render(&self, spec: Spec, sink: &mut dyn Sink) -> Result<(), SinkError> {
        match spec {
            Spec::Any => render!(sink, "{s} ({d})", self.name, self.year),
            _ => unsupported::<Self>(spec),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut out = FdSink::stdout();

    render!(&mut out, "\n[PageAllocator]\n")?;
    let pages = PageAllocator::new();
    let buf = pages.allocate(100, 8)?;
    render!(
        &mut out,
        "asked for {} bytes, page size is {}\n",
        buf.len(),
        PageAllocator::page_size()
    )?;
    pages.deallocate(buf)?;

    render!(&mut out, "\n[FixedBufferAllocator]\n")?;
    let mut region = [0_u8; 64];
    let fixed = FixedBufferAllocator::new(&mut region);
    let mut count = 0;
    while fixed.allocate(7, 1).is_ok() {
        count += 1;
    }
    render!(&mut out, "{} buffers of 7 bytes fit in {} bytes\n", count, fixed.capacity())?;

    render!(&mut out, "\n[GeneralPurposeAllocator + ArenaAllocator]\n")?;
    let gpa = GeneralPurposeAllocator::new(PageAllocator::new());
    {
        let arena = ArenaAllocator::new(&gpa);
        for size in [16, 300, 1000] {
            let _ = arena.allocate(size, 8)?;
        }
        render!(
            &mut out,
            "arena holds {} chunks, the gpa sees {} live allocations\n",
            arena.chunk_count(),
            gpa.live_count()
        )?;
    }
    render!(&mut out, "after the arena is dropped: {} live\n", gpa.live_count())?;

    render!(&mut out, "\n[Sinks]\n")?;
    let mut growable = GrowableByteSink::new_in(&gpa);
    growable.write_all(b"Hello")?;
    growable.write_all(b", World!")?;
    render!(&mut out, "growable: {s}\n", String::from_utf8_lossy(&growable).into_owned())?;

    let mut fixed_sink = FixedCapacitySink::<[u8; 13]>::with_capacity();
    fixed_sink.write_all(b"Hello")?;
    fixed_sink.write_all(b" Writer!")?;
    if let Err(err) = fixed_sink.write_all(b"!") {
        render!(&mut out, "fixed: refused one more byte ({s})\n", err.to_string())?;
    }

    render!(&mut out, "\n[Formatting]\n")?;
    let films = [
        Person { name: "Freya", year: 1970 },
        Person { name: "Metropolis", year: 1927 },
    ];
    render!(&mut out, "{d} + {d} = {d}\n", 9, 10, 19)?;
    render!(&mut out, "{}\n", films)?;
    render!(&mut out, "{x} in binary is {b}\n", 0xAB, 0xAB)?;

    let rendered = fmt::allocate_format(&gpa, "{} and {}", &[&films[0], &Some(1.5)])?;
    let mut copied: Vector<u8, _> = Vector::new_in(&gpa);
    SliceSource::new(&rendered).pipe(&mut copied)?;
    copied.write_all(b"\n")?;
    out.write_all(&copied)?;

    drop(rendered);
    drop(copied);
    drop(growable);
    gpa.deinit()?;
    Ok(())
}
