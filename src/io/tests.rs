#![cfg(test)]

use super::*;
use crate::alloc::{FixedBufferAllocator, GeneralPurposeAllocator};

#[test]
fn test_growable_concatenates() {
    let mut region = [0_u8; 256];
    let gpa = GeneralPurposeAllocator::new(FixedBufferAllocator::new(&mut region));

    {
        let mut sink = GrowableByteSink::new_in(&gpa);
        assert_eq!(sink.write(b"first, ").unwrap(), 7, "Every byte should be accepted.");
        assert_eq!(sink.write(b"then second").unwrap(), 11);
        assert_eq!(&*sink, b"first, then second", "Writes should be concatenated in order.");
    }

    assert!(gpa.deinit().is_ok());
}

#[test]
fn test_growable_out_of_memory() {
    let mut region = [0_u8; 8];
    let fixed = FixedBufferAllocator::new(&mut region);
    let mut sink = GrowableByteSink::new_in(&fixed);

    sink.write_all(b"1234").unwrap();
    assert!(sink.write_all(b"56789").unwrap_err().is_out_of_memory());
    assert_eq!(&*sink, b"1234");
}

#[test]
fn test_fixed_capacity() {
    let mut sink = FixedCapacitySink::<[u8; 13]>::with_capacity();

    assert_eq!(sink.write(b"Hello").unwrap(), 5);
    assert_eq!(sink.write(b" Writer!").unwrap(), 8);
    assert_eq!(sink.written(), b"Hello Writer!");
    assert_eq!(sink.remaining(), 0);

    assert_eq!(
        sink.write(b"!").unwrap_err(),
        SinkError::EndOfBuffer(EndOfBuffer),
        "A full sink should refuse even a single byte."
    );
    assert_eq!(sink.written(), b"Hello Writer!", "A refused write shouldn't change anything.");
}

#[test]
fn test_fixed_capacity_all_or_nothing() {
    let mut backing = [0_u8; 8];
    {
        let mut sink = FixedCapacitySink::new(&mut backing[..]);
        sink.write_all(b"abcde").unwrap();
        assert!(sink.write(b"fghij").unwrap_err().is_end_of_buffer());
        assert_eq!(sink.written(), b"abcde", "An oversized write shouldn't be partially applied.");

        sink.reset();
        sink.write_all(b"xy").unwrap();
        assert_eq!(sink.written(), b"xy");
    }
    assert_eq!(&backing[..5], b"xycde", "Reset shouldn't clear the backing storage.");
}

#[test]
fn test_counting_sink() {
    let mut counter = CountingSink::new(NullSink);
    counter.write_all(b"12345").unwrap();
    counter.write_all(b"").unwrap();
    counter.write_all(b"678").unwrap();
    assert_eq!(counter.count(), 8);

    let mut counter = CountingSink::new(FixedCapacitySink::<[u8; 4]>::with_capacity());
    counter.write_all(b"abc").unwrap();
    assert!(counter.write_all(b"de").is_err());
    assert_eq!(counter.count(), 3, "Refused bytes shouldn't be counted.");
    assert_eq!(counter.get_ref().written(), b"abc");
}

/// A sink which only ever accepts a couple of bytes at a time.
struct Trickle<'b>(&'b mut Vec<u8>);

impl Sink for Trickle<'_> {
    fn write(&mut self, bytes: &[u8]) -> Result<usize, SinkError> {
        let count = bytes.len().min(2);
        self.0.extend_from_slice(&bytes[..count]);
        Ok(count)
    }
}

#[test]
fn test_write_all_partial() {
    let mut out = Vec::new();
    Trickle(&mut out).write_all(b"partial writes").unwrap();
    assert_eq!(out, b"partial writes", "write_all should retry until everything is accepted.");
}

#[test]
fn test_slice_source_pipe() {
    let input: Vec<u8> = (0..=255).cycle().take(2000).collect();
    let mut source = SliceSource::new(&input);

    let mut counter = CountingSink::new(NullSink);
    assert_eq!(source.pipe(&mut counter).unwrap(), 2000);
    assert_eq!(counter.count(), 2000);
    assert_eq!(source.remaining(), 0);
    assert_eq!(source.read(&mut [0; 4]).unwrap(), 0, "An exhausted source should report EOF.");

    let mut small = FixedCapacitySink::<[u8; 100]>::with_capacity();
    let err = SliceSource::new(&input).pipe(&mut small).unwrap_err();
    assert!(err.is_sink(), "A full sink should stop the pipe.");
}

#[test]
fn test_read_to_end_in() {
    let mut region = [0_u8; 4096];
    let fixed = FixedBufferAllocator::new(&mut region);

    let input = b"x".repeat(1500);
    let vec = SliceSource::new(&input).read_to_end_in(&fixed).unwrap();
    assert_eq!(vec.len(), 1500);
    assert!(vec.iter().all(|b| *b == b'x'));
}

#[cfg(feature = "os")]
#[test]
fn test_fd_round_trip() {
    use std::io::Seek;
    use std::os::fd::AsFd;

    let mut file = tempfile::tempfile().unwrap();
    {
        let mut sink = FdSink::new(file.as_fd());
        sink.write_all(b"Hello").unwrap();
        sink.write_all(b" Writer!").unwrap();
    }
    file.rewind().unwrap();

    let mut region = [0_u8; 256];
    let fixed = FixedBufferAllocator::new(&mut region);
    let contents = FdSource::new(file.as_fd()).read_to_end_in(&fixed).unwrap();
    assert_eq!(&*contents, b"Hello Writer!");
}

#[cfg(feature = "os")]
#[test]
fn test_fd_error() {
    use std::os::fd::AsFd;

    let file = tempfile::tempfile().unwrap();
    // The scratch file is opened for reading and writing. File::open gives a read-only descriptor,
    // which write(2) refuses with EBADF.
    let dir = std::fs::File::open(std::env::temp_dir()).unwrap();
    let err = FdSink::new(dir.as_fd()).write(b"nope").unwrap_err();
    assert_eq!(err, SinkError::Os(OsError(libc::EBADF)));

    assert!(FdSink::new(file.as_fd()).write(b"yes").is_ok());
}
