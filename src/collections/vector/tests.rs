#![cfg(test)]

use std::cell::Cell;
use std::rc::Rc;

use super::*;
use crate::alloc::{Allocator, FixedBufferAllocator, GeneralPurposeAllocator};
use crate::util::panic::assert_panics;
use crate::util::testing::{CountedDrop, ZeroSizedType};

#[test]
fn test_growth_keeps_contents() {
    let mut region = [0_u8; 1024];
    let gpa = GeneralPurposeAllocator::new(FixedBufferAllocator::new(&mut region));

    {
        let mut vec = Vector::new_in(&gpa);
        assert_eq!(vec.cap(), 0, "A new Vector shouldn't allocate.");
        assert_eq!(gpa.live_count(), 0);

        let mut caps = Vec::new();
        for i in 0..20_u64 {
            vec.push(i);
            if caps.last() != Some(&vec.cap()) {
                caps.push(vec.cap());
            }
        }

        assert_eq!(caps, [2, 4, 8, 16, 32], "Capacity should start at 2 and double.");
        assert!(
            vec.iter().copied().eq(0..20),
            "Growing should keep every element in order."
        );
        assert_eq!(gpa.live_count(), 1, "Only the current buffer should be live.");
        assert_eq!(gpa.live_bytes(), 32 * size_of::<u64>());
    }

    assert!(gpa.deinit().is_ok(), "Dropping a Vector should release its buffer.");
}

#[test]
fn test_push_pop() {
    let mut region = [0_u8; 256];
    let fixed = FixedBufferAllocator::new(&mut region);
    let mut vec = Vector::new_in(&fixed);

    for i in 0..=5 {
        vec.push(i);
    }
    assert_eq!(&*vec, &[0, 1, 2, 3, 4, 5]);

    for i in (0..=5).rev() {
        assert_eq!(vec.pop(), Some(i));
    }
    assert_eq!(vec.pop(), None);
    assert!(vec.is_empty());
}

#[test]
fn test_insert_remove() {
    let mut region = [0_u8; 256];
    let fixed = FixedBufferAllocator::new(&mut region);
    let mut vec = Vector::new_in(&fixed);
    vec.extend_from_slice(&[0, 1, 2]);

    vec.insert(1, 100);
    vec.insert(1, 200);
    vec.insert(3, 300);
    vec.insert(6, 400);
    assert_eq!(&*vec, &[0, 200, 100, 300, 1, 2, 400]);

    assert_eq!(vec.remove(1), 200);
    assert_eq!(vec.remove(5), 400);
    assert_eq!(&*vec, &[0, 100, 300, 1, 2]);

    assert_panics!({
        vec.remove(5);
    });
    assert_panics!({
        vec.insert(7, 0);
    });
}

#[test]
fn test_exhausted_allocator() {
    // Room for four u32s wherever the region happens to be aligned, but never eight.
    let mut region = [0_u8; 24];
    let fixed = FixedBufferAllocator::new(&mut region);
    let mut vec = Vector::<u32, _>::new_in(&fixed);

    vec.push(1);
    vec.push(2);
    vec.push(3);
    assert_eq!(vec.cap(), 4);
    vec.push(4);

    assert!(vec.try_push(5).unwrap_err().is_out_of_memory());
    assert_eq!(&*vec, &[1, 2, 3, 4], "A failed push should leave the Vector unchanged.");

    assert!(vec.try_reserve(usize::MAX).unwrap_err().is_capacity_overflow());
    assert_panics!({
        vec.push(5);
    });
}

#[test]
fn test_with_cap_and_reserve() {
    let mut region = [0_u8; 256];
    let fixed = FixedBufferAllocator::new(&mut region);

    let mut vec = Vector::<u8, _>::with_cap_in(5, &fixed);
    assert_eq!(vec.cap(), 5);
    vec.extend([1_u8, 2, 3, 4, 5]);
    assert_eq!(vec.cap(), 5, "Extending within capacity shouldn't reallocate.");

    vec.reserve(3);
    assert_eq!(vec.cap(), 8, "Reserve should allocate exactly what was asked for.");
    vec.reserve(2);
    assert_eq!(vec.cap(), 8, "Reserve shouldn't shrink or reallocate needlessly.");
}

#[test]
fn test_drops() {
    let mut region = [0_u8; 512];
    let fixed = FixedBufferAllocator::new(&mut region);
    let counter = Rc::new(Cell::new(0));

    let mut vec = Vector::new_in(&fixed);
    for _ in 0..6 {
        vec.push(CountedDrop::new(&counter));
    }

    vec.truncate(4);
    assert_eq!(counter.get(), 2, "Truncate should drop the tail.");
    drop(vec.remove(0));
    assert_eq!(counter.get(), 3);

    let cloned = vec.clone();
    vec.clear();
    assert_eq!(counter.get(), 6, "Clear should drop every element.");
    assert_eq!(vec.cap(), 8, "Clear should keep the capacity.");

    drop(cloned);
    assert_eq!(counter.get(), 9, "Dropping a Vector should drop its elements.");
}

#[test]
fn test_zst_support() {
    let mut region = [0_u8; 0];
    let fixed = FixedBufferAllocator::new(&mut region);
    let mut vec = Vector::new_in(&fixed);

    for _ in 0..100 {
        vec.push(ZeroSizedType);
    }
    assert_eq!(vec.len(), 100);
    assert_eq!(vec.cap(), usize::MAX, "Zero sized types should never need to allocate.");
    assert_eq!(vec[99], ZeroSizedType);
    assert_eq!(fixed.end_index(), 0);
}

#[test]
fn test_equality_across_allocators() {
    let mut first = [0_u8; 64];
    let mut second = [0_u8; 64];
    let a = FixedBufferAllocator::new(&mut first);
    let b = FixedBufferAllocator::new(&mut second);

    let mut x = Vector::new_in(&a);
    let mut y = Vector::new_in(&b as &dyn Allocator);
    x.extend_from_slice(b"abc");
    y.extend_from_slice(b"abc");

    assert_eq!(x, y, "Equality should only consider the elements.");
    assert_eq!(format!("{x:?}"), "Vector { contents: [97, 98, 99], len: 3, cap: 3 }");
}
