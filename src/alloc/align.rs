use crate::alloc::InvalidAlignmentPanic;
use crate::util::panic::Panic;

/// Rounds `value` up to the next multiple of `align`, returning [`None`] if doing so would
/// overflow.
///
/// `align` must be a power of two.
///
/// # Examples
/// ```
/// # use standard_sampler::alloc::align_up;
/// assert_eq!(align_up(13, 8), Some(16));
/// assert_eq!(align_up(16, 8), Some(16));
/// assert_eq!(align_up(0, 4096), Some(0));
/// assert_eq!(align_up(usize::MAX, 2), None);
/// ```
pub const fn align_up(value: usize, align: usize) -> Option<usize> {
    match value.checked_add(align - 1) {
        Some(bumped) => Some(bumped & !(align - 1)),
        None => None,
    }
}

/// Checks that `align` is usable as an alignment.
///
/// # Panics
/// Panics if `align` isn't a power of two.
pub(crate) fn check_align(align: usize) {
    if !align.is_power_of_two() {
        InvalidAlignmentPanic(align).panic()
    }
}

#[cfg(test)]
mod tests {
    use std::mem;

    use super::*;
    use crate::util::panic::assert_panics;

    #[test]
    fn test_align_up() {
        let ptr_size = mem::size_of::<usize>();

        for i in 0..10 {
            let expected = ptr_size * (i + 1);
            for size in (ptr_size * i + 1)..=(ptr_size * (i + 1)) {
                assert_eq!(
                    align_up(size, ptr_size),
                    Some(expected),
                    "Every size in a word should round up to the end of that word."
                );
            }
        }

        assert_eq!(align_up(4097, 4096), Some(8192));
        assert_eq!(align_up(usize::MAX - 2, 4), None, "Overflow should be reported.");
    }

    #[test]
    fn test_check_align() {
        check_align(1);
        check_align(64);
        assert_panics!({ check_align(0) });
        assert_panics!({ check_align(24) });
    }
}
