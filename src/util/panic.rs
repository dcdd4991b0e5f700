use std::error::Error;

/// An error which indicates a broken precondition rather than a recoverable failure. These are
/// raised by panicking with the error's message.
pub trait Panic: Error {
    fn panic(&self) -> ! {
        panic!("{}", self)
    }
}

#[allow(unused_macros)]
macro_rules! assert_panics {
    ($run:block) => {
        assert_panics!($run, "assertion failed to panic")
    };
    ($run:block, $msg:literal) => {
        assert!(
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $run)).is_err(),
            $msg
        );
        println!("^ panic caught");
    };
}

#[allow(unused_imports)]
pub(crate) use assert_panics;
