/// Run-time configuration for a [`GeneralPurposeAllocator`](super::GeneralPurposeAllocator),
/// built with chained const methods.
///
/// # Examples
/// ```
/// # use standard_sampler::alloc::GpaOptions;
/// let options = GpaOptions::new().poison_freed(false);
/// assert!(!options.poisons_freed());
/// assert!(options.tracks_freed());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpaOptions {
    pub(crate) poison_freed: bool,
    pub(crate) track_freed: bool,
}

impl GpaOptions {
    /// Creates the default options, with every check enabled.
    pub const fn new() -> GpaOptions {
        GpaOptions {
            poison_freed: true,
            track_freed: true,
        }
    }

    /// Whether freed memory is overwritten with [`POISON`](super::POISON) before it is returned to
    /// the backing allocator, so that stale reads through raw pointers stand out.
    pub const fn poison_freed(self, value: bool) -> GpaOptions {
        GpaOptions {
            poison_freed: value,
            ..self
        }
    }

    /// Whether freed addresses are remembered, so that freeing one again is reported as a double
    /// free rather than an unknown buffer. Addresses are forgotten once the backing allocator hands
    /// them out again, and only the last [`FREED_HISTORY`](super::FREED_HISTORY) are kept, so an
    /// older double free is reported as an unknown buffer.
    pub const fn track_freed(self, value: bool) -> GpaOptions {
        GpaOptions {
            track_freed: value,
            ..self
        }
    }

    pub const fn poisons_freed(&self) -> bool {
        self.poison_freed
    }

    pub const fn tracks_freed(&self) -> bool {
        self.track_freed
    }
}

impl Default for GpaOptions {
    fn default() -> Self {
        Self::new()
    }
}
