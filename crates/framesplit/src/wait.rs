//! Wait budget for blocking operations.

use std::time::Duration;

/// How long a blocking operation may wait before giving up.
///
/// Mirrors the signed millisecond convention used at foreign boundaries:
/// `-1` waits forever, `0` acts on the current state only, a positive value
/// waits up to that many milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wait {
    /// Block until the operation can proceed or a flush intervenes.
    Forever,
    /// Do not block.
    Immediate,
    /// Block up to the given number of milliseconds.
    Millis(u32),
}

impl Wait {
    /// Decodes the signed millisecond convention.
    ///
    /// `0` maps to [`Wait::Immediate`], negative values to
    /// [`Wait::Forever`], anything else to [`Wait::Millis`].
    pub const fn from_millis(timeout_ms: i32) -> Self {
        if timeout_ms == 0 {
            Wait::Immediate
        } else if timeout_ms < 0 {
            Wait::Forever
        } else {
            Wait::Millis(timeout_ms as u32)
        }
    }

    /// The bounded wait budget, or `None` when waiting forever.
    pub(crate) fn budget(self) -> Option<Duration> {
        match self {
            Wait::Forever => None,
            Wait::Immediate => Some(Duration::ZERO),
            Wait::Millis(ms) => Some(Duration::from_millis(u64::from(ms))),
        }
    }
}

impl From<i32> for Wait {
    fn from(timeout_ms: i32) -> Self {
        Self::from_millis(timeout_ms)
    }
}
