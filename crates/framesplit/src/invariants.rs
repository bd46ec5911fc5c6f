//! Debug assertion macros for splitter invariants.
//!
//! Only active in debug builds (`debug_assert!`), so release builds carry
//! zero overhead.

/// Assert that a queue never holds more frames than its capacity.
///
/// Checked after every enqueue in `BoundedQueue::push`.
macro_rules! debug_assert_bounded_len {
    ($len:expr, $capacity:expr) => {
        debug_assert!(
            $len <= $capacity,
            "queue holds {} frames, capacity is {}",
            $len,
            $capacity
        )
    };
}

/// Assert that the registry never grows past `max_clients`.
///
/// Checked after the append in `Splitter::add_client`.
macro_rules! debug_assert_registry_bounded {
    ($count:expr, $max:expr) => {
        debug_assert!(
            $count <= $max,
            "registry holds {} clients, limit is {}",
            $count,
            $max
        )
    };
}

/// Assert that the id generator never hands out zero.
macro_rules! debug_assert_id_nonzero {
    ($id:expr) => {
        debug_assert!($id != 0, "client id generator produced zero")
    };
}

/// Assert that a client is fully drained after a flush.
///
/// Checked per client in `Splitter::flush`.
macro_rules! debug_assert_drained {
    ($latency:expr, $dropped:expr) => {
        debug_assert!(
            $latency == 0 && $dropped == 0,
            "client still reports latency {} / dropped {} after flush",
            $latency,
            $dropped
        )
    };
}

pub(crate) use debug_assert_bounded_len;
pub(crate) use debug_assert_drained;
pub(crate) use debug_assert_id_nonzero;
pub(crate) use debug_assert_registry_bounded;
