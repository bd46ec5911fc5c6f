//! Bounded blocking FIFO used as each client's frame buffer.

use crate::invariants::debug_assert_bounded_len;
use crate::Wait;
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Instant;

struct Inner<T> {
    items: VecDeque<T>,
    /// Bumped by every flush. An operation that entered the queue before a
    /// flush compares its snapshot against the current value after each
    /// wakeup; a mismatch means "a flush intervened" and the operation
    /// reports the flushed outcome instead of retrying.
    generation: u64,
}

/// Thread-safe bounded FIFO with timed push, timed pop and flush.
///
/// A `push` against a full queue trades the oldest buffered item for the
/// new one once its wait budget is exhausted, so the stream keeps moving at
/// the cost of one reported loss. `flush` empties the buffer and wakes
/// every blocked producer and consumer; operations already waiting report
/// the flushed outcome, while operations issued afterwards see an ordinary
/// empty queue.
///
/// Synchronization is one mutex plus two condition variables (`not_full`
/// for producers, `not_empty` for consumers). Mutex poisoning is recovered
/// transparently so a panic on one thread does not wedge the others.
pub struct BoundedQueue<T> {
    inner: Mutex<Inner<T>>,
    not_full: Condvar,
    not_empty: Condvar,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Creates a queue holding at most `capacity` items.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be at least 1");

        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::with_capacity(capacity),
                generation: 0,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            capacity,
        }
    }

    /// The fixed capacity this queue was created with.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of buffered items.
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    /// `true` when no items are buffered.
    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    /// Enqueues `item`, waiting up to `wait` for room.
    ///
    /// Returns `true` when the item was stored without loss. Returns
    /// `false` in two cases: a flush interrupted the wait (the item is not
    /// stored), or the wait budget ran out against a full queue; then the
    /// oldest buffered item is discarded and `item` takes its place at the
    /// tail. The return value therefore means "no item was lost", not
    /// "your item was accepted".
    pub fn push(&self, item: T, wait: Wait) -> bool {
        let mut guard = self.lock();
        let generation = guard.generation;

        match wait.budget() {
            None => loop {
                if guard.generation != generation {
                    return false;
                }
                if guard.items.len() < self.capacity {
                    break;
                }
                guard = self.wait_not_full(guard);
            },
            Some(budget) => {
                let deadline = Instant::now() + budget;
                loop {
                    if guard.generation != generation {
                        return false;
                    }
                    if guard.items.len() < self.capacity {
                        break;
                    }
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        // Budget exhausted against a full queue: trade the
                        // oldest item for the new one.
                        guard.items.pop_front();
                        guard.items.push_back(item);
                        drop(guard);
                        self.not_empty.notify_one();
                        return false;
                    }
                    guard = self.wait_not_full_timeout(guard, remaining);
                }
            }
        }

        guard.items.push_back(item);
        debug_assert_bounded_len!(guard.items.len(), self.capacity);
        drop(guard);
        self.not_empty.notify_one();
        true
    }

    /// Removes the head item, waiting up to `wait` for one to arrive.
    ///
    /// Returns `None` when the budget runs out with the queue still empty
    /// or when a flush wakes the waiter.
    pub fn wait_pop(&self, wait: Wait) -> Option<T> {
        let mut guard = self.lock();
        let generation = guard.generation;

        match wait.budget() {
            None => loop {
                if guard.generation != generation {
                    return None;
                }
                if let Some(item) = guard.items.pop_front() {
                    drop(guard);
                    self.not_full.notify_one();
                    return Some(item);
                }
                guard = self.wait_not_empty(guard);
            },
            Some(budget) => {
                let deadline = Instant::now() + budget;
                loop {
                    if guard.generation != generation {
                        return None;
                    }
                    if let Some(item) = guard.items.pop_front() {
                        drop(guard);
                        self.not_full.notify_one();
                        return Some(item);
                    }
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return None;
                    }
                    guard = self.wait_not_empty_timeout(guard, remaining);
                }
            }
        }
    }

    /// Removes the head item if one is immediately available.
    pub fn try_pop(&self) -> Option<T> {
        let mut guard = self.lock();
        let item = guard.items.pop_front();
        if item.is_some() {
            drop(guard);
            self.not_full.notify_one();
        }
        item
    }

    /// Empties the queue and wakes every blocked producer and consumer.
    ///
    /// Waiters that were blocked across the flush report the flushed
    /// outcome (`false` from [`push`](Self::push), `None` from
    /// [`wait_pop`](Self::wait_pop)); operations issued afterwards see an
    /// ordinary empty queue.
    pub fn flush(&self) {
        let mut guard = self.lock();
        guard.items.clear();
        guard.generation += 1;
        drop(guard);
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }

    // ---------------------------------------------------------------------
    // LOCK & WAIT HELPERS (poison-recovering)
    // ---------------------------------------------------------------------

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn wait_not_full<'a>(&self, guard: MutexGuard<'a, Inner<T>>) -> MutexGuard<'a, Inner<T>> {
        match self.not_full.wait(guard) {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn wait_not_empty<'a>(&self, guard: MutexGuard<'a, Inner<T>>) -> MutexGuard<'a, Inner<T>> {
        match self.not_empty.wait(guard) {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn wait_not_full_timeout<'a>(
        &self,
        guard: MutexGuard<'a, Inner<T>>,
        remaining: std::time::Duration,
    ) -> MutexGuard<'a, Inner<T>> {
        match self.not_full.wait_timeout(guard, remaining) {
            Ok((guard, _)) => guard,
            Err(poisoned) => poisoned.into_inner().0,
        }
    }

    fn wait_not_empty_timeout<'a>(
        &self,
        guard: MutexGuard<'a, Inner<T>>,
        remaining: std::time::Duration,
    ) -> MutexGuard<'a, Inner<T>> {
        match self.not_empty.wait_timeout(guard, remaining) {
            Ok((guard, _)) => guard,
            Err(poisoned) => poisoned.into_inner().0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_fifo_order() {
        let queue = BoundedQueue::new(4);
        for i in 0..4 {
            assert!(queue.push(i, Wait::Immediate));
        }
        assert_eq!(queue.len(), 4);

        for i in 0..4 {
            assert_eq!(queue.try_pop(), Some(i));
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn test_immediate_push_drops_oldest_when_full() {
        let queue = BoundedQueue::new(2);
        assert!(queue.push(1, Wait::Immediate));
        assert!(queue.push(2, Wait::Immediate));

        // Full: the oldest item makes room for the new one.
        assert!(!queue.push(3, Wait::Immediate));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.try_pop(), Some(2));
        assert_eq!(queue.try_pop(), Some(3));
    }

    #[test]
    fn test_timed_push_waits_for_room() {
        let queue = Arc::new(BoundedQueue::new(1));
        assert!(queue.push(1, Wait::Immediate));

        let popper = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(30));
                queue.try_pop()
            })
        };

        // Room appears well inside the budget; no drop.
        assert!(queue.push(2, Wait::Millis(500)));
        assert_eq!(popper.join().unwrap(), Some(1));
        assert_eq!(queue.try_pop(), Some(2));
    }

    #[test]
    fn test_wait_pop_times_out() {
        let queue = BoundedQueue::<u32>::new(2);
        let start = Instant::now();
        assert_eq!(queue.wait_pop(Wait::Millis(30)), None);
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_wait_pop_immediate() {
        let queue = BoundedQueue::new(2);
        assert_eq!(queue.wait_pop(Wait::Immediate), None);
        queue.push(7, Wait::Immediate);
        assert_eq!(queue.wait_pop(Wait::Immediate), Some(7));
    }

    #[test]
    fn test_flush_wakes_blocked_popper() {
        let queue = Arc::new(BoundedQueue::<u32>::new(2));

        let popper = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.wait_pop(Wait::Forever))
        };

        thread::sleep(Duration::from_millis(30));
        queue.flush();
        assert_eq!(popper.join().unwrap(), None);
    }

    #[test]
    fn test_flush_wakes_blocked_pusher_without_enqueue() {
        let queue = Arc::new(BoundedQueue::new(1));
        queue.push(1, Wait::Immediate);

        let pusher = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.push(2, Wait::Forever))
        };

        thread::sleep(Duration::from_millis(30));
        queue.flush();

        // The blocked push reports the flushed outcome and its item is gone.
        assert!(!pusher.join().unwrap());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_usable_after_flush() {
        let queue = BoundedQueue::new(2);
        queue.push(1, Wait::Immediate);
        queue.flush();

        assert!(queue.push(2, Wait::Immediate));
        assert_eq!(queue.wait_pop(Wait::Millis(50)), Some(2));
    }

    #[test]
    fn test_popper_across_flush_ignores_later_items() {
        let queue = Arc::new(BoundedQueue::new(2));

        let popper = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.wait_pop(Wait::Millis(500)))
        };

        thread::sleep(Duration::from_millis(30));
        queue.flush();
        queue.push(9, Wait::Immediate);

        // The waiter entered before the flush, so it must not steal the
        // post-flush item.
        assert_eq!(popper.join().unwrap(), None);
        assert_eq!(queue.try_pop(), Some(9));
    }

    #[test]
    fn test_producer_consumer_threads() {
        let queue = Arc::new(BoundedQueue::new(4));
        const N: u32 = 200;

        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..N {
                    assert!(queue.push(i, Wait::Forever));
                }
            })
        };

        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                let mut received = Vec::new();
                while received.len() < N as usize {
                    if let Some(item) = queue.wait_pop(Wait::Millis(500)) {
                        received.push(item);
                    }
                }
                received
            })
        };

        producer.join().unwrap();
        let received = consumer.join().unwrap();
        assert_eq!(received, (0..N).collect::<Vec<_>>());
    }

    #[test]
    #[should_panic(expected = "queue capacity must be at least 1")]
    fn test_zero_capacity_rejected() {
        let _ = BoundedQueue::<u32>::new(0);
    }
}
