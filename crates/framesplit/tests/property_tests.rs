//! Property-based tests for the bounded queue and the splitter.
//!
//! These exercise the structural laws that must hold for every execution:
//! bounded depth, FIFO order, drop-oldest retention and identical
//! broadcast sequences.

use framesplit::{BoundedQueue, Config, Frame, Splitter, SplitterError, Wait};
use proptest::prelude::*;

proptest! {
    /// Queue depth never exceeds capacity under arbitrary push/pop mixes.
    #[test]
    fn prop_bounded_depth(
        capacity in 1usize..16,
        ops in prop::collection::vec(prop::bool::ANY, 1..200),
    ) {
        let queue = BoundedQueue::new(capacity);
        let mut value = 0u32;

        for push_op in ops {
            if push_op {
                let _ = queue.push(value, Wait::Immediate);
                value += 1;
            } else {
                let _ = queue.try_pop();
            }
            prop_assert!(queue.len() <= capacity,
                "depth {} exceeds capacity {}", queue.len(), capacity);
        }
    }

    /// With enough capacity, n pushes then n pops reproduce the sequence.
    #[test]
    fn prop_fifo_round_trip(items in prop::collection::vec(any::<u32>(), 1..64)) {
        let queue = BoundedQueue::new(items.len());
        for &item in &items {
            prop_assert!(queue.push(item, Wait::Immediate));
        }

        let mut popped = Vec::new();
        while let Some(item) = queue.try_pop() {
            popped.push(item);
        }
        prop_assert_eq!(popped, items);
    }

    /// Overflow with zero consumption keeps the newest `capacity` items
    /// and reports exactly `n - capacity` losses.
    #[test]
    fn prop_drop_oldest_keeps_newest(
        capacity in 1usize..8,
        extra in 1usize..16,
    ) {
        let n = capacity + extra;
        let queue = BoundedQueue::new(capacity);

        let mut drops = 0;
        for i in 0..n as u32 {
            if !queue.push(i, Wait::Immediate) {
                drops += 1;
            }
        }
        prop_assert_eq!(drops, extra);
        prop_assert_eq!(queue.len(), capacity);

        let mut remaining = Vec::new();
        while let Some(item) = queue.try_pop() {
            remaining.push(item);
        }
        let expected: Vec<u32> = (extra as u32..n as u32).collect();
        prop_assert_eq!(remaining, expected);
    }

    /// Every client observes the identical frame sequence.
    #[test]
    fn prop_broadcast_identical_sequences(
        n_clients in 1usize..5,
        payloads in prop::collection::vec(any::<u8>(), 1..32),
    ) {
        let splitter = Splitter::new(Config::new(payloads.len(), n_clients));
        let ids: Vec<_> = (0..n_clients)
            .map(|_| splitter.add_client().unwrap())
            .collect();

        for &byte in &payloads {
            splitter
                .put(Frame::copy_from_slice(&[byte]), Wait::Immediate)
                .unwrap();
        }

        for &id in &ids {
            let mut seen = Vec::new();
            while let Ok(frame) = splitter.get(id, Wait::Immediate) {
                seen.push(frame[0]);
            }
            prop_assert_eq!(&seen, &payloads);
        }
    }

    /// Producing n > c frames with zero consumption settles latency at the
    /// capacity and the drop counter at n - c.
    #[test]
    fn prop_splitter_drop_law(
        capacity in 1usize..6,
        produced in 8usize..24,
    ) {
        prop_assume!(produced > capacity);

        let splitter = Splitter::new(Config::new(capacity, 1));
        let id = splitter.add_client().unwrap();

        for i in 0..produced {
            let result = splitter.put(Frame::copy_from_slice(&[i as u8]), Wait::Immediate);
            if i < capacity {
                prop_assert!(result.is_ok());
            } else {
                prop_assert_eq!(result, Err(SplitterError::DataDropped));
            }
        }

        let stats = splitter.client_by_id(id).unwrap();
        prop_assert_eq!(stats.latency, capacity);
        prop_assert_eq!(stats.dropped, produced - capacity);

        // Flush wipes both numbers.
        splitter.flush();
        let stats = splitter.client_by_id(id).unwrap();
        prop_assert_eq!(stats.latency, 0);
        prop_assert_eq!(stats.dropped, 0);
    }
}
