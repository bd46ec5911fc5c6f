//! A registered consumer endpoint with its own bounded frame queue.

use crate::invariants::debug_assert_id_nonzero;
use crate::queue::BoundedQueue;
use crate::{Frame, SplitterError, Wait};
use log::{debug, trace};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

/// Unique client identifier. Strictly monotonically increasing across the
/// process lifetime; never zero, never reused.
pub type ClientId = u32;

/// Process-wide id source, pre-incremented so the first id is 1.
static NEXT_CLIENT_ID: AtomicU32 = AtomicU32::new(0);

fn next_client_id() -> ClientId {
    let id = NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed) + 1;
    debug_assert_id_nonzero!(id);
    id
}

/// One registered consumer: a fresh id, an exclusively owned bounded queue
/// and drop accounting.
pub(crate) struct Client {
    id: ClientId,
    queue: BoundedQueue<Frame>,
    /// Frames discarded at this client since the last flush.
    dropped: AtomicUsize,
}

impl Client {
    pub(crate) fn new(max_buffers: usize) -> Self {
        Self {
            id: next_client_id(),
            queue: BoundedQueue::new(max_buffers),
            dropped: AtomicUsize::new(0),
        }
    }

    #[inline]
    pub(crate) fn id(&self) -> ClientId {
        self.id
    }

    /// Frames currently buffered and awaiting consumption.
    #[inline]
    pub(crate) fn latency(&self) -> usize {
        self.queue.len()
    }

    /// Frames discarded since the last flush.
    #[inline]
    pub(crate) fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Offers a frame to this client's queue.
    pub(crate) fn put(&self, frame: Frame, wait: Wait) -> Result<(), SplitterError> {
        if self.queue.push(frame, wait) {
            Ok(())
        } else {
            let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            debug!("client {}: frame dropped (total {})", self.id, dropped);
            Err(SplitterError::DataDropped)
        }
    }

    /// Takes the next frame for this client.
    ///
    /// The non-blocking probe runs first so an immediate wait still drains
    /// a ready frame; only then does the timed wait start.
    pub(crate) fn get(&self, wait: Wait) -> Result<Frame, SplitterError> {
        if let Some(frame) = self.queue.try_pop() {
            return Ok(frame);
        }

        self.queue
            .wait_pop(wait)
            .ok_or(SplitterError::NoNewData)
    }

    /// Empties the queue, wakes its waiters and resets drop accounting.
    pub(crate) fn flush(&self) {
        trace!("client {}: flush", self.id);
        self.queue.flush();
        self.dropped.store(0, Ordering::Relaxed);
    }
}
