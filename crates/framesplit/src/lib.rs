//! Framesplit - One-to-Many In-Memory Stream Splitter
//!
//! A single producer pushes reference-counted frames and every registered
//! client receives the complete sequence through its own bounded blocking
//! queue, paced at its own rate. A slow client never stalls the others
//! beyond the producer's per-client wait budget: once a bounded `put` runs
//! out of time against a full queue, the oldest buffered frame is traded
//! for the new one and the loss is reported back to the producer.
//!
//! # Key Features
//!
//! - Per-client bounded FIFO with timed push and timed pop
//! - Drop-oldest overflow policy with per-client drop accounting
//! - Zero-copy broadcast (frames are shared [`Bytes`](bytes::Bytes),
//!   payloads are never duplicated)
//! - Flush empties every buffer, releases every blocked producer and
//!   consumer, and leaves the splitter usable for the next round
//!
//! # Example
//!
//! ```
//! use framesplit::{Config, Frame, Splitter, Wait};
//!
//! let splitter = Splitter::new(Config::new(8, 4));
//! let client = splitter.add_client().unwrap();
//!
//! splitter.put(Frame::from_static(b"frame-0"), Wait::Immediate).unwrap();
//!
//! let frame = splitter.get(client, Wait::Immediate).unwrap();
//! assert_eq!(&frame[..], b"frame-0");
//! ```

mod client;
mod config;
mod error;
mod invariants;
mod queue;
mod splitter;
mod wait;

pub use client::ClientId;
pub use config::Config;
pub use error::{error_text, SplitterError, NO_ERROR};
pub use queue::BoundedQueue;
pub use splitter::{ClientStats, Splitter};
pub use wait::Wait;

/// Opaque, immutable, reference-counted frame payload.
///
/// Broadcasting a frame enqueues the same buffer into every client queue;
/// cloning only bumps the reference count. The payload is released when the
/// producer and the last holding queue drop their references.
pub type Frame = bytes::Bytes;
