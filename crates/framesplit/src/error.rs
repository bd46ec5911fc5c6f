//! Error codes for splitter operations.

use thiserror::Error;

/// The boundary code for a successful operation; `Ok(())` in the Rust API.
pub const NO_ERROR: i32 = 0;

/// Errors reported by splitter operations.
///
/// Every variant carries a stable integer code (see [`SplitterError::code`])
/// so outcomes survive foreign call boundaries unchanged. None of them put
/// the splitter into an unusable state; [`close`](crate::Splitter::close) is
/// the only terminal transition and it is caller-initiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[repr(i32)]
pub enum SplitterError {
    /// The registry already holds `max_clients` clients.
    #[error("max clients number has been reached")]
    MaxClientsReached = 1,

    /// At least one frame was discarded during the operation.
    ///
    /// The frame that triggered the report may still have been delivered;
    /// the code means "a frame was lost at some client", not "your frame
    /// was rejected".
    #[error("some data was dropped")]
    DataDropped = 2,

    /// All client buffers were emptied; the normal outcome of a flush.
    #[error("all data buffers were flushed")]
    DataFlushed = 3,

    /// The wait budget ran out before a frame arrived.
    #[error("no new data received")]
    NoNewData = 4,

    /// No client is registered under the requested id.
    #[error("the client with this id was not found")]
    NoClientFound = 5,

    /// The registry is empty; there is nobody to broadcast to.
    #[error("client list is empty")]
    NoClients = 6,
}

impl SplitterError {
    /// Stable integer code for this error.
    #[inline]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Decodes a boundary code. `0` (success) and unknown codes yield
    /// `None`.
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::MaxClientsReached),
            2 => Some(Self::DataDropped),
            3 => Some(Self::DataFlushed),
            4 => Some(Self::NoNewData),
            5 => Some(Self::NoClientFound),
            6 => Some(Self::NoClients),
            _ => None,
        }
    }

    /// `true` for outcomes the caller can tolerate and retry: an overflow
    /// drop or an exhausted wait.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::DataDropped | Self::NoNewData)
    }

    /// `true` for the informational drain code reported by flush and close.
    #[inline]
    pub fn is_drain(&self) -> bool {
        matches!(self, Self::DataFlushed)
    }
}

/// Human-readable text for a boundary error code.
///
/// `0` maps to the success text; codes outside the known range map to a
/// fixed fallback string.
pub fn error_text(code: i32) -> &'static str {
    match code {
        NO_ERROR => "No error",
        1 => "Max clients number has been reached.",
        2 => "Some data was dropped.",
        3 => "All data buffers were flushed.",
        4 => "No new data received.",
        5 => "The client with this ID was not found.",
        6 => "Clients list is empty.",
        _ => "Error not found",
    }
}
