//! Error types for the responder.

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

/// Every failure the responder can surface to the application layer.
///
/// The protocol itself never carries error information; all of these are
/// detected locally (bounded waits, config validation, checked accessors).
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Error {
    /// The link implementation gave up waiting for a controller clock burst.
    #[error("link timed out waiting for a clock burst")]
    LinkTimeout,

    /// The link implementation reported a bus fault.
    #[error("link transfer failed")]
    LinkFailed,

    /// Sentinel/ack sequence never converged within the attempt budget.
    #[error("handshake failed after {attempts} attempts")]
    HandshakeFailed { attempts: usize },

    /// A frame did not complete within the exchange budget.
    #[error("no complete frame after {exchanges} exchanges")]
    FrameTimeout { exchanges: usize },

    /// Config frame shorter than the fixed 4-byte layout.
    #[error("truncated config frame ({0} bytes)")]
    TruncatedConfig(usize),

    /// Config frame announced a payload encoding we do not speak.
    #[error("unsupported data type 0x{0:02x} in config frame")]
    UnsupportedDataType(u8),

    /// Config frame declared zero samples.
    #[error("config frame declared zero samples")]
    InvalidSampleCount,

    /// Negotiated frame does not fit the caller-supplied buffer.
    #[error("frame of {needed} bytes exceeds buffer capacity {capacity}")]
    FrameTooLarge { needed: usize, capacity: usize },

    /// Negotiated sample count does not fit the responder's sample storage.
    #[error("{count} samples exceed sample storage capacity {capacity}")]
    TooManySamples { count: usize, capacity: usize },

    /// `read` was called before a successful `begin`.
    #[error("session not negotiated")]
    NotNegotiated,

    /// Checked sample access outside the negotiated length.
    #[error("sample index {index} out of range for length {len}")]
    SampleIndex { index: usize, len: usize },
}
