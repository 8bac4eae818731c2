use core::fmt;
use log::info;
use pretty_hex::*;

use crate::error::{Error, Result};

/// Backing storage for one wire frame.
///
/// The caller supplies the storage (and therefore the maximum frame size);
/// the protocol engine only ever writes within the currently active frame
/// length, which is 4 bytes during handshake/config probing and
/// `4 * sample_count` once the session is negotiated.
pub trait FrameBuffer {
    /// Returns the total capacity of the backing storage.
    fn capacity(&self) -> usize;

    /// Returns the active frame length.
    fn frame_len(&self) -> usize;

    /// Sets the active frame length. Implementations may assume
    /// `len <= capacity()`; checked resizing goes through [`resize`].
    ///
    /// [`resize`]: FrameBuffer::resize
    fn set_frame_len(&mut self, len: usize);

    /// Stores a byte at the given offset within the active frame.
    fn store(&mut self, idx: usize, byte: u8);

    /// Returns a slice of the active frame.
    fn data(&self) -> &[u8];

    /// Resizes the active frame, failing if the backing storage is too
    /// small. This replaces the free/realloc cycle of a growable buffer;
    /// the storage itself never moves.
    fn resize(&mut self, len: usize) -> Result<()> {
        if len > self.capacity() {
            return Err(Error::FrameTooLarge {
                needed: len,
                capacity: self.capacity(),
            });
        }
        self.set_frame_len(len);
        Ok(())
    }

    /// Zeroes the active frame.
    fn clear(&mut self) {
        for idx in 0..self.frame_len() {
            self.store(idx, 0);
        }
    }

    /// Dumps the active frame in a nice hexadecimal format.
    fn dump(&self) {
        info!("{:?}", self.data().hex_dump());
    }
}

impl fmt::Debug for dyn FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.data().hex_dump())
    }
}

/// Platform half of the byte-duplex link.
///
/// The responder never drives the clock. `transfer` loads the byte that
/// will be shifted out on the next controller-driven burst and completes
/// when that burst has happened, so every call is exactly one exchange:
/// one byte out, one byte in.
pub trait Link {
    /// Performs one exchange. Implementations are expected to bound the
    /// wait for the controller's clock and return [`Error::LinkTimeout`]
    /// rather than spinning forever; a bus fault maps to
    /// [`Error::LinkFailed`].
    fn transfer(&mut self, tx: u8) -> Result<u8>;

    /// Drives the out-of-band transfer-request line.
    fn set_request(&mut self, asserted: bool);

    /// Called once after the handshake acknowledgment, before config
    /// negotiation. Hardware that needs a settling delay between the two
    /// phases hooks it here; the default is a no-op.
    fn settle(&mut self) {}
}
