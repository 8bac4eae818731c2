use core::cmp::min;

use generic_array::{ArrayLength, GenericArray};

use crate::traits::FrameBuffer;

/// Session-start frame length, used for handshake groups and the config
/// probe before the real frame size is known.
pub const PROBE_FRAME_LEN: usize = 4;

/// A [`FrameBuffer`] backed by a fixed, caller-sized array.
///
/// `N` bounds the largest negotiable frame (`4 * sample_count` bytes), so
/// it should be at least four times the largest sample count the
/// application expects. The active frame length starts at
/// [`PROBE_FRAME_LEN`].
pub struct GenericFrameBuffer<N: ArrayLength<u8>> {
    len: usize,
    buf: GenericArray<u8, N>,
}

impl<N: ArrayLength<u8>> Default for GenericFrameBuffer<N> {
    fn default() -> Self {
        Self {
            len: min(PROBE_FRAME_LEN, N::to_usize()),
            buf: GenericArray::default(),
        }
    }
}

impl<N: ArrayLength<u8>> GenericFrameBuffer<N> {
    pub fn new() -> Self {
        Default::default()
    }
}

impl<N: ArrayLength<u8>> FrameBuffer for GenericFrameBuffer<N> {
    fn capacity(&self) -> usize {
        N::to_usize()
    }

    fn frame_len(&self) -> usize {
        self.len
    }

    fn set_frame_len(&mut self, len: usize) {
        self.len = min(len, N::to_usize());
    }

    fn store(&mut self, idx: usize, byte: u8) {
        self.buf[idx] = byte;
    }

    fn data(&self) -> &[u8] {
        &self.buf[0..self.len]
    }
}

// ===========================================================================
//
// Tests
//
// ===========================================================================
