use log::debug;

use crate::traits::FrameBuffer;

/// Heartbeat counter value at power-up.
pub const HEARTBEAT_INIT: u8 = 0xFF;

// Header bytes recognized while awaiting a header. Everything else is
// reserved and ignored.
c_like_enum! {
  Header {
    Heartbeat = 0x10,
    Message = 0x20,
    Config = 0x30,
  }
}

/// Protocol state, advanced once per received byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Pre-handshake: every byte is payload, heartbeat runs backwards.
    Init,
    /// Steady-state idle: the next byte is a header.
    AwaitingHeader,
    /// Accumulating the 4-byte config frame.
    ReceivingConfig,
    /// Accumulating a message frame.
    ReceivingMessage,
}

/// The per-byte half of the protocol.
///
/// One `exchange` call corresponds to one clock burst: the received byte
/// goes in, the byte to preload for the *next* burst comes out. The engine
/// is the sole writer of the frame buffer, the write position and the
/// frame-ready flag; the foreground consumes completed frames through
/// [`take_frame`] and only resizes the buffer while no exchange is in
/// flight, which the `&mut` receiver already guarantees.
///
/// The returned byte is always the heartbeat counter. Its direction is the
/// only signal the controller has to tell a responder still in its init
/// sequence from one that is streaming: it counts down in [`LinkState::Init`]
/// and up everywhere else, wrapping mod 256.
///
/// [`take_frame`]: Engine::take_frame
pub struct Engine {
    state: LinkState,
    pos: usize,
    frame_ready: bool,
    heartbeat: u8,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            state: LinkState::Init,
            pos: 0,
            frame_ready: false,
            heartbeat: HEARTBEAT_INIT,
        }
    }
}

impl Engine {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Restarts raw accumulation from an empty frame. The handshake
    /// controller calls this before every sentinel/ack group so that 0xFF
    /// and 0x00 bytes are collected as payload instead of being dropped as
    /// unrecognized headers.
    pub fn enter_init(&mut self) {
        self.state = LinkState::Init;
        self.pos = 0;
        self.frame_ready = false;
    }

    /// True once a full frame has been accumulated since the last
    /// [`take_frame`].
    ///
    /// [`take_frame`]: Engine::take_frame
    pub fn frame_ready(&self) -> bool {
        self.frame_ready
    }

    /// Clears the frame-ready flag, returning whether it was set. The
    /// engine cannot signal another frame until a further full frame of
    /// exchanges has been clocked through.
    pub fn take_frame(&mut self) -> bool {
        core::mem::replace(&mut self.frame_ready, false)
    }

    /// Processes one received byte and returns the byte to preload for the
    /// next burst. Non-blocking and bounded-time; safe to call from the
    /// byte-clock event context.
    pub fn exchange(&mut self, byte: u8, buf: &mut dyn FrameBuffer) -> u8 {
        match self.state {
            LinkState::AwaitingHeader => match Header::from_u8(byte) {
                Some(Header::Heartbeat) | None => {}
                Some(Header::Message) => {
                    self.state = LinkState::ReceivingMessage;
                }
                Some(Header::Config) => {
                    debug!("config header received");
                    self.state = LinkState::ReceivingConfig;
                }
            },
            // Init, ReceivingConfig and ReceivingMessage all accumulate
            // payload the same way.
            _ => {
                buf.store(self.pos, byte);
                self.pos += 1;
                if self.pos == buf.frame_len() {
                    self.frame_ready = true;
                    self.pos = 0;
                    self.state = LinkState::AwaitingHeader;
                }
            }
        }

        // The heartbeat steps after the state transition, so the byte that
        // completes a frame already counts in the new direction.
        let tx = self.heartbeat;
        if self.state == LinkState::Init {
            self.heartbeat = self.heartbeat.wrapping_sub(1);
        } else {
            self.heartbeat = self.heartbeat.wrapping_add(1);
        }
        tx
    }
}

// ===========================================================================
//
// Tests
//
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::GenericFrameBuffer;
    use crate::testutils::setup_log;
    use crate::traits::FrameBuffer;
    use std::vec::Vec;
    use typenum::{U16, U512};

    fn streaming_engine() -> Engine {
        // Walk a fresh engine out of Init by letting its 4-byte probe
        // frame complete.
        let mut engine = Engine::new();
        let mut buf = GenericFrameBuffer::<U16>::new();
        for _ in 0..4 {
            engine.exchange(0x00, &mut buf);
        }
        assert!(engine.take_frame());
        assert_eq!(engine.state(), LinkState::AwaitingHeader);
        engine
    }

    #[test]
    fn heartbeat_header_is_a_no_op() {
        setup_log();
        let mut engine = streaming_engine();
        let mut buf = GenericFrameBuffer::<U16>::new();
        buf.store(0, 0xAB);

        engine.exchange(0x10, &mut buf);

        assert_eq!(engine.state(), LinkState::AwaitingHeader);
        assert!(!engine.frame_ready());
        assert_eq!(buf.data()[0], 0xAB);
    }

    #[test]
    fn reserved_headers_are_ignored() {
        setup_log();
        let mut engine = streaming_engine();
        let mut buf = GenericFrameBuffer::<U16>::new();

        for byte in &[0x00u8, 0x11, 0x2F, 0x40, 0xFF] {
            engine.exchange(*byte, &mut buf);
            assert_eq!(engine.state(), LinkState::AwaitingHeader);
            assert!(!engine.frame_ready());
        }
    }

    #[test]
    fn message_frame_completes_once() {
        setup_log();
        let mut engine = streaming_engine();
        let mut buf = GenericFrameBuffer::<U16>::new();
        buf.resize(12).unwrap();

        engine.exchange(0x20, &mut buf);
        assert_eq!(engine.state(), LinkState::ReceivingMessage);

        for i in 0..11 {
            engine.exchange(i as u8, &mut buf);
            assert!(!engine.frame_ready());
        }
        engine.exchange(11, &mut buf);

        assert!(engine.frame_ready());
        assert_eq!(engine.state(), LinkState::AwaitingHeader);
        assert!(engine.take_frame());
        assert!(!engine.frame_ready());
        let expected: Vec<u8> = (0..12).collect();
        assert_eq!(buf.data(), &expected[..]);
    }

    #[test]
    fn heartbeat_decrements_in_init_and_wraps() {
        setup_log();
        let mut engine = Engine::new();
        let mut buf = GenericFrameBuffer::<U512>::new();
        buf.resize(512).unwrap();

        let mut seen: Vec<u8> = Vec::new();
        for _ in 0..300 {
            seen.push(engine.exchange(0x55, &mut buf));
        }

        assert_eq!(seen[0], HEARTBEAT_INIT);
        for pair in seen.windows(2) {
            assert_eq!(pair[1], pair[0].wrapping_sub(1));
        }
        // 0x00 wraps back around to 0xFF.
        assert!(seen.contains(&0x00));
    }

    #[test]
    fn heartbeat_increments_while_streaming_and_wraps() {
        setup_log();
        let mut engine = streaming_engine();
        let mut buf = GenericFrameBuffer::<U16>::new();

        let mut seen: Vec<u8> = Vec::new();
        for _ in 0..300 {
            seen.push(engine.exchange(0x10, &mut buf));
        }

        for pair in seen.windows(2) {
            assert_eq!(pair[1], pair[0].wrapping_add(1));
        }
        assert!(seen.contains(&0xFF));
        assert!(seen.contains(&0x00));
    }

    #[test]
    fn heartbeat_flips_direction_on_the_frame_completing_byte() {
        setup_log();
        let mut engine = Engine::new();
        let mut buf = GenericFrameBuffer::<U16>::new();

        let mut seen: Vec<u8> = Vec::new();
        for _ in 0..4 {
            seen.push(engine.exchange(0xFF, &mut buf));
        }
        // Three decrements while still in Init, then the wrap into
        // AwaitingHeader makes the counter turn around.
        assert_eq!(seen, vec![0xFF, 0xFE, 0xFD, 0xFC]);
        seen.push(engine.exchange(0x10, &mut buf));
        assert_eq!(seen[4], 0xFD);
    }
}
