#![no_std]

//! Peripheral-side driver for a controller-clocked, byte-duplex sample
//! stream. The responder performs the sentinel/ack handshake, negotiates
//! the frame format from a config frame, then exchanges fixed-size frames
//! of native-endian f32 samples, emitting a heartbeat byte on every
//! exchange. The platform supplies the raw byte-exchange primitive and the
//! request line through [`traits::Link`], and the frame storage through
//! [`traits::FrameBuffer`].

#[cfg(test)]
#[macro_use]
extern crate std;

use log::{debug, info, warn};
use pretty_hex::*;

#[macro_use]
pub mod macros;

pub mod config;
pub mod engine;
pub mod error;
pub mod storage;
pub mod traits;

#[cfg(test)]
mod testutils;

use generic_array::{ArrayLength, GenericArray};

use config::{ConfigDescriptor, CONFIG_FRAME_LEN};
use engine::Engine;
use error::{Error, Result};
use traits::{FrameBuffer, Link};

/// Four of these mark the start of handshake detection.
pub const SENTINEL: [u8; 4] = [0xFF; 4];

/// The controller acknowledges the responder's request with this frame.
pub const ACK: [u8; 4] = [0x00; 4];

/// Retry and wait budgets. The protocol itself has no timeouts, so every
/// wait in the driver is bounded by one of these and surfaces an error
/// instead of spinning forever.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// Full handshake restarts (sentinel collection through ack) before
    /// giving up.
    pub handshake_attempts: usize,
    /// 4-byte groups inspected per attempt while hunting for the sentinel.
    pub sentinel_groups: usize,
    /// Exchanges allowed for any single frame to complete.
    pub frame_exchanges: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            handshake_attempts: 8,
            sentinel_groups: 64,
            frame_exchanges: 4096,
        }
    }
}

/// The foreground half of the driver.
///
/// `N` is the sample-storage capacity; the controller may negotiate any
/// count up to it. A session runs `begin` once, then `read` per frame:
///
/// - `begin`: handshake (sentinel, ack) and config negotiation.
/// - `read`: request one frame and decode it into the sample array.
/// - `get`/`samples`/`len`: checked access to the decoded samples.
///
/// The responder owns the protocol engine exclusively, and the engine only
/// advances inside `begin`/`read` while the responder pumps the link. That
/// ownership is what makes the mid-session buffer resize safe: there is no
/// concurrent producer to quiesce.
pub struct Responder<N: ArrayLength<f32>> {
    engine: Engine,
    limits: Limits,
    /// Byte preloaded for the next burst; the first exchange of a session
    /// clocks out 0x00.
    tx: u8,
    samples: GenericArray<f32, N>,
    sample_count: usize,
}

impl<N: ArrayLength<f32>> Default for Responder<N> {
    fn default() -> Self {
        Self::with_limits(Limits::default())
    }
}

impl<N: ArrayLength<f32>> Responder<N> {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_limits(limits: Limits) -> Self {
        Self {
            engine: Engine::new(),
            limits,
            tx: 0x00,
            samples: GenericArray::default(),
            sample_count: 0,
        }
    }

    /// Returns the session to its pre-`begin` state.
    pub fn reset(&mut self) {
        self.engine = Engine::new();
        self.tx = 0x00;
        self.sample_count = 0;
    }

    /// Brings the link up: runs the handshake to convergence, then
    /// negotiates the frame format. On success the buffer's active frame
    /// is `4 * sample_count` bytes and `len()` reports the negotiated
    /// count.
    pub fn begin(&mut self, link: &mut dyn Link, buf: &mut dyn FrameBuffer) -> Result<()> {
        self.reset();
        buf.resize(CONFIG_FRAME_LEN)?;
        self.handshake(link, buf)?;
        link.settle();
        self.negotiate(link, buf)
    }

    /// Requests one frame and decodes it into the sample array.
    pub fn read(&mut self, link: &mut dyn Link, buf: &mut dyn FrameBuffer) -> Result<()> {
        if self.sample_count == 0 {
            return Err(Error::NotNegotiated);
        }
        self.request_frame(link, buf)?;
        for (idx, word) in buf
            .data()
            .chunks_exact(4)
            .take(self.sample_count)
            .enumerate()
        {
            self.samples[idx] = f32::from_ne_bytes([word[0], word[1], word[2], word[3]]);
        }
        Ok(())
    }

    /// Number of samples per frame, as negotiated.
    pub fn len(&self) -> usize {
        self.sample_count
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count == 0
    }

    /// Returns the idx'th sample from the most recent frame.
    pub fn get(&self, index: usize) -> Result<f32> {
        if index < self.sample_count {
            Ok(self.samples[index])
        } else {
            Err(Error::SampleIndex {
                index,
                len: self.sample_count,
            })
        }
    }

    /// The most recent frame's samples as a slice.
    pub fn samples(&self) -> &[f32] {
        &self.samples[..self.sample_count]
    }

    fn handshake(&mut self, link: &mut dyn Link, buf: &mut dyn FrameBuffer) -> Result<()> {
        let attempts = self.limits.handshake_attempts;
        for attempt in 1..=attempts {
            match self.handshake_once(link, buf) {
                Ok(true) => {
                    info!("handshake complete after {} attempt(s)", attempt);
                    return Ok(());
                }
                Ok(false) => {
                    warn!("handshake ack mismatch on attempt {}, restarting", attempt);
                }
                Err(Error::LinkTimeout) | Err(Error::FrameTimeout { .. }) => {
                    warn!("handshake timed out on attempt {}, restarting", attempt);
                }
                Err(e) => return Err(e),
            }
        }
        Err(Error::HandshakeFailed { attempts })
    }

    /// One full sentinel-through-ack pass. `Ok(false)` means the ack did
    /// not match (or the sentinel never showed) and the whole sequence
    /// should restart.
    fn handshake_once(
        &mut self,
        link: &mut dyn Link,
        buf: &mut dyn FrameBuffer,
    ) -> Result<bool> {
        let mut matched = false;
        self.engine.enter_init();
        buf.clear();
        for _ in 0..self.limits.sentinel_groups {
            self.await_frame(link, buf)?;
            if buf.data() == &SENTINEL[..] {
                matched = true;
                break;
            }
            // Discard the group and restart sentinel collection from
            // empty; the init state keeps accumulating raw bytes.
            debug!("discarding non-sentinel group {:?}", buf.data().hex_dump());
            buf.clear();
            self.engine.enter_init();
        }
        if !matched {
            return Ok(false);
        }

        info!("sentinel observed, requesting ack");
        self.engine.enter_init();
        buf.clear();
        self.request_frame(link, buf)?;
        Ok(buf.data() == &ACK[..])
    }

    /// Requests the config frame via the 0x30 header path and resizes the
    /// frame buffer for steady-state streaming.
    fn negotiate(&mut self, link: &mut dyn Link, buf: &mut dyn FrameBuffer) -> Result<()> {
        buf.resize(CONFIG_FRAME_LEN)?;
        self.request_frame(link, buf)?;
        let desc = ConfigDescriptor::parse(buf.data())?;

        let count = desc.sample_count as usize;
        if count > N::to_usize() {
            return Err(Error::TooManySamples {
                count,
                capacity: N::to_usize(),
            });
        }
        // The engine is idle between exchanges, so the resize cannot race
        // a payload write.
        buf.resize(desc.message_len())?;
        self.sample_count = count;
        info!(
            "negotiated {} samples ({} byte frames)",
            count,
            desc.message_len()
        );
        Ok(())
    }

    /// Asserts the request line, pumps the link until the frame completes,
    /// then deasserts the line whether or not the wait succeeded.
    fn request_frame(&mut self, link: &mut dyn Link, buf: &mut dyn FrameBuffer) -> Result<()> {
        link.set_request(true);
        let result = self.await_frame(link, buf);
        link.set_request(false);
        result
    }

    /// Pumps exchanges until the engine signals a complete frame, bounded
    /// by the exchange budget.
    fn await_frame(&mut self, link: &mut dyn Link, buf: &mut dyn FrameBuffer) -> Result<()> {
        let budget = self.limits.frame_exchanges;
        for _ in 0..budget {
            let rx = link.transfer(self.tx)?;
            self.tx = self.engine.exchange(rx, buf);
            if self.engine.take_frame() {
                return Ok(());
            }
        }
        Err(Error::FrameTimeout { exchanges: budget })
    }
}

// ===========================================================================
//
// Tests
//
// ===========================================================================
