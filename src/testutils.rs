use simple_logger;
use std::collections::VecDeque;
use std::sync::Once;
use std::vec::Vec;

use super::error::{Error, Result};
use super::traits::Link;

static INIT: Once = Once::new();

pub fn setup_log() {
    INIT.call_once(|| {
        simple_logger::init().unwrap();
    });
}

/// A [`Link`] whose controller side plays back a pre-scripted byte stream.
///
/// Each `transfer` consumes one scripted byte as the received byte and
/// records the byte the responder shifted out, so tests can assert on the
/// heartbeat stream. Request-line edges are recorded as well. An empty
/// script behaves like a controller that stopped clocking: `transfer`
/// times out.
pub struct ScriptedLink {
    script: VecDeque<u8>,
    /// Bytes the responder clocked out, in order.
    pub sent: Vec<u8>,
    /// Request-line transitions, in order.
    pub request_edges: Vec<bool>,
}

impl ScriptedLink {
    pub fn new() -> Self {
        ScriptedLink {
            script: VecDeque::new(),
            sent: Vec::new(),
            request_edges: Vec::new(),
        }
    }

    /// Appends bytes the controller will clock at the responder.
    pub fn queue(&mut self, bytes: &[u8]) -> &mut Self {
        self.script.extend(bytes.iter().copied());
        self
    }

    /// Queues a message frame: the 0x20 header followed by the samples in
    /// native byte order.
    pub fn queue_samples(&mut self, samples: &[f32]) -> &mut Self {
        self.queue(&[0x20]);
        for sample in samples {
            self.queue(&sample.to_ne_bytes());
        }
        self
    }

    /// Queues a config frame via the 0x30 header path.
    pub fn queue_config(&mut self, data_type: u8, sample_count: u8) -> &mut Self {
        self.queue(&[0x30, data_type, sample_count, 0x00, 0x00])
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Link for ScriptedLink {
    fn transfer(&mut self, tx: u8) -> Result<u8> {
        match self.script.pop_front() {
            Some(rx) => {
                self.sent.push(tx);
                Ok(rx)
            }
            None => Err(Error::LinkTimeout),
        }
    }

    fn set_request(&mut self, asserted: bool) {
        self.request_edges.push(asserted);
    }
}
