//! Drives a full responder session against a simulated controller: the
//! handshake, config negotiation, then a few frames of generated samples.

use std::collections::VecDeque;

use structopt::StructOpt;

use spi_sample_responder::error::Result;
use spi_sample_responder::storage::GenericFrameBuffer;
use spi_sample_responder::traits::Link;
use spi_sample_responder::{Responder, ACK};

#[derive(StructOpt, Debug)]
#[structopt(name = "loopback")]
struct Opt {
    /// Samples per frame the controller announces
    #[structopt(short, long, default_value = "8")]
    samples: u8,

    /// Number of frames to stream
    #[structopt(short, long, default_value = "5")]
    frames: u32,

    /// Turn on verbose messages
    #[structopt(short, long)]
    verbose: bool,
}

#[derive(PartialEq)]
enum Phase {
    Handshake,
    Config,
    Streaming,
}

/// The controller side of the link, run inline: it spams the sentinel
/// until the responder requests the ack, answers the next request with the
/// config frame, and serves a frame of generated samples for every request
/// after that.
struct SimController {
    phase: Phase,
    queue: VecDeque<u8>,
    sample_count: u8,
    t: f32,
}

impl SimController {
    fn new(sample_count: u8) -> Self {
        Self {
            phase: Phase::Handshake,
            queue: VecDeque::new(),
            sample_count,
            t: 0.0,
        }
    }

    fn queue_frame(&mut self) {
        self.queue.push_back(0x20);
        for _ in 0..self.sample_count {
            self.queue.extend(self.t.sin().to_ne_bytes().iter());
            self.t += 0.1;
        }
    }
}

impl Link for SimController {
    fn transfer(&mut self, _tx: u8) -> Result<u8> {
        if let Some(byte) = self.queue.pop_front() {
            return Ok(byte);
        }
        // Idle controller behavior: sentinel bytes before the handshake,
        // heartbeat headers afterwards.
        match self.phase {
            Phase::Handshake => Ok(0xFF),
            _ => Ok(0x10),
        }
    }

    fn set_request(&mut self, asserted: bool) {
        if !asserted {
            return;
        }
        match self.phase {
            Phase::Handshake => {
                self.queue.extend(ACK.iter());
                self.phase = Phase::Config;
            }
            Phase::Config => {
                self.queue
                    .extend([0x30, 0x01, self.sample_count, 0x00, 0x00].iter());
                self.phase = Phase::Streaming;
            }
            Phase::Streaming => self.queue_frame(),
        }
    }
}

fn main() {
    let opt = Opt::from_args();

    if opt.verbose {
        simple_logger::init().unwrap();
        println!("{:#?}", opt);
    }

    let mut controller = SimController::new(opt.samples);
    let mut buf = GenericFrameBuffer::<typenum::U1024>::new();
    let mut responder = Responder::<typenum::U255>::new();

    responder
        .begin(&mut controller, &mut buf)
        .expect("session bring-up failed");
    println!("negotiated {} samples per frame", responder.len());

    for frame in 0..opt.frames {
        responder
            .read(&mut controller, &mut buf)
            .expect("frame read failed");
        println!("frame {}: {:?}", frame, responder.samples());
    }
}
