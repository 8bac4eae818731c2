use crate::error::{Error, Result};

/// Fixed size of the config frame (and of every pre-negotiation frame).
pub const CONFIG_FRAME_LEN: usize = 4;

// Payload encodings the controller can announce. Only 32-bit floats are
// spoken today; anything else is rejected during negotiation instead of
// being streamed into a misinterpreted buffer.
c_like_enum! {
  DataType {
    Float = 0x01,
  }
}

/// Decoded form of the 4-byte config frame
/// `{data_type, sample_count, reserved, reserved}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigDescriptor {
    pub data_type: DataType,
    pub sample_count: u8,
}

impl ConfigDescriptor {
    /// Parses a config frame. The two reserved trailing bytes are not
    /// inspected.
    pub fn parse(frame: &[u8]) -> Result<Self> {
        if frame.len() < CONFIG_FRAME_LEN {
            return Err(Error::TruncatedConfig(frame.len()));
        }
        let data_type =
            DataType::from_u8(frame[0]).ok_or(Error::UnsupportedDataType(frame[0]))?;
        if frame[1] == 0 {
            return Err(Error::InvalidSampleCount);
        }
        Ok(Self {
            data_type,
            sample_count: frame[1],
        })
    }

    /// Length in bytes of one steady-state message frame: four bytes per
    /// sample.
    pub fn message_len(&self) -> usize {
        self.sample_count as usize * 4
    }
}

// ===========================================================================
//
// Tests
//
// ===========================================================================
