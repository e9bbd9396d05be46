//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

pub type WResult<W> = core::result::Result<(), <W as WriteMqttPacket>::Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MqttWriteError {
    #[error("a packet field exceeds its wire-format range")]
    Invariant,
    #[error("the output buffer is too small")]
    BufferTooSmall,
}

/// A byte sink packets are written into
///
/// All multi-byte scalars go out big-endian, as MQTT requires.
pub trait WriteMqttPacket {
    type Error: From<MqttWriteError>;

    fn write_byte(&mut self, u: u8) -> WResult<Self>;
    fn write_slice(&mut self, u: &[u8]) -> WResult<Self>;

    #[inline]
    fn write_u16(&mut self, u: u16) -> WResult<Self> {
        self.write_byte((u >> 8) as u8)?;
        self.write_byte(u as u8)
    }

    #[inline]
    fn write_u32(&mut self, u: u32) -> WResult<Self> {
        self.write_byte((u >> 24) as u8)?;
        self.write_byte((u >> 16) as u8)?;
        self.write_byte((u >> 8) as u8)?;
        self.write_byte(u as u8)
    }
}

/// A writer over a caller-provided byte slice
///
/// Fails with [`MqttWriteError::BufferTooSmall`] instead of growing.
#[derive(Debug)]
pub struct SliceWriter<'a> {
    buffer: &'a mut [u8],
    offset: usize,
}

impl<'a> SliceWriter<'a> {
    pub fn new(buffer: &'a mut [u8]) -> SliceWriter<'a> {
        SliceWriter { buffer, offset: 0 }
    }

    /// Number of bytes written so far
    pub fn written(&self) -> usize {
        self.offset
    }
}

impl WriteMqttPacket for SliceWriter<'_> {
    type Error = MqttWriteError;

    fn write_byte(&mut self, u: u8) -> WResult<Self> {
        let Some(slot) = self.buffer.get_mut(self.offset) else {
            return Err(MqttWriteError::BufferTooSmall);
        };
        *slot = u;
        self.offset += 1;
        Ok(())
    }

    fn write_slice(&mut self, u: &[u8]) -> WResult<Self> {
        let end = self.offset + u.len();
        let Some(destination) = self.buffer.get_mut(self.offset..end) else {
            return Err(MqttWriteError::BufferTooSmall);
        };
        destination.copy_from_slice(u);
        self.offset = end;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::v5::write::MqttWriteError;
    use crate::v5::write::SliceWriter;
    use crate::v5::write::WriteMqttPacket;

    #[test]
    fn test_slice_writer_stays_in_bounds() {
        let mut buffer = [0u8; 3];
        let mut writer = SliceWriter::new(&mut buffer);

        writer.write_u16(0x1234).unwrap();
        writer.write_byte(0x56).unwrap();
        assert_eq!(writer.write_byte(0x78), Err(MqttWriteError::BufferTooSmall));
        assert_eq!(writer.written(), 3);

        assert_eq!(buffer, [0x12, 0x34, 0x56]);
    }

    #[test]
    fn test_slice_writer_rejects_oversized_slice() {
        let mut buffer = [0u8; 2];
        let mut writer = SliceWriter::new(&mut buffer);

        assert_eq!(
            writer.write_slice(&[1, 2, 3]),
            Err(MqttWriteError::BufferTooSmall)
        );
    }
}
