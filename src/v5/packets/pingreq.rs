//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::Bytes;
use winnow::Parser;

use crate::v5::MResult;
use crate::v5::write::WResult;
use crate::v5::write::WriteMqttPacket;

/// The PINGREQ packet; its frame is always exactly `[0xC0, 0x00]`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MPingreq;

impl MPingreq {
    pub fn parse(input: &mut &Bytes) -> MResult<MPingreq> {
        winnow::combinator::trace("MPingreq", winnow::combinator::eof.map(|_| Self))
            .parse_next(input)
    }

    pub fn binary_size(&self) -> u32 {
        0
    }

    pub fn write<W: WriteMqttPacket>(&self, _buffer: &mut W) -> WResult<W> {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::v5::packets::MqttPacket;
    use crate::v5::packets::pingreq::MPingreq;
    use crate::v5::storage::Owning;
    use crate::v5::test::TestWriter;

    #[test]
    fn test_roundtrip_pingreq() {
        let mut writer = TestWriter { buffer: Vec::new() };
        let instance = MPingreq;
        instance.write(&mut writer).unwrap();
        let output = MPingreq::parse(&mut winnow::Bytes::new(&writer.buffer)).unwrap();
        assert_eq!(instance, output);
    }

    #[test]
    fn test_pingreq_frame_bytes() {
        let packet = MqttPacket::<Owning>::Pingreq(MPingreq);
        let mut writer = TestWriter { buffer: Vec::new() };

        packet.write(&mut writer).unwrap();
        assert_eq!(writer.buffer, &[0xC0, 0x00]);
    }

    #[test]
    fn test_pingreq_rejects_payload() {
        MPingreq::parse(&mut winnow::Bytes::new(&[0x12])).unwrap_err();
    }
}
