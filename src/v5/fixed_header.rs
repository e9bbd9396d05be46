//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Everything around parsing the fixed MQTT Header

use winnow::Bytes;
use winnow::Parser;
use winnow::combinator::trace;

use crate::v5::MResult;
use crate::v5::error::MalformedPacketError;
use crate::v5::error::MqttError;
use crate::v5::error::malformed;
use crate::v5::integers::decode_variable_u32;
use crate::v5::qos::QualityOfService;
use crate::v5::write::WResult;
use crate::v5::write::WriteMqttPacket;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PacketType {
    Connect,
    Connack,
    Publish {
        dup: bool,
        qos: QualityOfService,
        retain: bool,
    },
    Puback,
    Pubrec,
    Pubrel,
    Pubcomp,
    Subscribe,
    Suback,
    Unsubscribe,
    Unsuback,
    Pingreq,
    Pingresp,
    Disconnect,
    Auth,
}

impl PacketType {
    /// Decode the type/flags byte of a fixed header
    ///
    /// Twelve packet types require a fixed reserved flag nibble which is
    /// verified here; PUBLISH carries its DUP/QoS/RETAIN flags in the
    /// nibble, and type 0 never appears on a healthy wire.
    pub fn from_byte(byte: u8) -> Result<PacketType, MalformedPacketError> {
        let packet_type = match (byte >> 4, byte & 0x0F) {
            (0, _) => return Err(MalformedPacketError::ReservedPacketType),
            (1, 0) => PacketType::Connect,
            (2, 0) => PacketType::Connack,
            (3, flags) => PacketType::Publish {
                dup: (0b1000 & flags) != 0,
                qos: QualityOfService::try_from((flags & 0b0110) >> 1)
                    .map_err(|_| MalformedPacketError::BadQualityOfService)?,
                retain: (0b0001 & flags) != 0,
            },
            (4, 0) => PacketType::Puback,
            (5, 0) => PacketType::Pubrec,
            (6, 0b0010) => PacketType::Pubrel,
            (7, 0) => PacketType::Pubcomp,
            (8, 0b0010) => PacketType::Subscribe,
            (9, 0) => PacketType::Suback,
            (10, 0b0010) => PacketType::Unsubscribe,
            (11, 0) => PacketType::Unsuback,
            (12, 0) => PacketType::Pingreq,
            (13, 0) => PacketType::Pingresp,
            (14, 0) => PacketType::Disconnect,
            (15, 0) => PacketType::Auth,
            _ => return Err(MalformedPacketError::ReservedBitsSet),
        };

        Ok(packet_type)
    }

    pub fn to_byte(self) -> u8 {
        #[allow(clippy::identity_op)]
        match self {
            PacketType::Connect => (1 << 4) | 0,
            PacketType::Connack => (2 << 4) | 0,
            PacketType::Publish { dup, qos, retain } => {
                let upper = 3 << 4;
                let lower = {
                    let dup = (dup as u8) << 3;
                    let qos = u8::from(qos) << 1;
                    let retain = retain as u8;

                    dup | qos | retain
                };

                upper | lower
            }
            PacketType::Puback => (4 << 4) | 0,
            PacketType::Pubrec => (5 << 4) | 0,
            PacketType::Pubrel => (6 << 4) | 0b0010,
            PacketType::Pubcomp => (7 << 4) | 0,
            PacketType::Subscribe => (8 << 4) | 0b0010,
            PacketType::Suback => (9 << 4) | 0,
            PacketType::Unsubscribe => (10 << 4) | 0b0010,
            PacketType::Unsuback => (11 << 4) | 0,
            PacketType::Pingreq => (12 << 4) | 0,
            PacketType::Pingresp => (13 << 4) | 0,
            PacketType::Disconnect => (14 << 4) | 0,
            PacketType::Auth => (15 << 4) | 0,
        }
    }

    /// The wire number of this packet type, 1 through 15
    pub const fn number(self) -> u8 {
        match self {
            PacketType::Connect => 1,
            PacketType::Connack => 2,
            PacketType::Publish { .. } => 3,
            PacketType::Puback => 4,
            PacketType::Pubrec => 5,
            PacketType::Pubrel => 6,
            PacketType::Pubcomp => 7,
            PacketType::Subscribe => 8,
            PacketType::Suback => 9,
            PacketType::Unsubscribe => 10,
            PacketType::Unsuback => 11,
            PacketType::Pingreq => 12,
            PacketType::Pingresp => 13,
            PacketType::Disconnect => 14,
            PacketType::Auth => 15,
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct MFixedHeader {
    pub packet_type: PacketType,
}

impl MFixedHeader {
    pub fn parse(input: &mut &Bytes) -> MResult<MFixedHeader> {
        trace("MFixedHeader", |input: &mut &Bytes| {
            let byte = winnow::binary::u8(input)?;
            let packet_type =
                PacketType::from_byte(byte).map_err(|kind| malformed(input, kind))?;

            Ok(MFixedHeader { packet_type })
        })
        .parse_next(input)
    }

    pub fn binary_size() -> u32 {
        1
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        buffer.write_byte(self.packet_type.to_byte())
    }
}

/// Inspect the start of a frame and report its type and total length
///
/// Transports call this on a growing receive buffer until it stops asking
/// for more data, then hand the full frame to
/// [`MqttPacket::parse_complete`](crate::v5::packets::MqttPacket::parse_complete).
/// The returned length covers the fixed header byte, the remaining-length
/// integer and the remaining length itself.
pub fn check_header(buffer: &[u8]) -> Result<(PacketType, usize), MqttError> {
    if buffer.len() < 2 {
        return Err(MqttError::NeedsMoreData(core::num::NonZeroUsize::new(
            2 - buffer.len(),
        )));
    }

    let packet_type = PacketType::from_byte(buffer[0])?;
    let (remaining_length, consumed) = decode_variable_u32(&buffer[1..])?;

    Ok((packet_type, 1 + consumed + remaining_length as usize))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use winnow::Bytes;

    use crate::v5::error::MalformedPacketError;
    use crate::v5::error::MqttError;
    use crate::v5::fixed_header::MFixedHeader;
    use crate::v5::fixed_header::PacketType;
    use crate::v5::fixed_header::check_header;

    #[test]
    fn check_fixed_header() {
        let input = &[0b0011_1010];

        assert_eq!(
            MFixedHeader::parse(&mut Bytes::new(&input)).unwrap(),
            MFixedHeader {
                packet_type: PacketType::Publish {
                    dup: true,
                    qos: crate::v5::qos::QualityOfService::AtLeastOnce,
                    retain: false
                },
            }
        )
    }

    #[test]
    fn check_header_sizes_frames() {
        assert_eq!(
            check_header(&[0xC0, 0x00]).unwrap(),
            (PacketType::Pingreq, 2)
        );
        assert_eq!(
            check_header(&[0x30, 0x08, 0x00]).unwrap(),
            (
                PacketType::Publish {
                    dup: false,
                    qos: crate::v5::qos::QualityOfService::AtMostOnce,
                    retain: false
                },
                10
            )
        );
        // A two-byte remaining length moves the payload out by one
        assert_eq!(
            check_header(&[0x20, 0x80, 0x01]).unwrap(),
            (PacketType::Connack, 131)
        );
    }

    #[test]
    fn check_header_needs_at_least_two_bytes() {
        assert_eq!(
            check_header(&[0x10]),
            Err(MqttError::NeedsMoreData(core::num::NonZeroUsize::new(1)))
        );
        assert_eq!(
            check_header(&[0x10, 0x80]),
            Err(MqttError::NeedsMoreData(core::num::NonZeroUsize::new(1)))
        );
    }

    #[test]
    fn check_header_rejects_reserved_flag_bits() {
        // CONNECT carries a reserved flag nibble of zero
        assert_eq!(
            check_header(&[0x12, 0x00]),
            Err(MqttError::Malformed(MalformedPacketError::ReservedBitsSet))
        );
    }

    #[test]
    fn check_header_rejects_packet_type_zero() {
        assert_eq!(
            check_header(&[0x02, 0x00]),
            Err(MqttError::Malformed(
                MalformedPacketError::ReservedPacketType
            ))
        );
    }
}
