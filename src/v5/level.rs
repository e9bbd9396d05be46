//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::Bytes;

use crate::v5::MResult;
use crate::v5::error::MalformedPacketError;
use crate::v5::error::malformed;
use crate::v5::write::WResult;
use crate::v5::write::WriteMqttPacket;

/// The protocol level byte of CONNECT; this codec speaks MQTT 5 only
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ProtocolLevel;

impl ProtocolLevel {
    pub const V5: u8 = 5;

    pub fn parse(input: &mut &Bytes) -> MResult<Self> {
        match winnow::binary::u8(input)? {
            Self::V5 => Ok(Self),
            _ => Err(malformed(input, MalformedPacketError::BadProtocolLevel)),
        }
    }

    pub fn binary_size() -> u32 {
        1
    }

    pub fn write<W: WriteMqttPacket>(buffer: &mut W) -> WResult<W> {
        buffer.write_byte(Self::V5)
    }
}
