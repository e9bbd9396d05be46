//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::Bytes;

use crate::v5::MResult;
use crate::v5::integers::parse_u16;
use crate::v5::write::WResult;
use crate::v5::write::WriteMqttPacket;

/// The identifier correlating a request packet with its acknowledgement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketIdentifier(pub u16);

impl PacketIdentifier {
    pub fn parse(input: &mut &Bytes) -> MResult<PacketIdentifier> {
        parse_u16(input).map(PacketIdentifier)
    }

    pub fn binary_size(&self) -> u32 {
        2
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        buffer.write_u16(self.0)
    }
}
