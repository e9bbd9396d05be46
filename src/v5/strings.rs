//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Length-prefixed MQTT strings

use winnow::Bytes;
use winnow::Parser;
use winnow::binary::length_take;
use winnow::combinator::trace;

use crate::v5::MResult;
use crate::v5::error::MalformedPacketError;
use crate::v5::error::malformed;
use crate::v5::integers::parse_u16;
use crate::v5::write::MqttWriteError;
use crate::v5::write::WResult;
use crate::v5::write::WriteMqttPacket;

pub fn parse_string<'i>(input: &mut &'i Bytes) -> MResult<&'i str> {
    trace("mqtt_string", |input: &mut &'i Bytes| {
        let maybe_str = length_take(parse_u16).parse_next(input)?;

        core::str::from_utf8(maybe_str)
            .map_err(|_| malformed(input, MalformedPacketError::BadString))
    })
    .parse_next(input)
}

/// Parse a key/value string pair, as used by the User Property
pub fn parse_string_pair<'i>(input: &mut &'i Bytes) -> MResult<(&'i str, &'i str)> {
    let first = parse_string(input)?;
    let second = parse_string(input)?;

    Ok((first, second))
}

pub fn write_string<W: WriteMqttPacket>(buffer: &mut W, s: &str) -> WResult<W> {
    let length = s
        .len()
        .try_into()
        .map_err(|_| W::Error::from(MqttWriteError::Invariant))?;

    buffer.write_u16(length)?;
    buffer.write_slice(s.as_bytes())
}

#[inline]
pub fn string_binary_size(s: &str) -> u32 {
    2 + s.len() as u32
}
