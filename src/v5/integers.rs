//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Various ways to parse MQTT integers
//!
//! All integers in MQTT are big-endian

use winnow::Bytes;
use winnow::Parser;
use winnow::combinator::trace;

use crate::v5::MResult;
use crate::v5::error::MalformedPacketError;
use crate::v5::error::MqttError;
use crate::v5::error::malformed;
use crate::v5::write::MqttWriteError;
use crate::v5::write::WResult;
use crate::v5::write::WriteMqttPacket;

/// Largest value a variable byte integer can hold
pub const VARIABLE_INTEGER_MAX: u32 = 268_435_455;

pub fn parse_u16(input: &mut &Bytes) -> MResult<u16> {
    trace(
        "mqtt_u16",
        winnow::binary::u16(winnow::binary::Endianness::Big),
    )
    .parse_next(input)
}

pub fn parse_u32(input: &mut &Bytes) -> MResult<u32> {
    trace(
        "mqtt_u32",
        winnow::binary::u32(winnow::binary::Endianness::Big),
    )
    .parse_next(input)
}

/// Decode a variable byte integer from the front of a plain byte slice
///
/// Returns the value and the number of bytes consumed, between 1 and 4.
/// Transports use this to size a frame before the whole frame has arrived,
/// so a truncated continuation run reports
/// [`NeedsMoreData`](MqttError::NeedsMoreData) rather than an error.
/// Four continuation bytes in a row and non-minimal encodings are malformed.
pub fn decode_variable_u32(buffer: &[u8]) -> Result<(u32, usize), MqttError> {
    let mut value: u32 = 0;

    for offset in 0..4 {
        let Some(&byte) = buffer.get(offset) else {
            return Err(MqttError::NeedsMoreData(core::num::NonZeroUsize::new(1)));
        };

        value |= u32::from(byte & 0b0111_1111) << (7 * offset);

        if byte & 0b1000_0000 == 0 {
            if byte == 0 && offset > 0 {
                // A trailing zero septet means a shorter encoding exists
                return Err(MqttError::Malformed(
                    MalformedPacketError::BadVariableInteger,
                ));
            }
            return Ok((value, offset + 1));
        }
    }

    Err(MqttError::Malformed(
        MalformedPacketError::BadVariableInteger,
    ))
}

/// Parse a variable sized integer
///
/// Value range: `0..=268_435_455`
/// The maximal value is smaller than a u32, so that type is used
pub fn parse_variable_u32(input: &mut &Bytes) -> MResult<u32> {
    trace("mqtt_variable_u32", |input: &mut &Bytes| {
        let remaining: &[u8] = *input;

        let (value, consumed) = match decode_variable_u32(remaining) {
            Ok(decoded) => decoded,
            // Streams handed to this parser hold a complete frame, so
            // running dry here means the remaining length lied.
            Err(MqttError::NeedsMoreData(_)) => {
                return Err(malformed(input, MalformedPacketError::LengthMismatch));
            }
            Err(_) => {
                return Err(malformed(input, MalformedPacketError::BadVariableInteger));
            }
        };

        let _ = winnow::token::take(consumed).parse_next(input)?;
        Ok(value)
    })
    .parse_next(input)
}

#[inline]
pub const fn variable_u32_binary_size(u: u32) -> u32 {
    match u {
        0..=127 => 1,
        128..=16_383 => 2,
        16_384..=2_097_151 => 3,
        2_097_152..=268_435_455 => 4,
        _size => unreachable!(),
    }
}

pub fn write_variable_u32<W: WriteMqttPacket>(buffer: &mut W, u: u32) -> WResult<W> {
    match u {
        0..=127 => {
            buffer.write_byte(u as u8)?;
        }
        len @ 128..=16_383 => {
            let first = (len % 128) | 0b1000_0000;
            let second = len / 128;
            buffer.write_byte(first as u8)?;
            buffer.write_byte(second as u8)?;
        }
        len @ 16_384..=2_097_151 => {
            let first = (len % 128) | 0b1000_0000;
            let second = ((len / 128) % 128) | 0b1000_0000;
            let third = len / (128 * 128);

            buffer.write_byte(first as u8)?;
            buffer.write_byte(second as u8)?;
            buffer.write_byte(third as u8)?;
        }
        len @ 2_097_152..=268_435_455 => {
            let first = (len % 128) | 0b1000_0000;
            let second = ((len / 128) % 128) | 0b1000_0000;
            let third = ((len / (128 * 128)) % 128) | 0b1000_0000;
            let fourth = len / (128 * 128 * 128);

            buffer.write_byte(first as u8)?;
            buffer.write_byte(second as u8)?;
            buffer.write_byte(third as u8)?;
            buffer.write_byte(fourth as u8)?;
        }
        _size => {
            return Err(MqttWriteError::Invariant.into());
        }
    }
    Ok(())
}
