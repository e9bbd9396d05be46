//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::Bytes;
use winnow::Parser;
use winnow::combinator::trace;

use self::auth::MAuth;
use self::connack::MConnack;
use self::connect::MConnect;
use self::disconnect::MDisconnect;
use self::pingreq::MPingreq;
use self::pingresp::MPingresp;
use self::puback::MPuback;
use self::pubcomp::MPubcomp;
use self::publish::MPublish;
use self::pubrec::MPubrec;
use self::pubrel::MPubrel;
use self::suback::MSuback;
use self::subscribe::MSubscribe;
use self::unsuback::MUnsuback;
use self::unsubscribe::MUnsubscribe;
use crate::v5::MResult;
use crate::v5::error::MalformedPacketError;
use crate::v5::error::MqttError;
use crate::v5::error::ValidationError;
use crate::v5::error::malformed;
use crate::v5::fixed_header::MFixedHeader;
use crate::v5::fixed_header::PacketType;
use crate::v5::fixed_header::check_header;
use crate::v5::integers::VARIABLE_INTEGER_MAX;
use crate::v5::integers::parse_variable_u32;
use crate::v5::integers::variable_u32_binary_size;
use crate::v5::integers::write_variable_u32;
use crate::v5::storage::Borrowing;
use crate::v5::storage::MqttStorage;
use crate::v5::storage::Owning;
use crate::v5::storage::ParseStorage;
use crate::v5::write::SliceWriter;
use crate::v5::write::WResult;
use crate::v5::write::WriteMqttPacket;

pub mod auth;
pub mod connack;
pub mod connect;
pub mod disconnect;
pub mod pingreq;
pub mod pingresp;
pub mod puback;
pub mod pubcomp;
pub mod publish;
pub mod pubrec;
pub mod pubrel;
pub mod suback;
pub mod subscribe;
pub mod unsuback;
pub mod unsubscribe;

/// Any MQTT v5.0 control packet
#[derive(Debug, Clone, PartialEq)]
pub enum MqttPacket<S: MqttStorage> {
    Auth(MAuth<S>),
    Connack(MConnack<S>),
    Connect(MConnect<S>),
    Disconnect(MDisconnect<S>),
    Pingreq(MPingreq),
    Pingresp(MPingresp),
    Puback(MPuback<S>),
    Pubcomp(MPubcomp<S>),
    Publish(MPublish<S>),
    Pubrec(MPubrec<S>),
    Pubrel(MPubrel<S>),
    Suback(MSuback<S>),
    Subscribe(MSubscribe<S>),
    Unsuback(MUnsuback<S>),
    Unsubscribe(MUnsubscribe<S>),
}

/// A packet that owns all of its strings and buffers
pub type OwnedMqttPacket = MqttPacket<Owning>;

/// A packet whose strings and buffers point into the parsed input
pub type MqttPacketView<'i> = MqttPacket<Borrowing<'i>>;

impl<S: MqttStorage> MqttPacket<S> {
    /// Parse one whole control packet from the front of a stream
    ///
    /// The stream must hold the complete frame; use
    /// [`check_header`] or [`MqttPacket::parse_complete`] to make sure it
    /// does.
    pub fn parse<'i>(input: &mut &'i Bytes) -> MResult<MqttPacket<S>>
    where
        S: ParseStorage<'i>,
    {
        trace("MqttPacket", |input: &mut &'i Bytes| {
            let fixed_header = MFixedHeader::parse(input)?;
            let raw = winnow::binary::length_take(parse_variable_u32).parse_next(input)?;
            let mut frame: &'i Bytes = Bytes::new(raw);

            let packet = match fixed_header.packet_type {
                PacketType::Connect => MConnect::parse(&mut frame).map(MqttPacket::from)?,
                PacketType::Connack => MConnack::parse(&mut frame).map(MqttPacket::from)?,
                PacketType::Publish { dup, qos, retain } => {
                    MPublish::parse(dup, qos, retain, &mut frame).map(MqttPacket::from)?
                }
                PacketType::Puback => MPuback::parse(&mut frame).map(MqttPacket::from)?,
                PacketType::Pubrec => MPubrec::parse(&mut frame).map(MqttPacket::from)?,
                PacketType::Pubrel => MPubrel::parse(&mut frame).map(MqttPacket::from)?,
                PacketType::Pubcomp => MPubcomp::parse(&mut frame).map(MqttPacket::from)?,
                PacketType::Subscribe => MSubscribe::parse(&mut frame).map(MqttPacket::from)?,
                PacketType::Suback => MSuback::parse(&mut frame).map(MqttPacket::from)?,
                PacketType::Unsubscribe => {
                    MUnsubscribe::parse(&mut frame).map(MqttPacket::from)?
                }
                PacketType::Unsuback => MUnsuback::parse(&mut frame).map(MqttPacket::from)?,
                PacketType::Pingreq => MPingreq::parse(&mut frame).map(MqttPacket::from)?,
                PacketType::Pingresp => MPingresp::parse(&mut frame).map(MqttPacket::from)?,
                PacketType::Disconnect => MDisconnect::parse(&mut frame).map(MqttPacket::from)?,
                PacketType::Auth => MAuth::parse(&mut frame).map(MqttPacket::from)?,
            };

            if !frame.is_empty() {
                return Err(malformed(&frame, MalformedPacketError::LengthMismatch));
            }

            Ok(packet)
        })
        .parse_next(input)
    }

    /// The three-way entry point over a plain receive buffer
    ///
    /// Returns the packet and the number of bytes it occupied, or
    /// [`MqttError::NeedsMoreData`] while the frame is still incomplete, or
    /// [`MqttError::Malformed`] if the bytes cannot be a packet. Bytes after
    /// the frame are left untouched for the next call.
    pub fn parse_complete<'i>(buffer: &'i [u8]) -> Result<(MqttPacket<S>, usize), MqttError>
    where
        S: ParseStorage<'i>,
    {
        let (_, frame_length) = check_header(buffer)?;
        if buffer.len() < frame_length {
            return Err(MqttError::NeedsMoreData(core::num::NonZeroUsize::new(
                frame_length - buffer.len(),
            )));
        }

        let mut input: &Bytes = Bytes::new(&buffer[..frame_length]);
        let packet = MqttPacket::parse(&mut input)?;

        Ok((packet, frame_length))
    }

    pub fn packet_type(&self) -> PacketType {
        match self {
            MqttPacket::Auth(_) => PacketType::Auth,
            MqttPacket::Connack(_) => PacketType::Connack,
            MqttPacket::Connect(_) => PacketType::Connect,
            MqttPacket::Disconnect(_) => PacketType::Disconnect,
            MqttPacket::Pingreq(_) => PacketType::Pingreq,
            MqttPacket::Pingresp(_) => PacketType::Pingresp,
            MqttPacket::Puback(_) => PacketType::Puback,
            MqttPacket::Pubcomp(_) => PacketType::Pubcomp,
            MqttPacket::Publish(publish) => PacketType::Publish {
                dup: publish.dup,
                qos: publish.quality_of_service,
                retain: publish.retain,
            },
            MqttPacket::Pubrec(_) => PacketType::Pubrec,
            MqttPacket::Pubrel(_) => PacketType::Pubrel,
            MqttPacket::Suback(_) => PacketType::Suback,
            MqttPacket::Subscribe(_) => PacketType::Subscribe,
            MqttPacket::Unsuback(_) => PacketType::Unsuback,
            MqttPacket::Unsubscribe(_) => PacketType::Unsubscribe,
        }
    }

    /// The remaining length of this packet, excluding fixed header and
    /// length prefix
    fn remaining_length(&self) -> u32 {
        match self {
            MqttPacket::Auth(packet) => packet.binary_size(),
            MqttPacket::Connack(packet) => packet.binary_size(),
            MqttPacket::Connect(packet) => packet.binary_size(),
            MqttPacket::Disconnect(packet) => packet.binary_size(),
            MqttPacket::Pingreq(packet) => packet.binary_size(),
            MqttPacket::Pingresp(packet) => packet.binary_size(),
            MqttPacket::Puback(packet) => packet.binary_size(),
            MqttPacket::Pubcomp(packet) => packet.binary_size(),
            MqttPacket::Publish(packet) => packet.binary_size(),
            MqttPacket::Pubrec(packet) => packet.binary_size(),
            MqttPacket::Pubrel(packet) => packet.binary_size(),
            MqttPacket::Suback(packet) => packet.binary_size(),
            MqttPacket::Subscribe(packet) => packet.binary_size(),
            MqttPacket::Unsuback(packet) => packet.binary_size(),
            MqttPacket::Unsubscribe(packet) => packet.binary_size(),
        }
    }

    /// Total size of the frame this packet serializes to
    pub fn binary_size(&self) -> u32 {
        let remaining_length = self.remaining_length();

        MFixedHeader::binary_size() + variable_u32_binary_size(remaining_length) + remaining_length
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        let fixed_header = MFixedHeader {
            packet_type: self.packet_type(),
        };
        fixed_header.write(buffer)?;
        write_variable_u32(buffer, self.remaining_length())?;

        match self {
            MqttPacket::Auth(packet) => packet.write(buffer),
            MqttPacket::Connack(packet) => packet.write(buffer),
            MqttPacket::Connect(packet) => packet.write(buffer),
            MqttPacket::Disconnect(packet) => packet.write(buffer),
            MqttPacket::Pingreq(packet) => packet.write(buffer),
            MqttPacket::Pingresp(packet) => packet.write(buffer),
            MqttPacket::Puback(packet) => packet.write(buffer),
            MqttPacket::Pubcomp(packet) => packet.write(buffer),
            MqttPacket::Publish(packet) => packet.write(buffer),
            MqttPacket::Pubrec(packet) => packet.write(buffer),
            MqttPacket::Pubrel(packet) => packet.write(buffer),
            MqttPacket::Suback(packet) => packet.write(buffer),
            MqttPacket::Subscribe(packet) => packet.write(buffer),
            MqttPacket::Unsuback(packet) => packet.write(buffer),
            MqttPacket::Unsubscribe(packet) => packet.write(buffer),
        }
    }

    /// Serialize the whole frame into a caller-provided buffer
    ///
    /// Returns the number of bytes written.
    pub fn serialize(&self, buffer: &mut [u8]) -> Result<usize, MqttError> {
        if self.remaining_length() > VARIABLE_INTEGER_MAX {
            return Err(MqttError::OutOfRange);
        }

        let mut writer = SliceWriter::new(buffer);
        self.write(&mut writer)?;

        Ok(writer.written())
    }

    /// Check the semantic rules that parsing alone does not enforce
    ///
    /// Kept separate from [`MqttPacket::parse`] so trusted paths can skip
    /// it.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            MqttPacket::Auth(packet) => packet.validate(),
            MqttPacket::Connack(packet) => packet.validate(),
            MqttPacket::Connect(packet) => packet.validate(),
            MqttPacket::Disconnect(packet) => packet.validate(),
            MqttPacket::Pingreq(_) | MqttPacket::Pingresp(_) => Ok(()),
            MqttPacket::Puback(packet) => packet.validate(),
            MqttPacket::Pubcomp(packet) => packet.validate(),
            MqttPacket::Publish(packet) => packet.validate(),
            MqttPacket::Pubrec(packet) => packet.validate(),
            MqttPacket::Pubrel(packet) => packet.validate(),
            MqttPacket::Suback(packet) => packet.validate(),
            MqttPacket::Subscribe(packet) => packet.validate(),
            MqttPacket::Unsuback(packet) => packet.validate(),
            MqttPacket::Unsubscribe(packet) => packet.validate(),
        }
    }
}

macro_rules! impl_from_packet {
    ($($kind:ty => $name:ident),* $(,)?) => {
        $(
            impl<S: MqttStorage> From<$kind> for MqttPacket<S> {
                fn from(from: $kind) -> Self {
                    MqttPacket::$name(from)
                }
            }
        )*
    };
}

impl_from_packet!(
    MAuth<S> => Auth,
    MConnack<S> => Connack,
    MConnect<S> => Connect,
    MDisconnect<S> => Disconnect,
    MPingreq => Pingreq,
    MPingresp => Pingresp,
    MPuback<S> => Puback,
    MPubcomp<S> => Pubcomp,
    MPublish<S> => Publish,
    MPubrec<S> => Pubrec,
    MPubrel<S> => Pubrel,
    MSuback<S> => Suback,
    MSubscribe<S> => Subscribe,
    MUnsuback<S> => Unsuback,
    MUnsubscribe<S> => Unsubscribe,
);
