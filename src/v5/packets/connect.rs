//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::Bytes;
use winnow::Parser;
use winnow::combinator::trace;

use crate::v5::MResult;
use crate::v5::bytes::binary_data_binary_size;
use crate::v5::bytes::parse_binary_data;
use crate::v5::bytes::write_binary_data;
use crate::v5::error::MalformedPacketError;
use crate::v5::error::ValidationError;
use crate::v5::error::malformed;
use crate::v5::integers::parse_u16;
use crate::v5::level::ProtocolLevel;
use crate::v5::properties::PropertyContext;
use crate::v5::properties::PropertyList;
use crate::v5::qos::QualityOfService;
use crate::v5::storage::MqttStorage;
use crate::v5::storage::ParseStorage;
use crate::v5::strings::parse_string;
use crate::v5::strings::string_binary_size;
use crate::v5::strings::write_string;
use crate::v5::write::WResult;
use crate::v5::write::WriteMqttPacket;

pub const PROTOCOL_NAME: &str = "MQTT";

/// The first packet a client sends on a fresh connection
///
/// The client identifier may be any UTF-8 string, including the empty one;
/// a server assigns an identifier via CONNACK in that case.
#[derive(Debug, Clone, PartialEq)]
pub struct MConnect<S: MqttStorage> {
    pub clean_start: bool,
    pub keep_alive: u16,
    pub properties: PropertyList<S>,
    pub client_identifier: S::Str,
    pub will: Option<Will<S>>,
    pub username: Option<S::Str>,
    pub password: Option<S::Bin>,
}

/// The message the server publishes if this session dies ungracefully
#[derive(Debug, Clone, PartialEq)]
pub struct Will<S: MqttStorage> {
    pub properties: PropertyList<S>,
    pub topic: S::Str,
    pub payload: S::Bin,
    pub quality_of_service: QualityOfService,
    pub retain: bool,
}

impl<S: MqttStorage> Will<S> {
    fn binary_size(&self) -> u32 {
        self.properties.binary_size()
            + string_binary_size(self.topic.as_ref())
            + binary_data_binary_size(self.payload.as_ref())
    }

    fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        self.properties.write(buffer)?;
        write_string(buffer, self.topic.as_ref())?;
        write_binary_data(buffer, self.payload.as_ref())
    }
}

impl<S: MqttStorage> MConnect<S> {
    pub fn new(client_identifier: S::Str) -> MConnect<S> {
        MConnect {
            clean_start: true,
            keep_alive: 0,
            properties: PropertyList::new(),
            client_identifier,
            will: None,
            username: None,
            password: None,
        }
    }

    pub fn parse<'i>(input: &mut &'i Bytes) -> MResult<MConnect<S>>
    where
        S: ParseStorage<'i>,
    {
        trace("MConnect", |input: &mut &'i Bytes| {
            let protocol_name = parse_string(input)?;
            if protocol_name != PROTOCOL_NAME {
                return Err(malformed(input, MalformedPacketError::BadProtocolName));
            }

            ProtocolLevel::parse(input)?;

            let flags = winnow::binary::u8(input)?;
            if flags & 0b0000_0001 != 0 {
                return Err(malformed(input, MalformedPacketError::ReservedBitsSet));
            }
            let clean_start = flags & 0b0000_0010 != 0;
            let will_flag = flags & 0b0000_0100 != 0;
            let will_qos = QualityOfService::try_from((flags & 0b0001_1000) >> 3)
                .map_err(|_| malformed(input, MalformedPacketError::BadQualityOfService))?;
            let will_retain = flags & 0b0010_0000 != 0;
            let password_flag = flags & 0b0100_0000 != 0;
            let username_flag = flags & 0b1000_0000 != 0;

            // Without a will, its QoS and retain bits must stay zero
            if !will_flag && (will_retain || will_qos != QualityOfService::AtMostOnce) {
                return Err(malformed(input, MalformedPacketError::ReservedBitsSet));
            }

            let keep_alive = parse_u16(input)?;
            let properties = PropertyList::parse(input)?;

            let client_identifier = S::make_str(parse_string(input)?);

            let will = will_flag
                .then(|| {
                    let properties = PropertyList::parse(input)?;
                    let topic = S::make_str(parse_string(input)?);
                    let payload = S::make_bin(parse_binary_data(input)?);

                    Ok(Will {
                        properties,
                        topic,
                        payload,
                        quality_of_service: will_qos,
                        retain: will_retain,
                    })
                })
                .transpose()?;

            let username = username_flag
                .then(|| parse_string(input).map(S::make_str))
                .transpose()?;
            let password = password_flag
                .then(|| parse_binary_data(input).map(S::make_bin))
                .transpose()?;

            Ok(MConnect {
                clean_start,
                keep_alive,
                properties,
                client_identifier,
                will,
                username,
                password,
            })
        })
        .parse_next(input)
    }

    pub fn binary_size(&self) -> u32 {
        let mut size = string_binary_size(PROTOCOL_NAME)
            + ProtocolLevel::binary_size()
            + 1 // connect flags
            + 2 // keep alive
            + self.properties.binary_size()
            + string_binary_size(self.client_identifier.as_ref());

        if let Some(will) = &self.will {
            size += will.binary_size();
        }
        if let Some(username) = &self.username {
            size += string_binary_size(username.as_ref());
        }
        if let Some(password) = &self.password {
            size += binary_data_binary_size(password.as_ref());
        }

        size
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        write_string(buffer, PROTOCOL_NAME)?;
        ProtocolLevel::write(buffer)?;

        let mut flags = 0u8;
        if self.clean_start {
            flags |= 0b0000_0010;
        }
        if let Some(will) = &self.will {
            flags |= 0b0000_0100;
            flags |= u8::from(will.quality_of_service) << 3;
            if will.retain {
                flags |= 0b0010_0000;
            }
        }
        if self.password.is_some() {
            flags |= 0b0100_0000;
        }
        if self.username.is_some() {
            flags |= 0b1000_0000;
        }
        buffer.write_byte(flags)?;

        buffer.write_u16(self.keep_alive)?;
        self.properties.write(buffer)?;

        write_string(buffer, self.client_identifier.as_ref())?;

        if let Some(will) = &self.will {
            will.write(buffer)?;
        }
        if let Some(username) = &self.username {
            write_string(buffer, username.as_ref())?;
        }
        if let Some(password) = &self.password {
            write_binary_data(buffer, password.as_ref())?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.properties.validate(PropertyContext::Connect)?;

        if let Some(will) = &self.will {
            will.properties.validate(PropertyContext::Will)?;
        }

        Ok(())
    }
}
