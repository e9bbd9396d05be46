//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::Bytes;
use winnow::Parser;
use winnow::combinator::trace;

use crate::v5::MResult;
use crate::v5::error::ValidationError;
use crate::v5::properties::PropertyContext;
use crate::v5::properties::PropertyList;
use crate::v5::qos::QualityOfService;
use crate::v5::storage::MqttStorage;
use crate::v5::storage::ParseStorage;
use crate::v5::strings::parse_string;
use crate::v5::strings::string_binary_size;
use crate::v5::strings::write_string;
use crate::v5::variable_header::PacketIdentifier;
use crate::v5::write::WResult;
use crate::v5::write::WriteMqttPacket;

/// An application message
///
/// DUP, QoS and RETAIN live in the fixed header flags, so they arrive as
/// arguments to [`MPublish::parse`] rather than out of the frame body. The
/// packet identifier exists exactly when the QoS is above 0, and the
/// payload runs to the end of the frame without a length of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct MPublish<S: MqttStorage> {
    pub dup: bool,
    pub quality_of_service: QualityOfService,
    pub retain: bool,
    pub topic_name: S::Str,
    pub packet_identifier: Option<PacketIdentifier>,
    pub properties: PropertyList<S>,
    pub payload: S::Bin,
}

impl<S: MqttStorage> MPublish<S> {
    /// A QoS-0 publish with no flags set
    pub fn new(topic_name: S::Str, payload: S::Bin) -> MPublish<S> {
        MPublish {
            dup: false,
            quality_of_service: QualityOfService::AtMostOnce,
            retain: false,
            topic_name,
            packet_identifier: None,
            properties: PropertyList::new(),
            payload,
        }
    }

    pub fn parse<'i>(
        dup: bool,
        quality_of_service: QualityOfService,
        retain: bool,
        input: &mut &'i Bytes,
    ) -> MResult<MPublish<S>>
    where
        S: ParseStorage<'i>,
    {
        trace("MPublish", |input: &mut &'i Bytes| {
            let topic_name = S::make_str(parse_string(input)?);

            let packet_identifier = (quality_of_service != QualityOfService::AtMostOnce)
                .then(|| PacketIdentifier::parse(input))
                .transpose()?;

            let properties = PropertyList::parse(input)?;
            let payload = S::make_bin(winnow::token::rest.parse_next(input)?);

            Ok(MPublish {
                dup,
                quality_of_service,
                retain,
                topic_name,
                packet_identifier,
                properties,
                payload,
            })
        })
        .parse_next(input)
    }

    pub fn binary_size(&self) -> u32 {
        let identifier_size = match self.packet_identifier {
            Some(identifier) => identifier.binary_size(),
            None => 0,
        };

        string_binary_size(self.topic_name.as_ref())
            + identifier_size
            + self.properties.binary_size()
            + self.payload.as_ref().len() as u32
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        write_string(buffer, self.topic_name.as_ref())?;

        if let Some(identifier) = self.packet_identifier {
            identifier.write(buffer)?;
        }

        self.properties.write(buffer)?;
        buffer.write_slice(self.payload.as_ref())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match (self.quality_of_service, self.packet_identifier) {
            (QualityOfService::AtMostOnce, Some(_)) => {
                return Err(ValidationError::UnexpectedPacketIdentifier);
            }
            (QualityOfService::AtLeastOnce | QualityOfService::ExactlyOnce, None) => {
                return Err(ValidationError::MissingPacketIdentifier);
            }
            _ => {}
        }

        if self
            .topic_name
            .as_ref()
            .chars()
            .any(|c| c == '#' || c == '+')
        {
            return Err(ValidationError::WildcardInTopicName);
        }

        self.properties.validate(PropertyContext::Publish)
    }
}
