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
use crate::v5::storage::MqttStorage;
use crate::v5::storage::ParseStorage;
use crate::v5::variable_header::PacketIdentifier;
use crate::v5::write::WResult;
use crate::v5::write::WriteMqttPacket;

crate::v5::reason_code::make_combined_reason_code! {
    pub enum PubrecReasonCode {
        ImplementationSpecificError = crate::v5::reason_code::ImplementationSpecificError,
        NoMatchingSubscribers = crate::v5::reason_code::NoMatchingSubscribers,
        NotAuthorized = crate::v5::reason_code::NotAuthorized,
        PacketIdentifierInUse = crate::v5::reason_code::PacketIdentifierInUse,
        PayloadFormatInvalid = crate::v5::reason_code::PayloadFormatInvalid,
        QuotaExceeded = crate::v5::reason_code::QuotaExceeded,
        Success = crate::v5::reason_code::Success,
        TopicNameInvalid = crate::v5::reason_code::TopicNameInvalid,
        UnspecifiedError = crate::v5::reason_code::UnspecifiedError,
    }
}

/// First acknowledgement of a quality-of-service-2 publish
#[derive(Debug, Clone, PartialEq)]
pub struct MPubrec<S: MqttStorage> {
    pub packet_identifier: PacketIdentifier,
    pub reason: PubrecReasonCode,
    pub properties: PropertyList<S>,
}

impl<S: MqttStorage> MPubrec<S> {
    pub fn new(packet_identifier: PacketIdentifier) -> MPubrec<S> {
        MPubrec {
            packet_identifier,
            reason: PubrecReasonCode::Success,
            properties: PropertyList::new(),
        }
    }

    pub fn parse<'i>(input: &mut &'i Bytes) -> MResult<MPubrec<S>>
    where
        S: ParseStorage<'i>,
    {
        trace("MPubrec", |input: &mut &'i Bytes| {
            let packet_identifier = PacketIdentifier::parse(input)?;

            if input.is_empty() {
                return Ok(MPubrec::new(packet_identifier));
            }

            let reason = PubrecReasonCode::parse(input)?;

            if input.is_empty() {
                return Ok(MPubrec {
                    packet_identifier,
                    reason,
                    properties: PropertyList::new(),
                });
            }

            let properties = PropertyList::parse(input)?;

            Ok(MPubrec {
                packet_identifier,
                reason,
                properties,
            })
        })
        .parse_next(input)
    }

    pub fn binary_size(&self) -> u32 {
        if self.properties.is_empty() {
            if self.reason == PubrecReasonCode::Success {
                self.packet_identifier.binary_size()
            } else {
                self.packet_identifier.binary_size() + self.reason.binary_size()
            }
        } else {
            self.packet_identifier.binary_size()
                + self.reason.binary_size()
                + self.properties.binary_size()
        }
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        self.packet_identifier.write(buffer)?;

        if self.properties.is_empty() {
            if self.reason != PubrecReasonCode::Success {
                self.reason.write(buffer)?;
            }
            return Ok(());
        }

        self.reason.write(buffer)?;
        self.properties.write(buffer)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.properties.validate(PropertyContext::Pubrec)
    }
}
