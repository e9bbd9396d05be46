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
    pub enum PubcompReasonCode {
        PacketIdentifierNotFound = crate::v5::reason_code::PacketIdentifierNotFound,
        Success = crate::v5::reason_code::Success,
    }
}

/// Final step of the quality-of-service-2 handshake
#[derive(Debug, Clone, PartialEq)]
pub struct MPubcomp<S: MqttStorage> {
    pub packet_identifier: PacketIdentifier,
    pub reason: PubcompReasonCode,
    pub properties: PropertyList<S>,
}

impl<S: MqttStorage> MPubcomp<S> {
    pub fn new(packet_identifier: PacketIdentifier) -> MPubcomp<S> {
        MPubcomp {
            packet_identifier,
            reason: PubcompReasonCode::Success,
            properties: PropertyList::new(),
        }
    }

    pub fn parse<'i>(input: &mut &'i Bytes) -> MResult<MPubcomp<S>>
    where
        S: ParseStorage<'i>,
    {
        trace("MPubcomp", |input: &mut &'i Bytes| {
            let packet_identifier = PacketIdentifier::parse(input)?;

            if input.is_empty() {
                return Ok(MPubcomp::new(packet_identifier));
            }

            let reason = PubcompReasonCode::parse(input)?;

            if input.is_empty() {
                return Ok(MPubcomp {
                    packet_identifier,
                    reason,
                    properties: PropertyList::new(),
                });
            }

            let properties = PropertyList::parse(input)?;

            Ok(MPubcomp {
                packet_identifier,
                reason,
                properties,
            })
        })
        .parse_next(input)
    }

    pub fn binary_size(&self) -> u32 {
        if self.properties.is_empty() {
            if self.reason == PubcompReasonCode::Success {
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
            if self.reason != PubcompReasonCode::Success {
                self.reason.write(buffer)?;
            }
            return Ok(());
        }

        self.reason.write(buffer)?;
        self.properties.write(buffer)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.properties.validate(PropertyContext::Pubcomp)
    }
}
