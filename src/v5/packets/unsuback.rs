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
use crate::v5::storage::ElementSeq;
use crate::v5::storage::MqttStorage;
use crate::v5::storage::ParseStorage;
use crate::v5::variable_header::PacketIdentifier;
use crate::v5::write::WResult;
use crate::v5::write::WriteMqttPacket;

crate::v5::reason_code::make_combined_reason_code! {
    pub enum UnsubackReasonCode {
        ImplementationSpecificError = crate::v5::reason_code::ImplementationSpecificError,
        NoSubscriptionExisted = crate::v5::reason_code::NoSubscriptionExisted,
        NotAuthorized = crate::v5::reason_code::NotAuthorized,
        PacketIdentifierInUse = crate::v5::reason_code::PacketIdentifierInUse,
        Success = crate::v5::reason_code::Success,
        TopicFilterInvalid = crate::v5::reason_code::TopicFilterInvalid,
        UnspecifiedError = crate::v5::reason_code::UnspecifiedError,
    }
}

/// The answer to an UNSUBSCRIBE, one reason code per requested filter
#[derive(Debug, Clone, PartialEq)]
pub struct MUnsuback<S: MqttStorage> {
    pub packet_identifier: PacketIdentifier,
    pub properties: PropertyList<S>,
    pub reasons: S::Seq<UnsubackReasonCode>,
}

impl<S: MqttStorage> MUnsuback<S> {
    pub fn new(
        packet_identifier: PacketIdentifier,
        reasons: S::Seq<UnsubackReasonCode>,
    ) -> MUnsuback<S> {
        MUnsuback {
            packet_identifier,
            properties: PropertyList::new(),
            reasons,
        }
    }

    pub fn parse<'i>(input: &mut &'i Bytes) -> MResult<MUnsuback<S>>
    where
        S: ParseStorage<'i>,
    {
        trace("MUnsuback", |input: &mut &'i Bytes| {
            let packet_identifier = PacketIdentifier::parse(input)?;
            let properties = PropertyList::parse(input)?;
            let reasons = S::parse_seq::<UnsubackReasonCode>(input, false)?;

            Ok(MUnsuback {
                packet_identifier,
                properties,
                reasons,
            })
        })
        .parse_next(input)
    }

    pub fn binary_size(&self) -> u32 {
        self.packet_identifier.binary_size()
            + self.properties.binary_size()
            + self.reasons.binary_size()
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        self.packet_identifier.write(buffer)?;
        self.properties.write(buffer)?;
        self.reasons.write(buffer)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.properties.validate(PropertyContext::Unsuback)
    }
}
