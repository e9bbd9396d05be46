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
    pub enum SubackReasonCode {
        GrantedQoS0 = crate::v5::reason_code::GrantedQoS0,
        GrantedQoS1 = crate::v5::reason_code::GrantedQoS1,
        GrantedQoS2 = crate::v5::reason_code::GrantedQoS2,
        ImplementationSpecificError = crate::v5::reason_code::ImplementationSpecificError,
        NotAuthorized = crate::v5::reason_code::NotAuthorized,
        PacketIdentifierInUse = crate::v5::reason_code::PacketIdentifierInUse,
        QuotaExceeded = crate::v5::reason_code::QuotaExceeded,
        SharedSubscriptionsNotSupported = crate::v5::reason_code::SharedSubscriptionsNotSupported,
        SubscriptionIdentifiersNotSupported = crate::v5::reason_code::SubscriptionIdentifiersNotSupported,
        TopicFilterInvalid = crate::v5::reason_code::TopicFilterInvalid,
        UnspecifiedError = crate::v5::reason_code::UnspecifiedError,
        WildcardSubscriptionsNotSupported = crate::v5::reason_code::WildcardSubscriptionsNotSupported,
    }
}

/// The answer to a SUBSCRIBE, one reason code per requested filter
#[derive(Debug, Clone, PartialEq)]
pub struct MSuback<S: MqttStorage> {
    pub packet_identifier: PacketIdentifier,
    pub properties: PropertyList<S>,
    pub reasons: S::Seq<SubackReasonCode>,
}

impl<S: MqttStorage> MSuback<S> {
    pub fn new(
        packet_identifier: PacketIdentifier,
        reasons: S::Seq<SubackReasonCode>,
    ) -> MSuback<S> {
        MSuback {
            packet_identifier,
            properties: PropertyList::new(),
            reasons,
        }
    }

    pub fn parse<'i>(input: &mut &'i Bytes) -> MResult<MSuback<S>>
    where
        S: ParseStorage<'i>,
    {
        trace("MSuback", |input: &mut &'i Bytes| {
            let packet_identifier = PacketIdentifier::parse(input)?;
            let properties = PropertyList::parse(input)?;
            let reasons = S::parse_seq::<SubackReasonCode>(input, false)?;

            Ok(MSuback {
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
        self.properties.validate(PropertyContext::Suback)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use winnow::Bytes;

    use crate::v5::packets::suback::MSuback;
    use crate::v5::packets::suback::SubackReasonCode;
    use crate::v5::properties::Property;
    use crate::v5::properties::PropertyList;
    use crate::v5::storage::Owning;

    #[test]
    fn test_roundtrip_suback_no_props() {
        crate::v5::test::make_roundtrip_test!(MSuback<Owning> {
            packet_identifier: crate::v5::variable_header::PacketIdentifier(17),
            properties: PropertyList::new(),
            reasons: vec![SubackReasonCode::GrantedQoS0],
        });
    }

    #[test]
    fn test_roundtrip_suback_props() {
        crate::v5::test::make_roundtrip_test!(MSuback<Owning> {
            packet_identifier: crate::v5::variable_header::PacketIdentifier(17),
            properties: PropertyList::from(vec![
                Property::ReasonString("sgjdhsbgjsghb".to_owned()),
                Property::UserProperty("f".to_owned(), "hj".to_owned()),
            ]),
            reasons: vec![
                SubackReasonCode::GrantedQoS0,
                SubackReasonCode::NotAuthorized,
            ],
        });
    }

    #[test]
    fn test_bad_reason_code_is_rejected() {
        // 0x42 is not a SUBACK reason code
        let input = [0x00, 0x11, 0x00, 0x42];

        MSuback::<Owning>::parse(&mut Bytes::new(&input)).unwrap_err();
    }
}
