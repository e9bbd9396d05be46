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
    pub enum PubackReasonCode {
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

/// Acknowledgement for a quality-of-service-1 publish
///
/// A remaining length of 2 omits both reason code and properties (the
/// reason then defaults to Success), a remaining length of 3 omits only
/// the properties. Writing applies the same omissions, so the short forms
/// round-trip byte for byte.
#[derive(Debug, Clone, PartialEq)]
pub struct MPuback<S: MqttStorage> {
    pub packet_identifier: PacketIdentifier,
    pub reason: PubackReasonCode,
    pub properties: PropertyList<S>,
}

impl<S: MqttStorage> MPuback<S> {
    pub fn new(packet_identifier: PacketIdentifier) -> MPuback<S> {
        MPuback {
            packet_identifier,
            reason: PubackReasonCode::Success,
            properties: PropertyList::new(),
        }
    }

    pub fn parse<'i>(input: &mut &'i Bytes) -> MResult<MPuback<S>>
    where
        S: ParseStorage<'i>,
    {
        trace("MPuback", |input: &mut &'i Bytes| {
            let packet_identifier = PacketIdentifier::parse(input)?;

            if input.is_empty() {
                return Ok(MPuback::new(packet_identifier));
            }

            let reason = PubackReasonCode::parse(input)?;

            if input.is_empty() {
                return Ok(MPuback {
                    packet_identifier,
                    reason,
                    properties: PropertyList::new(),
                });
            }

            let properties = PropertyList::parse(input)?;

            Ok(MPuback {
                packet_identifier,
                reason,
                properties,
            })
        })
        .parse_next(input)
    }

    pub fn binary_size(&self) -> u32 {
        if self.properties.is_empty() {
            if self.reason == PubackReasonCode::Success {
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
            if self.reason != PubackReasonCode::Success {
                self.reason.write(buffer)?;
            }
            return Ok(());
        }

        self.reason.write(buffer)?;
        self.properties.write(buffer)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.properties.validate(PropertyContext::Puback)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use winnow::Bytes;

    use crate::v5::packets::puback::MPuback;
    use crate::v5::packets::puback::PubackReasonCode;
    use crate::v5::properties::Property;
    use crate::v5::properties::PropertyList;
    use crate::v5::storage::Owning;
    use crate::v5::test::TestWriter;
    use crate::v5::variable_header::PacketIdentifier;

    #[test]
    fn test_shortcut_form_is_two_bytes() {
        let instance = MPuback::<Owning>::new(PacketIdentifier(0x1234));
        let mut writer = TestWriter { buffer: Vec::new() };

        instance.write(&mut writer).unwrap();
        assert_eq!(writer.buffer, &[0x12, 0x34]);
        assert_eq!(instance.binary_size(), 2);
    }

    #[test]
    fn test_parse_shortcut_defaults_reason_to_success() {
        let parsed = MPuback::<Owning>::parse(&mut Bytes::new(&[0x12, 0x34])).unwrap();

        assert_eq!(parsed.packet_identifier, PacketIdentifier(0x1234));
        assert_eq!(parsed.reason, PubackReasonCode::Success);
        assert!(parsed.properties.is_empty());
    }

    #[test]
    fn test_reason_without_properties_is_three_bytes() {
        crate::v5::test::make_roundtrip_test!(MPuback<Owning> {
            packet_identifier: PacketIdentifier(17),
            reason: PubackReasonCode::QuotaExceeded,
            properties: PropertyList::new(),
        });

        let instance = MPuback::<Owning> {
            packet_identifier: PacketIdentifier(17),
            reason: PubackReasonCode::QuotaExceeded,
            properties: PropertyList::new(),
        };
        assert_eq!(instance.binary_size(), 3);
    }

    #[test]
    fn test_roundtrip_with_properties() {
        crate::v5::test::make_roundtrip_test!(MPuback<Owning> {
            packet_identifier: PacketIdentifier(17),
            reason: PubackReasonCode::Success,
            properties: PropertyList::from(vec![Property::ReasonString("ok".to_owned())]),
        });
    }
}
