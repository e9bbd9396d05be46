//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::Bytes;
use winnow::Parser;
use winnow::combinator::trace;

use crate::v5::MResult;
use crate::v5::error::MalformedPacketError;
use crate::v5::error::ValidationError;
use crate::v5::error::malformed;
use crate::v5::properties::PropertyContext;
use crate::v5::properties::PropertyList;
use crate::v5::qos::QualityOfService;
use crate::v5::storage::ElementSeq;
use crate::v5::storage::MqttStorage;
use crate::v5::storage::ParseElement;
use crate::v5::storage::ParseStorage;
use crate::v5::storage::WireElement;
use crate::v5::strings::parse_string;
use crate::v5::strings::string_binary_size;
use crate::v5::strings::write_string;
use crate::v5::variable_header::PacketIdentifier;
use crate::v5::write::WResult;
use crate::v5::write::WriteMqttPacket;

#[derive(num_enum::TryFromPrimitive, num_enum::IntoPrimitive)]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetainHandling {
    SendRetainedMessagesAlways = 0,
    SendRetainedMessagesOnNewSubscribe = 1,
    DoNotSendRetainedMessages = 2,
}

/// The options byte of one subscription
///
/// Wire layout: `reserved:2 | RetainHandling:2 | RetainAsPublished:1 |
/// NoLocal:1 | QoS:2`, with the reserved bits required to be zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionOptions {
    pub quality_of_service: QualityOfService,
    pub no_local: bool,
    pub retain_as_published: bool,
    pub retain_handling: RetainHandling,
}

impl SubscriptionOptions {
    pub fn new(quality_of_service: QualityOfService) -> SubscriptionOptions {
        SubscriptionOptions {
            quality_of_service,
            no_local: false,
            retain_as_published: false,
            retain_handling: RetainHandling::SendRetainedMessagesAlways,
        }
    }

    fn parse(input: &mut &Bytes) -> MResult<SubscriptionOptions> {
        let byte = winnow::binary::u8(input)?;

        if byte & 0b1100_0000 != 0 {
            return Err(malformed(input, MalformedPacketError::ReservedBitsSet));
        }

        let quality_of_service = QualityOfService::try_from(byte & 0b0000_0011)
            .map_err(|_| malformed(input, MalformedPacketError::BadQualityOfService))?;
        let no_local = byte & 0b0000_0100 != 0;
        let retain_as_published = byte & 0b0000_1000 != 0;
        let retain_handling = RetainHandling::try_from((byte & 0b0011_0000) >> 4)
            .map_err(|_| malformed(input, MalformedPacketError::BadRetainHandling))?;

        Ok(SubscriptionOptions {
            quality_of_service,
            no_local,
            retain_as_published,
            retain_handling,
        })
    }

    fn to_byte(self) -> u8 {
        u8::from(self.quality_of_service)
            | (self.no_local as u8) << 2
            | (self.retain_as_published as u8) << 3
            | u8::from(self.retain_handling) << 4
    }
}

/// One topic filter with its options
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription<S: MqttStorage> {
    pub topic_filter: S::Str,
    pub options: SubscriptionOptions,
}

impl<S: MqttStorage> WireElement<S> for Subscription<S> {
    fn binary_size(&self) -> u32 {
        string_binary_size(self.topic_filter.as_ref()) + 1
    }

    fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        write_string(buffer, self.topic_filter.as_ref())?;
        buffer.write_byte(self.options.to_byte())
    }
}

impl<'i, S: ParseStorage<'i>> ParseElement<'i, S> for Subscription<S> {
    fn parse(input: &mut &'i Bytes) -> MResult<Subscription<S>> {
        trace("Subscription", |input: &mut &'i Bytes| {
            let topic_filter = S::make_str(parse_string(input)?);
            let options = SubscriptionOptions::parse(input)?;

            Ok(Subscription {
                topic_filter,
                options,
            })
        })
        .parse_next(input)
    }
}

/// A request to receive messages for one or more topic filters
///
/// The payload must hold at least one subscription; a SUBSCRIBE without any
/// is malformed.
#[derive(Debug, Clone, PartialEq)]
pub struct MSubscribe<S: MqttStorage> {
    pub packet_identifier: PacketIdentifier,
    pub properties: PropertyList<S>,
    pub subscriptions: S::Seq<Subscription<S>>,
}

impl<S: MqttStorage> MSubscribe<S> {
    pub fn new(
        packet_identifier: PacketIdentifier,
        subscriptions: S::Seq<Subscription<S>>,
    ) -> MSubscribe<S> {
        MSubscribe {
            packet_identifier,
            properties: PropertyList::new(),
            subscriptions,
        }
    }

    pub fn parse<'i>(input: &mut &'i Bytes) -> MResult<MSubscribe<S>>
    where
        S: ParseStorage<'i>,
    {
        trace("MSubscribe", |input: &mut &'i Bytes| {
            let packet_identifier = PacketIdentifier::parse(input)?;
            let properties = PropertyList::parse(input)?;
            let subscriptions = S::parse_seq::<Subscription<S>>(input, true)?;

            Ok(MSubscribe {
                packet_identifier,
                properties,
                subscriptions,
            })
        })
        .parse_next(input)
    }

    pub fn binary_size(&self) -> u32 {
        self.packet_identifier.binary_size()
            + self.properties.binary_size()
            + self.subscriptions.binary_size()
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        self.packet_identifier.write(buffer)?;
        self.properties.write(buffer)?;
        self.subscriptions.write(buffer)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.subscriptions.is_empty() {
            return Err(ValidationError::EmptySubscriptionList);
        }

        self.properties.validate(PropertyContext::Subscribe)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use winnow::Bytes;

    use crate::v5::packets::subscribe::MSubscribe;
    use crate::v5::packets::subscribe::RetainHandling;
    use crate::v5::packets::subscribe::Subscription;
    use crate::v5::packets::subscribe::SubscriptionOptions;
    use crate::v5::properties::PropertyList;
    use crate::v5::qos::QualityOfService;
    use crate::v5::storage::Borrowing;
    use crate::v5::storage::ElementSeq;
    use crate::v5::storage::Owning;
    use crate::v5::test::TestWriter;
    use crate::v5::variable_header::PacketIdentifier;

    #[test]
    fn test_roundtrip_subscribe_two_topics() {
        crate::v5::test::make_roundtrip_test!(MSubscribe<Owning> {
            packet_identifier: PacketIdentifier(1),
            properties: PropertyList::new(),
            subscriptions: vec![
                Subscription {
                    topic_filter: "a".to_owned(),
                    options: SubscriptionOptions::new(QualityOfService::AtLeastOnce),
                },
                Subscription {
                    topic_filter: "b/#".to_owned(),
                    options: SubscriptionOptions {
                        quality_of_service: QualityOfService::AtMostOnce,
                        no_local: true,
                        retain_as_published: false,
                        retain_handling: RetainHandling::SendRetainedMessagesAlways,
                    },
                },
            ],
        });
    }

    #[test]
    fn test_subscribe_without_entries_is_malformed() {
        // Packet identifier and empty properties, then nothing
        let input = [0x00, 0x01, 0x00];

        MSubscribe::<Owning>::parse(&mut Bytes::new(&input)).unwrap_err();
    }

    #[test]
    fn test_subscription_options_reserved_bits_are_rejected() {
        let input = [0x00, 0x01, 0x00, 0x00, 0x01, b'a', 0b0100_0001];

        MSubscribe::<Owning>::parse(&mut Bytes::new(&input)).unwrap_err();
    }

    #[test]
    fn test_retain_handling_three_is_rejected() {
        let input = [0x00, 0x01, 0x00, 0x00, 0x01, b'a', 0b0011_0001];

        MSubscribe::<Owning>::parse(&mut Bytes::new(&input)).unwrap_err();
    }

    #[test]
    fn test_borrowing_subscriptions_decode_lazily() {
        let instance = MSubscribe::<Owning>::new(
            PacketIdentifier(7),
            vec![
                Subscription {
                    topic_filter: "x/y".to_owned(),
                    options: SubscriptionOptions::new(QualityOfService::ExactlyOnce),
                },
                Subscription {
                    topic_filter: "z".to_owned(),
                    options: SubscriptionOptions::new(QualityOfService::AtMostOnce),
                },
            ],
        );
        let mut writer = TestWriter { buffer: Vec::new() };
        instance.write(&mut writer).unwrap();

        let view = MSubscribe::<Borrowing<'_>>::parse(&mut Bytes::new(&writer.buffer)).unwrap();
        let filters: Vec<&str> = view.subscriptions.iter().map(|s| s.topic_filter).collect();
        assert_eq!(filters, ["x/y", "z"]);
    }
}
