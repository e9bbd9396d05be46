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
use crate::v5::storage::ParseElement;
use crate::v5::storage::ParseStorage;
use crate::v5::storage::WireElement;
use crate::v5::strings::parse_string;
use crate::v5::strings::string_binary_size;
use crate::v5::strings::write_string;
use crate::v5::variable_header::PacketIdentifier;
use crate::v5::write::WResult;
use crate::v5::write::WriteMqttPacket;

/// One topic filter to drop
#[derive(Debug, Clone, PartialEq)]
pub struct Unsubscription<S: MqttStorage> {
    pub topic_filter: S::Str,
}

impl<S: MqttStorage> WireElement<S> for Unsubscription<S> {
    fn binary_size(&self) -> u32 {
        string_binary_size(self.topic_filter.as_ref())
    }

    fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        write_string(buffer, self.topic_filter.as_ref())
    }
}

impl<'i, S: ParseStorage<'i>> ParseElement<'i, S> for Unsubscription<S> {
    fn parse(input: &mut &'i Bytes) -> MResult<Unsubscription<S>> {
        let topic_filter = S::make_str(parse_string(input)?);

        Ok(Unsubscription { topic_filter })
    }
}

/// A request to drop one or more subscriptions
#[derive(Debug, Clone, PartialEq)]
pub struct MUnsubscribe<S: MqttStorage> {
    pub packet_identifier: PacketIdentifier,
    pub properties: PropertyList<S>,
    pub unsubscriptions: S::Seq<Unsubscription<S>>,
}

impl<S: MqttStorage> MUnsubscribe<S> {
    pub fn new(
        packet_identifier: PacketIdentifier,
        unsubscriptions: S::Seq<Unsubscription<S>>,
    ) -> MUnsubscribe<S> {
        MUnsubscribe {
            packet_identifier,
            properties: PropertyList::new(),
            unsubscriptions,
        }
    }

    pub fn parse<'i>(input: &mut &'i Bytes) -> MResult<MUnsubscribe<S>>
    where
        S: ParseStorage<'i>,
    {
        trace("MUnsubscribe", |input: &mut &'i Bytes| {
            let packet_identifier = PacketIdentifier::parse(input)?;
            let properties = PropertyList::parse(input)?;
            let unsubscriptions = S::parse_seq::<Unsubscription<S>>(input, true)?;

            Ok(MUnsubscribe {
                packet_identifier,
                properties,
                unsubscriptions,
            })
        })
        .parse_next(input)
    }

    pub fn binary_size(&self) -> u32 {
        self.packet_identifier.binary_size()
            + self.properties.binary_size()
            + self.unsubscriptions.binary_size()
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        self.packet_identifier.write(buffer)?;
        self.properties.write(buffer)?;
        self.unsubscriptions.write(buffer)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.properties.validate(PropertyContext::Unsubscribe)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use winnow::Bytes;

    use crate::v5::packets::unsubscribe::MUnsubscribe;
    use crate::v5::packets::unsubscribe::Unsubscription;
    use crate::v5::properties::PropertyList;
    use crate::v5::storage::Owning;
    use crate::v5::variable_header::PacketIdentifier;

    #[test]
    fn test_roundtrip_unsubscribe() {
        crate::v5::test::make_roundtrip_test!(MUnsubscribe<Owning> {
            packet_identifier: PacketIdentifier(42),
            properties: PropertyList::new(),
            unsubscriptions: vec![
                Unsubscription {
                    topic_filter: "a/b".to_owned(),
                },
                Unsubscription {
                    topic_filter: "c/+".to_owned(),
                },
            ],
        });
    }

    #[test]
    fn test_unsubscribe_without_filters_is_malformed() {
        let input = [0x00, 0x2A, 0x00];

        MUnsubscribe::<Owning>::parse(&mut Bytes::new(&input)).unwrap_err();
    }
}
