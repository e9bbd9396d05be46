//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! The MQTT property model
//!
//! A property is an identifier byte followed by a value whose shape is
//! fixed by the identifier: byte, two-byte integer, four-byte integer,
//! variable byte integer, string, binary data or string pair. Properties
//! travel in an ordered, length-prefixed list; which identifiers are legal
//! depends on the packet carrying the list (MQTT-2.2.2).

use winnow::Bytes;
use winnow::Parser;
use winnow::binary::length_take;
use winnow::combinator::trace;

use crate::v5::MResult;
use crate::v5::bytes::binary_data_binary_size;
use crate::v5::bytes::parse_binary_data;
use crate::v5::bytes::write_binary_data;
use crate::v5::error::MalformedPacketError;
use crate::v5::error::ValidationError;
use crate::v5::error::malformed;
use crate::v5::integers::parse_u16;
use crate::v5::integers::parse_u32;
use crate::v5::integers::parse_variable_u32;
use crate::v5::integers::variable_u32_binary_size;
use crate::v5::integers::write_variable_u32;
use crate::v5::storage::ElementSeq;
use crate::v5::storage::MqttStorage;
use crate::v5::storage::Owning;
use crate::v5::storage::ParseElement;
use crate::v5::storage::ParseStorage;
use crate::v5::storage::WireElement;
use crate::v5::strings::parse_string;
use crate::v5::strings::parse_string_pair;
use crate::v5::strings::string_binary_size;
use crate::v5::strings::write_string;
use crate::v5::write::WResult;
use crate::v5::write::WriteMqttPacket;

/// The 27 property identifiers of MQTT-2.2.2.2
#[derive(num_enum::TryFromPrimitive, num_enum::IntoPrimitive)]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    PayloadFormatIndicator = 0x01,
    MessageExpiryInterval = 0x02,
    ContentType = 0x03,
    ResponseTopic = 0x08,
    CorrelationData = 0x09,
    SubscriptionIdentifier = 0x0B,
    SessionExpiryInterval = 0x11,
    AssignedClientIdentifier = 0x12,
    ServerKeepAlive = 0x13,
    AuthenticationMethod = 0x15,
    AuthenticationData = 0x16,
    RequestProblemInformation = 0x17,
    WillDelayInterval = 0x18,
    RequestResponseInformation = 0x19,
    ResponseInformation = 0x1A,
    ServerReference = 0x1C,
    ReasonString = 0x1F,
    ReceiveMaximum = 0x21,
    TopicAliasMaximum = 0x22,
    TopicAlias = 0x23,
    MaximumQoS = 0x24,
    RetainAvailable = 0x25,
    UserProperty = 0x26,
    MaximumPacketSize = 0x27,
    WildcardSubscriptionAvailable = 0x28,
    SubscriptionIdentifiersAvailable = 0x29,
    SharedSubscriptionAvailable = 0x2A,
}

/// Where a property list appears
///
/// The Will properties inside CONNECT are their own context, distinct from
/// every packet type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyContext {
    Connect,
    Connack,
    Publish,
    Puback,
    Pubrec,
    Pubrel,
    Pubcomp,
    Subscribe,
    Suback,
    Unsubscribe,
    Unsuback,
    Disconnect,
    Auth,
    Will,
}

impl PropertyContext {
    const fn mask_bit(self) -> u16 {
        1 << match self {
            PropertyContext::Will => 0,
            PropertyContext::Connect => 1,
            PropertyContext::Connack => 2,
            PropertyContext::Publish => 3,
            PropertyContext::Puback => 4,
            PropertyContext::Pubrec => 5,
            PropertyContext::Pubrel => 6,
            PropertyContext::Pubcomp => 7,
            PropertyContext::Subscribe => 8,
            PropertyContext::Suback => 9,
            PropertyContext::Unsubscribe => 10,
            PropertyContext::Unsuback => 11,
            PropertyContext::Disconnect => 14,
            PropertyContext::Auth => 15,
        }
    }
}

impl PropertyType {
    /// Bitmask of the contexts this property is legal in
    ///
    /// Bit n stands for the packet type numbered n, bit 0 for the Will
    /// properties of CONNECT.
    pub const fn allowed_mask(self) -> u16 {
        const WILL: u16 = PropertyContext::Will.mask_bit();
        const CONNECT: u16 = PropertyContext::Connect.mask_bit();
        const CONNACK: u16 = PropertyContext::Connack.mask_bit();
        const PUBLISH: u16 = PropertyContext::Publish.mask_bit();
        const PUBACK: u16 = PropertyContext::Puback.mask_bit();
        const PUBREC: u16 = PropertyContext::Pubrec.mask_bit();
        const PUBREL: u16 = PropertyContext::Pubrel.mask_bit();
        const PUBCOMP: u16 = PropertyContext::Pubcomp.mask_bit();
        const SUBSCRIBE: u16 = PropertyContext::Subscribe.mask_bit();
        const SUBACK: u16 = PropertyContext::Suback.mask_bit();
        const UNSUBACK: u16 = PropertyContext::Unsuback.mask_bit();
        const DISCONNECT: u16 = PropertyContext::Disconnect.mask_bit();
        const AUTH: u16 = PropertyContext::Auth.mask_bit();

        match self {
            PropertyType::PayloadFormatIndicator => PUBLISH | WILL,
            PropertyType::MessageExpiryInterval => PUBLISH | WILL,
            PropertyType::ContentType => PUBLISH | WILL,
            PropertyType::ResponseTopic => PUBLISH | WILL,
            PropertyType::CorrelationData => PUBLISH | WILL,
            PropertyType::SubscriptionIdentifier => PUBLISH | SUBSCRIBE,
            PropertyType::SessionExpiryInterval => CONNECT | CONNACK | DISCONNECT,
            PropertyType::AssignedClientIdentifier => CONNACK,
            PropertyType::ServerKeepAlive => CONNACK,
            PropertyType::AuthenticationMethod => CONNECT | CONNACK | AUTH,
            PropertyType::AuthenticationData => CONNECT | CONNACK | AUTH,
            PropertyType::RequestProblemInformation => CONNECT,
            PropertyType::WillDelayInterval => WILL,
            PropertyType::RequestResponseInformation => CONNECT,
            PropertyType::ResponseInformation => CONNACK,
            PropertyType::ServerReference => CONNACK | DISCONNECT,
            PropertyType::ReasonString => {
                CONNACK
                    | PUBACK
                    | PUBREC
                    | PUBREL
                    | PUBCOMP
                    | SUBACK
                    | UNSUBACK
                    | DISCONNECT
                    | AUTH
            }
            PropertyType::ReceiveMaximum => CONNECT | CONNACK,
            PropertyType::TopicAliasMaximum => CONNECT | CONNACK,
            PropertyType::TopicAlias => PUBLISH,
            PropertyType::MaximumQoS => CONNACK,
            PropertyType::RetainAvailable => CONNACK,
            PropertyType::UserProperty => 0xFFFF,
            PropertyType::MaximumPacketSize => CONNECT | CONNACK,
            PropertyType::WildcardSubscriptionAvailable => CONNACK,
            PropertyType::SubscriptionIdentifiersAvailable => CONNACK,
            PropertyType::SharedSubscriptionAvailable => CONNACK,
        }
    }

    pub const fn allowed_in(self, context: PropertyContext) -> bool {
        self.allowed_mask() & context.mask_bit() != 0
    }

    /// Only the User Property and the Subscription Identifier may appear
    /// more than once in a list
    pub const fn allows_repeats(self) -> bool {
        matches!(
            self,
            PropertyType::UserProperty | PropertyType::SubscriptionIdentifier
        )
    }

    pub const fn name(self) -> &'static str {
        match self {
            PropertyType::PayloadFormatIndicator => "PayloadFormatIndicator",
            PropertyType::MessageExpiryInterval => "MessageExpiryInterval",
            PropertyType::ContentType => "ContentType",
            PropertyType::ResponseTopic => "ResponseTopic",
            PropertyType::CorrelationData => "CorrelationData",
            PropertyType::SubscriptionIdentifier => "SubscriptionIdentifier",
            PropertyType::SessionExpiryInterval => "SessionExpiryInterval",
            PropertyType::AssignedClientIdentifier => "AssignedClientIdentifier",
            PropertyType::ServerKeepAlive => "ServerKeepAlive",
            PropertyType::AuthenticationMethod => "AuthenticationMethod",
            PropertyType::AuthenticationData => "AuthenticationData",
            PropertyType::RequestProblemInformation => "RequestProblemInformation",
            PropertyType::WillDelayInterval => "WillDelayInterval",
            PropertyType::RequestResponseInformation => "RequestResponseInformation",
            PropertyType::ResponseInformation => "ResponseInformation",
            PropertyType::ServerReference => "ServerReference",
            PropertyType::ReasonString => "ReasonString",
            PropertyType::ReceiveMaximum => "ReceiveMaximum",
            PropertyType::TopicAliasMaximum => "TopicAliasMaximum",
            PropertyType::TopicAlias => "TopicAlias",
            PropertyType::MaximumQoS => "MaximumQoS",
            PropertyType::RetainAvailable => "RetainAvailable",
            PropertyType::UserProperty => "UserProperty",
            PropertyType::MaximumPacketSize => "MaximumPacketSize",
            PropertyType::WildcardSubscriptionAvailable => "WildcardSubscriptionAvailable",
            PropertyType::SubscriptionIdentifiersAvailable => "SubscriptionIdentifiersAvailable",
            PropertyType::SharedSubscriptionAvailable => "SharedSubscriptionAvailable",
        }
    }
}

impl core::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// One decoded property
#[derive(Debug, Clone, PartialEq)]
pub enum Property<S: MqttStorage> {
    PayloadFormatIndicator(u8),
    MessageExpiryInterval(u32),
    ContentType(S::Str),
    ResponseTopic(S::Str),
    CorrelationData(S::Bin),
    SubscriptionIdentifier(u32),
    SessionExpiryInterval(u32),
    AssignedClientIdentifier(S::Str),
    ServerKeepAlive(u16),
    AuthenticationMethod(S::Str),
    AuthenticationData(S::Bin),
    RequestProblemInformation(u8),
    WillDelayInterval(u32),
    RequestResponseInformation(u8),
    ResponseInformation(S::Str),
    ServerReference(S::Str),
    ReasonString(S::Str),
    ReceiveMaximum(u16),
    TopicAliasMaximum(u16),
    TopicAlias(u16),
    MaximumQoS(u8),
    RetainAvailable(u8),
    UserProperty(S::Str, S::Str),
    MaximumPacketSize(u32),
    WildcardSubscriptionAvailable(u8),
    SubscriptionIdentifiersAvailable(u8),
    SharedSubscriptionAvailable(u8),
}

impl<S: MqttStorage> Property<S> {
    pub fn property_type(&self) -> PropertyType {
        match self {
            Property::PayloadFormatIndicator(_) => PropertyType::PayloadFormatIndicator,
            Property::MessageExpiryInterval(_) => PropertyType::MessageExpiryInterval,
            Property::ContentType(_) => PropertyType::ContentType,
            Property::ResponseTopic(_) => PropertyType::ResponseTopic,
            Property::CorrelationData(_) => PropertyType::CorrelationData,
            Property::SubscriptionIdentifier(_) => PropertyType::SubscriptionIdentifier,
            Property::SessionExpiryInterval(_) => PropertyType::SessionExpiryInterval,
            Property::AssignedClientIdentifier(_) => PropertyType::AssignedClientIdentifier,
            Property::ServerKeepAlive(_) => PropertyType::ServerKeepAlive,
            Property::AuthenticationMethod(_) => PropertyType::AuthenticationMethod,
            Property::AuthenticationData(_) => PropertyType::AuthenticationData,
            Property::RequestProblemInformation(_) => PropertyType::RequestProblemInformation,
            Property::WillDelayInterval(_) => PropertyType::WillDelayInterval,
            Property::RequestResponseInformation(_) => PropertyType::RequestResponseInformation,
            Property::ResponseInformation(_) => PropertyType::ResponseInformation,
            Property::ServerReference(_) => PropertyType::ServerReference,
            Property::ReasonString(_) => PropertyType::ReasonString,
            Property::ReceiveMaximum(_) => PropertyType::ReceiveMaximum,
            Property::TopicAliasMaximum(_) => PropertyType::TopicAliasMaximum,
            Property::TopicAlias(_) => PropertyType::TopicAlias,
            Property::MaximumQoS(_) => PropertyType::MaximumQoS,
            Property::RetainAvailable(_) => PropertyType::RetainAvailable,
            Property::UserProperty(_, _) => PropertyType::UserProperty,
            Property::MaximumPacketSize(_) => PropertyType::MaximumPacketSize,
            Property::WildcardSubscriptionAvailable(_) => {
                PropertyType::WildcardSubscriptionAvailable
            }
            Property::SubscriptionIdentifiersAvailable(_) => {
                PropertyType::SubscriptionIdentifiersAvailable
            }
            Property::SharedSubscriptionAvailable(_) => PropertyType::SharedSubscriptionAvailable,
        }
    }

    pub fn parse<'i>(input: &mut &'i Bytes) -> MResult<Property<S>>
    where
        S: ParseStorage<'i>,
    {
        trace("mqtt_property", |input: &mut &'i Bytes| {
            // No identifier above 0x7F is defined, so the variable byte
            // identifier of MQTT-2.2.2.2 is a single byte in practice.
            let tag = winnow::binary::u8(input)?;
            let Ok(property_type) = PropertyType::try_from(tag) else {
                return Err(malformed(input, MalformedPacketError::BadPropertyIdentifier));
            };

            let property = match property_type {
                PropertyType::PayloadFormatIndicator => {
                    Property::PayloadFormatIndicator(winnow::binary::u8(input)?)
                }
                PropertyType::MessageExpiryInterval => {
                    Property::MessageExpiryInterval(parse_u32(input)?)
                }
                PropertyType::ContentType => Property::ContentType(S::make_str(parse_string(input)?)),
                PropertyType::ResponseTopic => {
                    Property::ResponseTopic(S::make_str(parse_string(input)?))
                }
                PropertyType::CorrelationData => {
                    Property::CorrelationData(S::make_bin(parse_binary_data(input)?))
                }
                PropertyType::SubscriptionIdentifier => {
                    Property::SubscriptionIdentifier(parse_variable_u32(input)?)
                }
                PropertyType::SessionExpiryInterval => {
                    Property::SessionExpiryInterval(parse_u32(input)?)
                }
                PropertyType::AssignedClientIdentifier => {
                    Property::AssignedClientIdentifier(S::make_str(parse_string(input)?))
                }
                PropertyType::ServerKeepAlive => Property::ServerKeepAlive(parse_u16(input)?),
                PropertyType::AuthenticationMethod => {
                    Property::AuthenticationMethod(S::make_str(parse_string(input)?))
                }
                PropertyType::AuthenticationData => {
                    Property::AuthenticationData(S::make_bin(parse_binary_data(input)?))
                }
                PropertyType::RequestProblemInformation => {
                    Property::RequestProblemInformation(winnow::binary::u8(input)?)
                }
                PropertyType::WillDelayInterval => Property::WillDelayInterval(parse_u32(input)?),
                PropertyType::RequestResponseInformation => {
                    Property::RequestResponseInformation(winnow::binary::u8(input)?)
                }
                PropertyType::ResponseInformation => {
                    Property::ResponseInformation(S::make_str(parse_string(input)?))
                }
                PropertyType::ServerReference => {
                    Property::ServerReference(S::make_str(parse_string(input)?))
                }
                PropertyType::ReasonString => {
                    Property::ReasonString(S::make_str(parse_string(input)?))
                }
                PropertyType::ReceiveMaximum => Property::ReceiveMaximum(parse_u16(input)?),
                PropertyType::TopicAliasMaximum => Property::TopicAliasMaximum(parse_u16(input)?),
                PropertyType::TopicAlias => Property::TopicAlias(parse_u16(input)?),
                PropertyType::MaximumQoS => Property::MaximumQoS(winnow::binary::u8(input)?),
                PropertyType::RetainAvailable => {
                    Property::RetainAvailable(winnow::binary::u8(input)?)
                }
                PropertyType::UserProperty => {
                    let (key, value) = parse_string_pair(input)?;
                    Property::UserProperty(S::make_str(key), S::make_str(value))
                }
                PropertyType::MaximumPacketSize => Property::MaximumPacketSize(parse_u32(input)?),
                PropertyType::WildcardSubscriptionAvailable => {
                    Property::WildcardSubscriptionAvailable(winnow::binary::u8(input)?)
                }
                PropertyType::SubscriptionIdentifiersAvailable => {
                    Property::SubscriptionIdentifiersAvailable(winnow::binary::u8(input)?)
                }
                PropertyType::SharedSubscriptionAvailable => {
                    Property::SharedSubscriptionAvailable(winnow::binary::u8(input)?)
                }
            };

            Ok(property)
        })
        .parse_next(input)
    }

    /// Size of identifier plus value on the wire
    pub fn binary_size(&self) -> u32 {
        let value_size = match self {
            Property::PayloadFormatIndicator(_)
            | Property::RequestProblemInformation(_)
            | Property::RequestResponseInformation(_)
            | Property::MaximumQoS(_)
            | Property::RetainAvailable(_)
            | Property::WildcardSubscriptionAvailable(_)
            | Property::SubscriptionIdentifiersAvailable(_)
            | Property::SharedSubscriptionAvailable(_) => 1,

            Property::ServerKeepAlive(_)
            | Property::ReceiveMaximum(_)
            | Property::TopicAliasMaximum(_)
            | Property::TopicAlias(_) => 2,

            Property::MessageExpiryInterval(_)
            | Property::SessionExpiryInterval(_)
            | Property::WillDelayInterval(_)
            | Property::MaximumPacketSize(_) => 4,

            Property::SubscriptionIdentifier(value) => variable_u32_binary_size(*value),

            Property::ContentType(s)
            | Property::ResponseTopic(s)
            | Property::AssignedClientIdentifier(s)
            | Property::AuthenticationMethod(s)
            | Property::ResponseInformation(s)
            | Property::ServerReference(s)
            | Property::ReasonString(s) => string_binary_size(s.as_ref()),

            Property::CorrelationData(b) | Property::AuthenticationData(b) => {
                binary_data_binary_size(b.as_ref())
            }

            Property::UserProperty(key, value) => {
                string_binary_size(key.as_ref()) + string_binary_size(value.as_ref())
            }
        };

        1 + value_size
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        buffer.write_byte(u8::from(self.property_type()))?;

        match self {
            Property::PayloadFormatIndicator(value)
            | Property::RequestProblemInformation(value)
            | Property::RequestResponseInformation(value)
            | Property::MaximumQoS(value)
            | Property::RetainAvailable(value)
            | Property::WildcardSubscriptionAvailable(value)
            | Property::SubscriptionIdentifiersAvailable(value)
            | Property::SharedSubscriptionAvailable(value) => buffer.write_byte(*value),

            Property::ServerKeepAlive(value)
            | Property::ReceiveMaximum(value)
            | Property::TopicAliasMaximum(value)
            | Property::TopicAlias(value) => buffer.write_u16(*value),

            Property::MessageExpiryInterval(value)
            | Property::SessionExpiryInterval(value)
            | Property::WillDelayInterval(value)
            | Property::MaximumPacketSize(value) => buffer.write_u32(*value),

            Property::SubscriptionIdentifier(value) => write_variable_u32(buffer, *value),

            Property::ContentType(s)
            | Property::ResponseTopic(s)
            | Property::AssignedClientIdentifier(s)
            | Property::AuthenticationMethod(s)
            | Property::ResponseInformation(s)
            | Property::ServerReference(s)
            | Property::ReasonString(s) => write_string(buffer, s.as_ref()),

            Property::CorrelationData(b) | Property::AuthenticationData(b) => {
                write_binary_data(buffer, b.as_ref())
            }

            Property::UserProperty(key, value) => {
                write_string(buffer, key.as_ref())?;
                write_string(buffer, value.as_ref())
            }
        }
    }
}

impl<S: MqttStorage> WireElement<S> for Property<S> {
    fn binary_size(&self) -> u32 {
        Property::binary_size(self)
    }

    fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        Property::write(self, buffer)
    }
}

impl<'i, S: ParseStorage<'i>> ParseElement<'i, S> for Property<S> {
    fn parse(input: &mut &'i Bytes) -> MResult<Property<S>> {
        Property::parse(input)
    }
}

/// The ordered property list of a packet
///
/// On the wire this is a variable byte integer giving the byte length of
/// the entries, followed by the entries themselves. An empty list is the
/// single byte `0x00`. Decoding consumes exactly the prefixed length;
/// anything else is malformed.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyList<S: MqttStorage> {
    entries: S::Seq<Property<S>>,
}

impl<S: MqttStorage> PropertyList<S> {
    pub fn new() -> PropertyList<S> {
        PropertyList {
            entries: <S::Seq<Property<S>> as ElementSeq<S, Property<S>>>::empty(),
        }
    }

    pub fn parse<'i>(input: &mut &'i Bytes) -> MResult<PropertyList<S>>
    where
        S: ParseStorage<'i>,
    {
        trace("mqtt_property_list", |input: &mut &'i Bytes| {
            let raw = length_take(parse_variable_u32).parse_next(input)?;
            let mut entries_input: &'i Bytes = Bytes::new(raw);
            let entries = S::parse_seq::<Property<S>>(&mut entries_input, false)?;

            Ok(PropertyList { entries })
        })
        .parse_next(input)
    }

    pub fn iter(&self) -> impl Iterator<Item = Property<S>> + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Size of the length prefix plus all entries
    pub fn binary_size(&self) -> u32 {
        let payload_size = self.entries.binary_size();
        variable_u32_binary_size(payload_size) + payload_size
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        write_variable_u32(buffer, self.entries.binary_size())?;
        self.entries.write(buffer)
    }

    /// Check each entry against the allowed-property matrix and the
    /// repetition rules for the given context
    pub fn validate(&self, context: PropertyContext) -> Result<(), ValidationError> {
        let mut seen: u64 = 0;

        for property in self.entries.iter() {
            let property_type = property.property_type();

            if !property_type.allowed_in(context) {
                return Err(ValidationError::PropertyNotAllowed {
                    property: property_type,
                    context,
                });
            }

            let bit = 1u64 << u8::from(property_type);
            if seen & bit != 0 && !property_type.allows_repeats() {
                return Err(ValidationError::DuplicateProperty(property_type));
            }
            seen |= bit;
        }

        Ok(())
    }
}

impl<S: MqttStorage> Default for PropertyList<S> {
    fn default() -> PropertyList<S> {
        PropertyList::new()
    }
}

impl PropertyList<Owning> {
    pub fn push(&mut self, property: Property<Owning>) {
        self.entries.push(property);
    }
}

impl From<Vec<Property<Owning>>> for PropertyList<Owning> {
    fn from(entries: Vec<Property<Owning>>) -> PropertyList<Owning> {
        PropertyList { entries }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use winnow::Bytes;

    use crate::v5::error::ValidationError;
    use crate::v5::properties::Property;
    use crate::v5::properties::PropertyContext;
    use crate::v5::properties::PropertyList;
    use crate::v5::properties::PropertyType;
    use crate::v5::storage::Borrowing;
    use crate::v5::storage::Owning;
    use crate::v5::test::TestWriter;

    #[test]
    fn check_empty_list_is_one_zero_byte() {
        let list = PropertyList::<Owning>::new();
        let mut writer = TestWriter { buffer: Vec::new() };

        list.write(&mut writer).unwrap();

        assert_eq!(writer.buffer, &[0x00]);
        assert_eq!(list.binary_size(), 1);
    }

    #[test]
    fn check_single_property_roundtrip() {
        let list = PropertyList::from(vec![Property::<Owning>::TopicAlias(16)]);
        let mut writer = TestWriter { buffer: Vec::new() };

        list.write(&mut writer).unwrap();
        assert_eq!(writer.buffer, &[0x03, 0x23, 0x00, 0x10]);

        let parsed = PropertyList::<Owning>::parse(&mut Bytes::new(&writer.buffer)).unwrap();
        assert_eq!(parsed, list);
    }

    #[test]
    fn check_every_value_shape_roundtrips() {
        let list = PropertyList::from(vec![
            Property::<Owning>::PayloadFormatIndicator(1),
            Property::TopicAlias(0x1020),
            Property::MessageExpiryInterval(86_400),
            Property::SubscriptionIdentifier(16_384),
            Property::ContentType("application/cbor".to_owned()),
            Property::CorrelationData(vec![0xDE, 0xAD]),
            Property::UserProperty("k".to_owned(), "v".to_owned()),
        ]);

        let mut writer = TestWriter { buffer: Vec::new() };
        list.write(&mut writer).unwrap();
        assert_eq!(list.binary_size() as usize, writer.buffer.len());

        let parsed = PropertyList::<Owning>::parse(&mut Bytes::new(&writer.buffer)).unwrap();
        assert_eq!(parsed, list);
    }

    #[test]
    fn check_list_length_must_match_exactly() {
        // Length prefix says two bytes, but the TopicAlias value needs three
        let input = [0x02, 0x23, 0x00];

        PropertyList::<Owning>::parse(&mut Bytes::new(&input)).unwrap_err();
    }

    #[test]
    fn check_unknown_identifier_is_rejected() {
        let input = [0x02, 0x7E, 0x00];

        PropertyList::<Owning>::parse(&mut Bytes::new(&input)).unwrap_err();
    }

    #[test]
    fn check_borrowing_cursor_matches_eager_decode() {
        let mut list = PropertyList::<Owning>::new();
        list.push(Property::ContentType("text/plain".to_owned()));
        list.push(Property::UserProperty("foo".to_owned(), "bar".to_owned()));
        list.push(Property::UserProperty("foo".to_owned(), "baz".to_owned()));

        let mut writer = TestWriter { buffer: Vec::new() };
        list.write(&mut writer).unwrap();

        let view = PropertyList::<Borrowing<'_>>::parse(&mut Bytes::new(&writer.buffer)).unwrap();
        assert_eq!(view.len(), 3);

        let lazy: Vec<PropertyType> = view.iter().map(|p| p.property_type()).collect();
        let eager: Vec<PropertyType> = list.iter().map(|p| p.property_type()).collect();
        assert_eq!(lazy, eager);
    }

    #[test]
    fn check_validate_rejects_foreign_properties() {
        let list = PropertyList::from(vec![Property::<Owning>::TopicAlias(16)]);

        assert_eq!(list.validate(PropertyContext::Publish), Ok(()));
        assert_eq!(
            list.validate(PropertyContext::Connect),
            Err(ValidationError::PropertyNotAllowed {
                property: PropertyType::TopicAlias,
                context: PropertyContext::Connect,
            })
        );
    }

    #[test]
    fn check_validate_rejects_duplicates_but_not_repeatable_ones() {
        let list = PropertyList::from(vec![
            Property::<Owning>::TopicAlias(16),
            Property::<Owning>::TopicAlias(17),
        ]);
        assert_eq!(
            list.validate(PropertyContext::Publish),
            Err(ValidationError::DuplicateProperty(PropertyType::TopicAlias))
        );

        let list = PropertyList::from(vec![
            Property::<Owning>::UserProperty("a".to_owned(), "b".to_owned()),
            Property::<Owning>::UserProperty("a".to_owned(), "c".to_owned()),
        ]);
        assert_eq!(list.validate(PropertyContext::Publish), Ok(()));
    }

    #[test]
    fn check_will_context() {
        let list = PropertyList::from(vec![Property::<Owning>::WillDelayInterval(30)]);

        assert_eq!(list.validate(PropertyContext::Will), Ok(()));
        assert_eq!(
            list.validate(PropertyContext::Publish),
            Err(ValidationError::PropertyNotAllowed {
                property: PropertyType::WillDelayInterval,
                context: PropertyContext::Publish,
            })
        );
    }
}
