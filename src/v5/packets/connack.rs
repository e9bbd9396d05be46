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
use crate::v5::storage::MqttStorage;
use crate::v5::storage::ParseStorage;
use crate::v5::write::WResult;
use crate::v5::write::WriteMqttPacket;

crate::v5::reason_code::make_combined_reason_code! {
    pub enum ConnackReasonCode {
        Success = crate::v5::reason_code::Success,
        UnspecifiedError = crate::v5::reason_code::UnspecifiedError,
        MalformedPacket = crate::v5::reason_code::MalformedPacket,
        ProtocolError = crate::v5::reason_code::ProtocolError,
        ImplementationSpecificError = crate::v5::reason_code::ImplementationSpecificError,
        UnsupportedProtocolVersion = crate::v5::reason_code::UnsupportedProtocolVersion,
        ClientIdentifierNotValid = crate::v5::reason_code::ClientIdentifierNotValid,
        BadUsernameOrPassword = crate::v5::reason_code::BadUsernameOrPassword,
        NotAuthorized = crate::v5::reason_code::NotAuthorized,
        ServerUnavailable = crate::v5::reason_code::ServerUnavailable,
        ServerBusy = crate::v5::reason_code::ServerBusy,
        Banned = crate::v5::reason_code::Banned,
        BadAuthenticationMethod = crate::v5::reason_code::BadAuthenticationMethod,
        TopicNameInvalid = crate::v5::reason_code::TopicNameInvalid,
        PacketTooLarge = crate::v5::reason_code::PacketTooLarge,
        QuotaExceeded = crate::v5::reason_code::QuotaExceeded,
        PayloadFormatInvalid = crate::v5::reason_code::PayloadFormatInvalid,
        RetainNotSupported = crate::v5::reason_code::RetainNotSupported,
        QoSNotSupported = crate::v5::reason_code::QoSNotSupported,
        UseAnotherServer = crate::v5::reason_code::UseAnotherServer,
        ServerMoved = crate::v5::reason_code::ServerMoved,
        ConnectionRateExceeded = crate::v5::reason_code::ConnectionRateExceeded,
    }
}

/// The server's answer to a CONNECT
#[derive(Debug, Clone, PartialEq)]
pub struct MConnack<S: MqttStorage> {
    pub session_present: bool,
    pub reason_code: ConnackReasonCode,
    pub properties: PropertyList<S>,
}

impl<S: MqttStorage> MConnack<S> {
    pub fn new(session_present: bool, reason_code: ConnackReasonCode) -> MConnack<S> {
        MConnack {
            session_present,
            reason_code,
            properties: PropertyList::new(),
        }
    }

    pub fn parse<'i>(input: &mut &'i Bytes) -> MResult<MConnack<S>>
    where
        S: ParseStorage<'i>,
    {
        trace("MConnack", |input: &mut &'i Bytes| {
            // The acknowledge flags byte holds session-present in bit 0,
            // everything above is reserved
            let flags = winnow::binary::u8(input)?;
            if flags & 0b1111_1110 != 0 {
                return Err(malformed(input, MalformedPacketError::ReservedBitsSet));
            }
            let session_present = flags & 0b0000_0001 != 0;

            let reason_code = ConnackReasonCode::parse(input)?;
            let properties = PropertyList::parse(input)?;

            Ok(MConnack {
                session_present,
                reason_code,
                properties,
            })
        })
        .parse_next(input)
    }

    pub fn binary_size(&self) -> u32 {
        1 // acknowledge flags
        + self.reason_code.binary_size()
        + self.properties.binary_size()
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        buffer.write_byte(self.session_present as u8)?;
        self.reason_code.write(buffer)?;
        self.properties.write(buffer)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.properties.validate(PropertyContext::Connack)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use winnow::Bytes;

    use crate::v5::packets::connack::ConnackReasonCode;
    use crate::v5::packets::connack::MConnack;
    use crate::v5::properties::Property;
    use crate::v5::properties::PropertyList;
    use crate::v5::storage::Owning;

    #[test]
    fn test_roundtrip_connack_no_props() {
        crate::v5::test::make_roundtrip_test!(MConnack<Owning> {
            session_present: true,
            reason_code: ConnackReasonCode::Success,
            properties: PropertyList::new(),
        });
    }

    #[test]
    fn test_roundtrip_connack_with_props() {
        crate::v5::test::make_roundtrip_test!(MConnack<Owning> {
            session_present: false,
            reason_code: ConnackReasonCode::NotAuthorized,
            properties: PropertyList::from(vec![
                Property::SessionExpiryInterval(120),
                Property::ReceiveMaximum(123),
                Property::MaximumQoS(1),
                Property::RetainAvailable(1),
                Property::MaximumPacketSize(1024),
                Property::AssignedClientIdentifier("foobar".to_owned()),
                Property::TopicAliasMaximum(1234),
                Property::ReasonString("reason".to_owned()),
                Property::ServerKeepAlive(123),
                Property::ResponseInformation("fofofo".to_owned()),
                Property::ServerReference("barbarbar".to_owned()),
                Property::AuthenticationMethod("bazbazbaz".to_owned()),
                Property::AuthenticationData(vec![0xFF, 0xFF]),
            ]),
        });
    }

    #[test]
    fn test_connack_reserved_flags_are_rejected() {
        let input = [0x02, 0x00, 0x00];

        MConnack::<Owning>::parse(&mut Bytes::new(&input)).unwrap_err();
    }
}
