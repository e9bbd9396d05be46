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
use crate::v5::write::WResult;
use crate::v5::write::WriteMqttPacket;

crate::v5::reason_code::make_combined_reason_code! {
    pub enum DisconnectReasonCode {
        AdministrativeAction = crate::v5::reason_code::AdministrativeAction,
        BadAuthenticationMethod = crate::v5::reason_code::BadAuthenticationMethod,
        ConnectionRateExceeded = crate::v5::reason_code::ConnectionRateExceeded,
        DisconnectWithWillMessage = crate::v5::reason_code::DisconnectWithWillMessage,
        ImplementationSpecificError = crate::v5::reason_code::ImplementationSpecificError,
        KeepAliveTimeout = crate::v5::reason_code::KeepAliveTimeout,
        MalformedPacket = crate::v5::reason_code::MalformedPacket,
        MaximumConnectTime = crate::v5::reason_code::MaximumConnectTime,
        MessageRateTooHigh = crate::v5::reason_code::MessageRateTooHigh,
        NormalDisconnection = crate::v5::reason_code::NormalDisconnection,
        NotAuthorized = crate::v5::reason_code::NotAuthorized,
        PacketTooLarge = crate::v5::reason_code::PacketTooLarge,
        PayloadFormatInvalid = crate::v5::reason_code::PayloadFormatInvalid,
        ProtocolError = crate::v5::reason_code::ProtocolError,
        QoSNotSupported = crate::v5::reason_code::QoSNotSupported,
        QuotaExceeded = crate::v5::reason_code::QuotaExceeded,
        ReceiveMaximumExceeded = crate::v5::reason_code::ReceiveMaximumExceeded,
        RetainNotSupported = crate::v5::reason_code::RetainNotSupported,
        ServerBusy = crate::v5::reason_code::ServerBusy,
        ServerMoved = crate::v5::reason_code::ServerMoved,
        ServerShuttingDown = crate::v5::reason_code::ServerShuttingDown,
        SessionTakenOver = crate::v5::reason_code::SessionTakenOver,
        SharedSubscriptionsNotSupported = crate::v5::reason_code::SharedSubscriptionsNotSupported,
        SubscriptionIdentifiersNotSupported = crate::v5::reason_code::SubscriptionIdentifiersNotSupported,
        TopicAliasInvalid = crate::v5::reason_code::TopicAliasInvalid,
        TopicFilterInvalid = crate::v5::reason_code::TopicFilterInvalid,
        TopicNameInvalid = crate::v5::reason_code::TopicNameInvalid,
        UnspecifiedError = crate::v5::reason_code::UnspecifiedError,
        UseAnotherServer = crate::v5::reason_code::UseAnotherServer,
        WildcardSubscriptionsNotSupported = crate::v5::reason_code::WildcardSubscriptionsNotSupported,
    }
}

/// The final packet of a connection
///
/// An empty frame (remaining length 0) means a normal disconnection with no
/// properties; the reason byte, once present, is the first byte of the
/// frame remainder.
#[derive(Debug, Clone, PartialEq)]
pub struct MDisconnect<S: MqttStorage> {
    pub reason_code: DisconnectReasonCode,
    pub properties: PropertyList<S>,
}

impl<S: MqttStorage> MDisconnect<S> {
    pub fn new(reason_code: DisconnectReasonCode) -> MDisconnect<S> {
        MDisconnect {
            reason_code,
            properties: PropertyList::new(),
        }
    }

    pub fn parse<'i>(input: &mut &'i Bytes) -> MResult<MDisconnect<S>>
    where
        S: ParseStorage<'i>,
    {
        trace("MDisconnect", |input: &mut &'i Bytes| {
            if input.is_empty() {
                return Ok(MDisconnect::new(DisconnectReasonCode::NormalDisconnection));
            }

            let reason_code = DisconnectReasonCode::parse(input)?;

            if input.is_empty() {
                return Ok(MDisconnect {
                    reason_code,
                    properties: PropertyList::new(),
                });
            }

            let properties = PropertyList::parse(input)?;

            Ok(MDisconnect {
                reason_code,
                properties,
            })
        })
        .parse_next(input)
    }

    pub fn binary_size(&self) -> u32 {
        if self.properties.is_empty() {
            if self.reason_code == DisconnectReasonCode::NormalDisconnection {
                0
            } else {
                self.reason_code.binary_size()
            }
        } else {
            self.reason_code.binary_size() + self.properties.binary_size()
        }
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        if self.properties.is_empty() {
            if self.reason_code != DisconnectReasonCode::NormalDisconnection {
                self.reason_code.write(buffer)?;
            }
            return Ok(());
        }

        self.reason_code.write(buffer)?;
        self.properties.write(buffer)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.properties.validate(PropertyContext::Disconnect)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use winnow::Bytes;

    use crate::v5::packets::disconnect::DisconnectReasonCode;
    use crate::v5::packets::disconnect::MDisconnect;
    use crate::v5::properties::Property;
    use crate::v5::properties::PropertyList;
    use crate::v5::storage::Owning;
    use crate::v5::test::TestWriter;

    #[test]
    fn test_empty_frame_means_normal_disconnection() {
        let parsed = MDisconnect::<Owning>::parse(&mut Bytes::new(&[])).unwrap();

        assert_eq!(
            parsed.reason_code,
            DisconnectReasonCode::NormalDisconnection
        );
        assert!(parsed.properties.is_empty());
    }

    #[test]
    fn test_normal_disconnection_writes_an_empty_frame() {
        let instance = MDisconnect::<Owning>::new(DisconnectReasonCode::NormalDisconnection);
        let mut writer = TestWriter { buffer: Vec::new() };

        instance.write(&mut writer).unwrap();
        assert!(writer.buffer.is_empty());
        assert_eq!(instance.binary_size(), 0);
    }

    #[test]
    fn test_reason_is_first_byte_of_the_frame() {
        // 0x8B is ServerShuttingDown
        let parsed = MDisconnect::<Owning>::parse(&mut Bytes::new(&[0x8B])).unwrap();

        assert_eq!(parsed.reason_code, DisconnectReasonCode::ServerShuttingDown);
    }

    #[test]
    fn test_roundtrip_disconnect_props() {
        crate::v5::test::make_roundtrip_test!(MDisconnect<Owning> {
            reason_code: DisconnectReasonCode::ServerMoved,
            properties: PropertyList::from(vec![
                Property::ServerReference("elsewhere.example".to_owned()),
            ]),
        });
    }
}
