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
    pub enum AuthReasonCode {
        ContinueAuthentication = crate::v5::reason_code::ContinueAuthentication,
        ReAuthenticate = crate::v5::reason_code::ReAuthenticate,
        Success = crate::v5::reason_code::Success,
    }
}

/// An extended-authentication exchange step
#[derive(Debug, Clone, PartialEq)]
pub struct MAuth<S: MqttStorage> {
    pub reason: AuthReasonCode,
    pub properties: PropertyList<S>,
}

impl<S: MqttStorage> MAuth<S> {
    pub fn new(reason: AuthReasonCode) -> MAuth<S> {
        MAuth {
            reason,
            properties: PropertyList::new(),
        }
    }

    pub fn parse<'i>(input: &mut &'i Bytes) -> MResult<MAuth<S>>
    where
        S: ParseStorage<'i>,
    {
        trace("MAuth", |input: &mut &'i Bytes| {
            if input.is_empty() {
                return Ok(MAuth::new(AuthReasonCode::Success));
            }

            let reason = AuthReasonCode::parse(input)?;

            if input.is_empty() {
                return Ok(MAuth {
                    reason,
                    properties: PropertyList::new(),
                });
            }

            let properties = PropertyList::parse(input)?;

            Ok(MAuth { reason, properties })
        })
        .parse_next(input)
    }

    pub fn binary_size(&self) -> u32 {
        if self.properties.is_empty() {
            if self.reason == AuthReasonCode::Success {
                0
            } else {
                self.reason.binary_size()
            }
        } else {
            self.reason.binary_size() + self.properties.binary_size()
        }
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        if self.properties.is_empty() {
            if self.reason != AuthReasonCode::Success {
                self.reason.write(buffer)?;
            }
            return Ok(());
        }

        self.reason.write(buffer)?;
        self.properties.write(buffer)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.properties.validate(PropertyContext::Auth)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use winnow::Bytes;

    use crate::v5::packets::auth::AuthReasonCode;
    use crate::v5::packets::auth::MAuth;
    use crate::v5::properties::Property;
    use crate::v5::properties::PropertyList;
    use crate::v5::storage::Owning;

    #[test]
    fn test_empty_frame_defaults_to_success() {
        let parsed = MAuth::<Owning>::parse(&mut Bytes::new(&[])).unwrap();

        assert_eq!(parsed.reason, AuthReasonCode::Success);
        assert!(parsed.properties.is_empty());
    }

    #[test]
    fn test_roundtrip_auth_props() {
        crate::v5::test::make_roundtrip_test!(MAuth<Owning> {
            reason: AuthReasonCode::ContinueAuthentication,
            properties: PropertyList::from(vec![
                Property::AuthenticationMethod("SCRAM-SHA-1".to_owned()),
                Property::AuthenticationData(vec![0x00, 0x01]),
                Property::ReasonString("keep going".to_owned()),
                Property::UserProperty("f".to_owned(), "hj".to_owned()),
            ]),
        });
    }
}
