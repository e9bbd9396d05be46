//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Errors reported by the codec
//!
//! Parsing distinguishes between input that is merely truncated
//! ([`MqttError::NeedsMoreData`]) and input that violates the wire format
//! ([`MqttError::Malformed`]). Only the latter requires closing the network
//! connection per MQTT-4.13.

use core::num::NonZeroUsize;

use winnow::error::ContextError;
use winnow::error::ErrMode;
use winnow::error::FromExternalError;
use winnow::error::Needed;

use crate::v5::properties::PropertyContext;
use crate::v5::properties::PropertyType;
use crate::v5::write::MqttWriteError;

/// The way in which a packet violates the wire format
///
/// Carried for diagnostics; every variant means the connection must go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MalformedPacketError {
    #[error("reserved header bits are set")]
    ReservedBitsSet,
    #[error("the reserved packet type 0 appeared on the wire")]
    ReservedPacketType,
    #[error("a variable byte integer does not terminate within four bytes or is not minimal")]
    BadVariableInteger,
    #[error("unknown property identifier")]
    BadPropertyIdentifier,
    #[error("the remaining length does not match the packet content")]
    LengthMismatch,
    #[error("the protocol name is not 'MQTT'")]
    BadProtocolName,
    #[error("unsupported protocol level")]
    BadProtocolLevel,
    #[error("quality of service out of range")]
    BadQualityOfService,
    #[error("retain handling out of range")]
    BadRetainHandling,
    #[error("reason code is not defined for this packet type")]
    BadReasonCode,
    #[error("a string field is not valid UTF-8")]
    BadString,
    #[error("the packet payload must contain at least one entry")]
    MissingPayload,
}

/// Top-level error of every parse and serialize entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MqttError {
    /// The input ends before a complete packet. Read more bytes and retry.
    ///
    /// When the parser knows how many additional bytes it needs, they are
    /// reported here.
    #[error("the input ends before a complete packet")]
    NeedsMoreData(Option<NonZeroUsize>),

    /// The input violates the wire format. The connection must be closed.
    #[error("malformed packet: {0}")]
    Malformed(#[from] MalformedPacketError),

    /// The output buffer cannot hold the serialized packet.
    #[error("the output buffer is too small for the packet")]
    BufferTooSmall,

    /// A field of the packet exceeds its wire-format range.
    #[error("a packet field exceeds its wire-format range")]
    OutOfRange,
}

impl From<MqttWriteError> for MqttError {
    fn from(error: MqttWriteError) -> MqttError {
        match error {
            MqttWriteError::Invariant => MqttError::OutOfRange,
            MqttWriteError::BufferTooSmall => MqttError::BufferTooSmall,
        }
    }
}

impl From<ErrMode<ContextError>> for MqttError {
    fn from(error: ErrMode<ContextError>) -> MqttError {
        match error {
            ErrMode::Incomplete(Needed::Size(n)) => MqttError::NeedsMoreData(Some(n)),
            ErrMode::Incomplete(Needed::Unknown) => MqttError::NeedsMoreData(None),
            ErrMode::Backtrack(error) | ErrMode::Cut(error) => {
                MqttError::Malformed(malformed_kind(&error))
            }
        }
    }
}

/// Recover the malformed-packet kind attached by one of the parsers.
///
/// Parsers raise specific kinds through [`malformed`]; anything winnow
/// reports on its own is a premature end of a length-delimited frame.
fn malformed_kind(error: &ContextError) -> MalformedPacketError {
    error
        .cause()
        .and_then(|cause| cause.downcast_ref::<MalformedPacketError>())
        .copied()
        .unwrap_or(MalformedPacketError::LengthMismatch)
}

/// Raise a malformed-packet error from within a winnow parser
pub(crate) fn malformed<I: winnow::stream::Stream>(
    input: &I,
    kind: MalformedPacketError,
) -> ErrMode<ContextError> {
    ErrMode::from_external_error(input, kind)
}

/// A semantic violation found by a `validate` pass after parsing
///
/// Validation is separate from parsing so trusted paths can skip it. The
/// offending property identifier and context are carried where applicable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("property {property} is not allowed in the {context:?} context")]
    PropertyNotAllowed {
        property: PropertyType,
        context: PropertyContext,
    },
    #[error("property {0} may not appear more than once")]
    DuplicateProperty(PropertyType),
    #[error("a publish with quality of service 0 cannot carry a packet identifier")]
    UnexpectedPacketIdentifier,
    #[error("a publish with quality of service above 0 requires a packet identifier")]
    MissingPacketIdentifier,
    #[error("a topic name cannot contain wildcard characters")]
    WildcardInTopicName,
    #[error("a subscribe packet must contain at least one subscription")]
    EmptySubscriptionList,
}
