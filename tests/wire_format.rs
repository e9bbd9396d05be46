//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Whole-frame vectors against the byte layouts of OASIS MQTT v5.0

use mqtt_wire::v5::error::MalformedPacketError;
use mqtt_wire::v5::error::MqttError;
use mqtt_wire::v5::fixed_header::PacketType;
use mqtt_wire::v5::fixed_header::check_header;
use mqtt_wire::v5::packets::MqttPacket;
use mqtt_wire::v5::packets::MqttPacketView;
use mqtt_wire::v5::packets::OwnedMqttPacket;
use mqtt_wire::v5::packets::connect::MConnect;
use mqtt_wire::v5::packets::pingreq::MPingreq;
use mqtt_wire::v5::packets::puback::MPuback;
use mqtt_wire::v5::packets::puback::PubackReasonCode;
use mqtt_wire::v5::packets::publish::MPublish;
use mqtt_wire::v5::packets::subscribe::MSubscribe;
use mqtt_wire::v5::packets::subscribe::RetainHandling;
use mqtt_wire::v5::packets::subscribe::Subscription;
use mqtt_wire::v5::packets::subscribe::SubscriptionOptions;
use mqtt_wire::v5::properties::PropertyList;
use mqtt_wire::v5::qos::QualityOfService;
use mqtt_wire::v5::variable_header::PacketIdentifier;
use pretty_assertions::assert_eq;

fn serialize(packet: &OwnedMqttPacket) -> Vec<u8> {
    let mut buffer = vec![0u8; packet.binary_size() as usize];
    let written = packet.serialize(&mut buffer).unwrap();
    assert_eq!(written, buffer.len(), "binary_size disagrees with serialize");
    buffer
}

#[test]
fn pingreq_roundtrip() {
    let packet = OwnedMqttPacket::Pingreq(MPingreq);

    let bytes = serialize(&packet);
    assert_eq!(bytes, [0xC0, 0x00]);

    let (parsed, consumed) = OwnedMqttPacket::parse_complete(&bytes).unwrap();
    assert_eq!(consumed, 2);
    assert_eq!(parsed, packet);
}

#[test]
fn connect_minimal() {
    let packet = OwnedMqttPacket::Connect(MConnect {
        keep_alive: 30,
        ..MConnect::new("a".to_owned())
    });

    let bytes = serialize(&packet);
    assert_eq!(
        bytes,
        [
            0x10, 0x0E, // fixed header, remaining length 14
            0x00, 0x04, 0x4D, 0x51, 0x54, 0x54, // "MQTT"
            0x05, // protocol level
            0x02, // clean start
            0x00, 0x1E, // keep alive 30
            0x00, // no properties
            0x00, 0x01, 0x61, // client identifier "a"
        ]
    );

    let (parsed, _) = OwnedMqttPacket::parse_complete(&bytes).unwrap();
    assert_eq!(parsed, packet);
    assert_eq!(parsed.validate(), Ok(()));
}

#[test]
fn publish_qos0() {
    let packet =
        OwnedMqttPacket::Publish(MPublish::new("/a".to_owned(), vec![0x01, 0x02, 0x03]));

    let bytes = serialize(&packet);
    assert_eq!(
        bytes,
        [0x30, 0x08, 0x00, 0x02, 0x2F, 0x61, 0x00, 0x01, 0x02, 0x03]
    );

    let (parsed, _) = OwnedMqttPacket::parse_complete(&bytes).unwrap();
    assert_eq!(parsed, packet);
}

#[test]
fn puback_shortcut() {
    let packet = OwnedMqttPacket::Puback(MPuback::new(PacketIdentifier(0x1234)));

    let bytes = serialize(&packet);
    assert_eq!(bytes, [0x40, 0x02, 0x12, 0x34]);

    let (parsed, _) = OwnedMqttPacket::parse_complete(&bytes).unwrap();
    let MqttPacket::Puback(puback) = &parsed else {
        panic!("expected a PUBACK");
    };
    assert_eq!(puback.reason, PubackReasonCode::Success);
    assert!(puback.properties.is_empty());
    assert_eq!(parsed, packet);
}

#[test]
fn subscribe_two_topics() {
    let packet = OwnedMqttPacket::Subscribe(MSubscribe::new(
        PacketIdentifier(1),
        vec![
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
    ));

    let bytes = serialize(&packet);
    assert_eq!(
        bytes,
        [
            0x82, 0x0D, // fixed header, remaining length 13
            0x00, 0x01, // packet identifier
            0x00, // no properties
            0x00, 0x01, 0x61, 0x01, // "a", QoS 1
            0x00, 0x03, 0x62, 0x2F, 0x23, 0x04, // "b/#", QoS 0, no local
        ]
    );

    let (parsed, _) = OwnedMqttPacket::parse_complete(&bytes).unwrap();
    assert_eq!(parsed, packet);
}

#[test]
fn reserved_bits_and_reserved_type_are_malformed() {
    // CONNECT with a non-zero flag nibble
    assert_eq!(
        check_header(&[0x12, 0x00]),
        Err(MqttError::Malformed(MalformedPacketError::ReservedBitsSet))
    );
    // Packet type 0 never appears on the wire
    assert_eq!(
        check_header(&[0x02, 0x00]),
        Err(MqttError::Malformed(
            MalformedPacketError::ReservedPacketType
        ))
    );

    OwnedMqttPacket::parse_complete(&[0x12, 0x00]).unwrap_err();
    OwnedMqttPacket::parse_complete(&[0x02, 0x00]).unwrap_err();
}

#[test]
fn every_frame_prefix_asks_for_more_data() {
    let packet = OwnedMqttPacket::Connect(MConnect {
        keep_alive: 30,
        username: Some("user".to_owned()),
        ..MConnect::new("prefix-check".to_owned())
    });
    let bytes = serialize(&packet);

    for cut in 0..bytes.len() {
        match OwnedMqttPacket::parse_complete(&bytes[..cut]) {
            Err(MqttError::NeedsMoreData(_)) => {}
            other => panic!("prefix of {cut} bytes produced {other:?}"),
        }
    }

    let (_, consumed) = OwnedMqttPacket::parse_complete(&bytes).unwrap();
    assert_eq!(consumed, bytes.len());
}

#[test]
fn trailing_bytes_are_left_for_the_next_frame() {
    let mut bytes = serialize(&OwnedMqttPacket::Pingreq(MPingreq));
    bytes.extend_from_slice(&[0x40, 0x02, 0x12, 0x34]);

    let (parsed, consumed) = OwnedMqttPacket::parse_complete(&bytes).unwrap();
    assert_eq!(parsed, OwnedMqttPacket::Pingreq(MPingreq));
    assert_eq!(consumed, 2);

    let (next, _) = OwnedMqttPacket::parse_complete(&bytes[consumed..]).unwrap();
    assert!(matches!(next, MqttPacket::Puback(_)));
}

#[test]
fn frame_longer_than_its_content_is_malformed() {
    // PINGREQ advertising one byte of body
    assert_eq!(
        OwnedMqttPacket::parse_complete(&[0xC0, 0x01, 0x00]),
        Err(MqttError::Malformed(MalformedPacketError::LengthMismatch))
    );
}

#[test]
fn multi_byte_remaining_length_roundtrips() {
    let packet = OwnedMqttPacket::Publish(MPublish::new(
        "bulk/data".to_owned(),
        vec![0xAB; 400],
    ));

    let bytes = serialize(&packet);
    let (packet_type, frame_length) = check_header(&bytes).unwrap();
    assert_eq!(frame_length, bytes.len());
    assert!(matches!(packet_type, PacketType::Publish { .. }));

    let (parsed, _) = OwnedMqttPacket::parse_complete(&bytes).unwrap();
    assert_eq!(parsed, packet);
}

#[test]
fn owning_and_borrowing_parses_agree() {
    let packet = OwnedMqttPacket::Publish(MPublish {
        dup: false,
        quality_of_service: QualityOfService::AtLeastOnce,
        retain: true,
        topic_name: "dual/mode".to_owned(),
        packet_identifier: Some(PacketIdentifier(5)),
        properties: PropertyList::from(vec![
            mqtt_wire::v5::properties::Property::ContentType("text/plain".to_owned()),
        ]),
        payload: b"payload".to_vec(),
    });
    let bytes = serialize(&packet);

    let (view, view_consumed) = MqttPacketView::parse_complete(&bytes).unwrap();
    let (owned, owned_consumed) = OwnedMqttPacket::parse_complete(&bytes).unwrap();
    assert_eq!(view_consumed, owned_consumed);

    // Re-serializing the borrowed view reproduces the exact frame
    let mut reserialized = vec![0u8; view.binary_size() as usize];
    let written = view.serialize(&mut reserialized).unwrap();
    assert_eq!(&reserialized[..written], bytes.as_slice());

    assert_eq!(owned, packet);
}

#[test]
fn serialize_reports_short_buffers() {
    let packet = OwnedMqttPacket::Pingreq(MPingreq);
    let mut buffer = [0u8; 1];

    assert_eq!(
        packet.serialize(&mut buffer),
        Err(MqttError::BufferTooSmall)
    );
}

#[test]
fn zero_length_client_identifier_is_accepted() {
    let packet = OwnedMqttPacket::Connect(MConnect::new(String::new()));
    let bytes = serialize(&packet);

    let (parsed, _) = OwnedMqttPacket::parse_complete(&bytes).unwrap();
    let MqttPacket::Connect(connect) = parsed else {
        panic!("expected a CONNECT");
    };
    assert_eq!(connect.client_identifier, "");
}

#[test]
fn subscribe_with_zero_entries_is_malformed() {
    // id 0x0001, empty properties, empty payload
    let frame = [0x82, 0x03, 0x00, 0x01, 0x00];

    assert_eq!(
        OwnedMqttPacket::parse_complete(&frame),
        Err(MqttError::Malformed(MalformedPacketError::MissingPayload))
    );
}
