//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

#![no_main]
use libfuzzer_sys::fuzz_target;
use mqtt_wire::v5::packets::MqttPacketView;
use mqtt_wire::v5::packets::OwnedMqttPacket;

fuzz_target!(|data: &[u8]| {
    let _ = OwnedMqttPacket::parse_complete(data);

    if let Ok((packet, _)) = MqttPacketView::parse_complete(data) {
        let _ = packet.validate();
        let mut buffer = vec![0u8; packet.binary_size() as usize];
        let _ = packet.serialize(&mut buffer);
    }
});
