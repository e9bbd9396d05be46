//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! The MQTT v5.0 wire format
//!
//! Packets are parsed from and written to raw byte buffers, exactly as laid
//! out by the OASIS MQTT v5.0 standard. Parsing comes in two flavours picked
//! by a storage type parameter: [`storage::Owning`] copies every string and
//! binary field out of the input buffer, [`storage::Borrowing`] keeps
//! pointing into it.

#![deny(missing_debug_implementations)]

pub mod bytes;
pub mod error;
pub mod fixed_header;
pub mod integers;
pub mod level;
pub mod packets;
pub mod properties;
pub mod qos;
pub mod reason_code;
pub mod storage;
pub mod strings;
pub mod variable_header;
pub mod write;


pub type MResult<O> = winnow::ModalResult<O>;
