//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Owning and borrowing packet storage
//!
//! Every packet type is generic over a [`MqttStorage`]. [`Owning`] copies
//! strings, binary data and repeated elements out of the input buffer, so
//! the resulting packets are plain `'static`-free values. [`Borrowing`]
//! keeps every field pointing into the parsed buffer and defers decoding of
//! repeated elements to iteration time. The choice is made per
//! instantiation; there is no runtime switch.

use core::marker::PhantomData;

use winnow::Bytes;
use winnow::error::ErrMode;
use winnow::error::ParserError;

use crate::v5::MResult;
use crate::v5::error::MalformedPacketError;
use crate::v5::error::malformed;
use crate::v5::write::WResult;
use crate::v5::write::WriteMqttPacket;

/// How a packet materializes the variable-length parts of the wire format
pub trait MqttStorage: Sized + core::fmt::Debug + Clone + PartialEq {
    type Str: AsRef<str> + core::fmt::Debug + Clone + PartialEq;
    type Bin: AsRef<[u8]> + core::fmt::Debug + Clone + PartialEq;
    type Seq<T: WireElement<Self>>: ElementSeq<Self, T>;
}

/// Ties a storage to the lifetime of the buffer being parsed
///
/// [`Owning`] implements this for every input lifetime, [`Borrowing`] only
/// for its own.
pub trait ParseStorage<'i>: MqttStorage {
    fn make_str(s: &'i str) -> Self::Str;
    fn make_bin(bytes: &'i [u8]) -> Self::Bin;

    /// Decode elements of `T` until `input` is exhausted.
    ///
    /// With `at_least_one`, an empty input is rejected as
    /// [`MalformedPacketError::MissingPayload`].
    fn parse_seq<T>(input: &mut &'i Bytes, at_least_one: bool) -> MResult<Self::Seq<T>>
    where
        T: ParseElement<'i, Self>;
}

/// One fixed-layout element of a repeated payload section
pub trait WireElement<S: MqttStorage>: Sized + core::fmt::Debug + Clone + PartialEq {
    fn binary_size(&self) -> u32;
    fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W>;
}

pub trait ParseElement<'i, S: ParseStorage<'i>>: WireElement<S> {
    fn parse(input: &mut &'i Bytes) -> MResult<Self>;
}

/// A decoded sequence of wire elements
pub trait ElementSeq<S: MqttStorage, T: WireElement<S>>:
    core::fmt::Debug + Clone + PartialEq + Sized
{
    type Iter<'s>: Iterator<Item = T>
    where
        Self: 's;

    fn empty() -> Self;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn binary_size(&self) -> u32;
    fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W>;
    fn iter(&self) -> Self::Iter<'_>;
}

/// Storage that copies out of the input buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owning;

impl MqttStorage for Owning {
    type Str = String;
    type Bin = Vec<u8>;
    type Seq<T: WireElement<Self>> = Vec<T>;
}

impl<'i> ParseStorage<'i> for Owning {
    fn make_str(s: &'i str) -> String {
        s.to_owned()
    }

    fn make_bin(bytes: &'i [u8]) -> Vec<u8> {
        bytes.to_vec()
    }

    fn parse_seq<T>(input: &mut &'i Bytes, at_least_one: bool) -> MResult<Vec<T>>
    where
        T: ParseElement<'i, Self>,
    {
        let mut elements = Vec::new();
        while !input.is_empty() {
            elements.push(T::parse(input)?);
        }
        if at_least_one && elements.is_empty() {
            return Err(malformed(input, MalformedPacketError::MissingPayload));
        }
        Ok(elements)
    }
}

/// Storage that aliases the input buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Borrowing<'i> {
    _buffer: PhantomData<&'i [u8]>,
}

impl<'i> MqttStorage for Borrowing<'i> {
    type Str = &'i str;
    type Bin = &'i [u8];
    type Seq<T: WireElement<Self>> = SeqView<'i, T>;
}

impl<'i> ParseStorage<'i> for Borrowing<'i> {
    fn make_str(s: &'i str) -> &'i str {
        s
    }

    fn make_bin(bytes: &'i [u8]) -> &'i [u8] {
        bytes
    }

    fn parse_seq<T>(input: &mut &'i Bytes, at_least_one: bool) -> MResult<SeqView<'i, T>>
    where
        T: ParseElement<'i, Self>,
    {
        let raw: &'i [u8] = *input;
        if at_least_one && raw.is_empty() {
            return Err(malformed(input, MalformedPacketError::MissingPayload));
        }

        // One full decode up front, so the cursor below cannot fail.
        let mut probe: &'i Bytes = Bytes::new(raw);
        while !probe.is_empty() {
            let _ = T::parse(&mut probe)?;
        }

        *input = Bytes::new(&raw[raw.len()..]);
        Ok(SeqView {
            raw,
            parse: T::parse,
        })
    }
}

/// A lazily decoded sequence, pointing into the parsed buffer
///
/// Construction validates that the whole slice decodes cleanly; the cursor
/// re-decodes the elements on demand.
pub struct SeqView<'i, T> {
    raw: &'i [u8],
    parse: fn(&mut &'i Bytes) -> MResult<T>,
}

impl<'i, T> Clone for SeqView<'i, T> {
    fn clone(&self) -> SeqView<'i, T> {
        *self
    }
}

impl<'i, T> Copy for SeqView<'i, T> {}

impl<'i, T> PartialEq for SeqView<'i, T> {
    fn eq(&self, other: &SeqView<'i, T>) -> bool {
        self.raw == other.raw
    }
}

impl<'i, T> core::fmt::Debug for SeqView<'i, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SeqView").field("raw", &self.raw).finish()
    }
}

impl<'i, T> ElementSeq<Borrowing<'i>, T> for SeqView<'i, T>
where
    T: WireElement<Borrowing<'i>>,
{
    type Iter<'s>
        = SeqViewIter<'i, T>
    where
        Self: 's;

    fn empty() -> SeqView<'i, T> {
        SeqView {
            raw: &[],
            parse: |input| Err(ErrMode::from_input(input)),
        }
    }

    fn len(&self) -> usize {
        self.iter().count()
    }

    fn binary_size(&self) -> u32 {
        self.raw.len() as u32
    }

    fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        buffer.write_slice(self.raw)
    }

    fn iter(&self) -> SeqViewIter<'i, T> {
        SeqViewIter {
            rest: Bytes::new(self.raw),
            parse: self.parse,
        }
    }
}

impl<S, T> ElementSeq<S, T> for Vec<T>
where
    S: MqttStorage,
    T: WireElement<S>,
{
    type Iter<'s>
        = core::iter::Cloned<core::slice::Iter<'s, T>>
    where
        Self: 's;

    fn empty() -> Vec<T> {
        Vec::new()
    }

    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn binary_size(&self) -> u32 {
        self.as_slice()
            .iter()
            .map(|element| element.binary_size())
            .sum()
    }

    fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        for element in self.as_slice() {
            element.write(buffer)?;
        }
        Ok(())
    }

    fn iter(&self) -> Self::Iter<'_> {
        self.as_slice().iter().cloned()
    }
}

#[allow(missing_debug_implementations)]
pub struct SeqViewIter<'i, T> {
    rest: &'i Bytes,
    parse: fn(&mut &'i Bytes) -> MResult<T>,
}

impl<'i, T> Iterator for SeqViewIter<'i, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.rest.is_empty() {
            return None;
        }

        Some((self.parse)(&mut self.rest).expect("sequence views are validated when built"))
    }
}
