//! Character string facade (X.690 §8.21): the eleven universal tag numbers
//! sharing `OCTET STRING`'s wire shape, decoded through a tag-number-keyed
//! table of byte-to-`String` decoders.

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::MalformedReason;
use crate::tag::universal;
use crate::{ErrorKind, InvalidArgumentReason, Reader, Result, Tag};

use super::constructed::{reassemble, Shape};

/// Decode `bytes` (the reassembled wire-shape content of a character string
/// value) into a native `String`, per the universal tag number's associated
/// character encoding.
///
/// All-or-nothing: on failure no partial `String` is returned.
fn decode_text(tag_number: u32, bytes: &[u8]) -> Result<String> {
    match tag_number {
        universal::UTF8_STRING => core::str::from_utf8(bytes)
            .map(alloc::borrow::ToOwned::to_owned)
            .map_err(|_| ErrorKind::Malformed(MalformedReason::InvalidCharacterData).into()),

        universal::BMP_STRING => {
            if bytes.len() % 2 != 0 {
                return Err(ErrorKind::Malformed(MalformedReason::InvalidCharacterData).into());
            }
            let units = bytes
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
            char::decode_utf16(units)
                .collect::<core::result::Result<String, _>>()
                .map_err(|_| ErrorKind::Malformed(MalformedReason::InvalidCharacterData).into())
        }

        universal::UNIVERSAL_STRING => {
            if bytes.len() % 4 != 0 {
                return Err(ErrorKind::Malformed(MalformedReason::InvalidCharacterData).into());
            }
            let mut text = String::with_capacity(bytes.len() / 4);
            for quad in bytes.chunks_exact(4) {
                let code = u32::from_be_bytes([quad[0], quad[1], quad[2], quad[3]]);
                let c = char::from_u32(code)
                    .ok_or(ErrorKind::Malformed(MalformedReason::InvalidCharacterData))?;
                text.push(c);
            }
            Ok(text)
        }

        universal::NUMERIC_STRING
        | universal::PRINTABLE_STRING
        | universal::IA5_STRING
        | universal::VISIBLE_STRING => {
            if !bytes.is_ascii() {
                return Err(ErrorKind::Malformed(MalformedReason::InvalidCharacterData).into());
            }
            core::str::from_utf8(bytes)
                .map(alloc::borrow::ToOwned::to_owned)
                .map_err(|_| ErrorKind::Malformed(MalformedReason::InvalidCharacterData).into())
        }

        universal::GENERAL_STRING
        | universal::GRAPHIC_STRING
        | universal::TELETEX_STRING
        | universal::VIDEOTEX_STRING => {
            // Treated as ISO 8859-1 (Latin-1): every byte maps 1:1 to the
            // Unicode scalar of the same value. Not a strict T.61/Videotex
            // decoder, which is genuinely out of scope here; see SPEC_FULL.
            Ok(bytes.iter().map(|&b| b as char).collect())
        }

        _ => Err(
            ErrorKind::InvalidArgument(InvalidArgumentReason::UnknownCharacterStringTag).into(),
        ),
    }
}

/// Collect a character string's wire-shape content (reassembling a
/// constructed encoding's segments if necessary) into an owned buffer.
fn collect_content(
    reader: &mut Reader<'_>,
    tag_number: u32,
    expected: Option<Tag>,
) -> Result<Vec<u8>> {
    let mut probe = *reader;
    let (constructed, content) =
        probe.peek_primitive_or_constructed_content(tag_number, expected)?;

    let bytes = if constructed {
        if reader.rules().is_der() {
            return Err(ErrorKind::Malformed(MalformedReason::ConstructedSegmentRules).into());
        }
        let body = probe.enter_constructed(tag_number, expected)?;
        let mut out = Vec::new();
        reassemble(body, Shape::OctetStringLike(tag_number), reader.rules(), |segment| {
            out.extend_from_slice(segment);
            Ok(())
        })?;
        out
    } else {
        probe.read_primitive_or_constructed(tag_number, expected)?;
        content.to_vec()
    };

    *reader = probe;
    Ok(bytes)
}

impl<'r> Reader<'r> {
    /// Read a character string value, dispatching on `tag_number` (one of
    /// the universal tag numbers in
    /// [`universal::CHARACTER_STRING_TAGS`](crate::tag::universal::CHARACTER_STRING_TAGS))
    /// to decode its wire-shape bytes into a native `String`.
    ///
    /// On a decode failure the cursor is left exactly where it was before
    /// the call — no characters are returned and the TLV is not consumed.
    pub fn get_character_string(&mut self, tag_number: u32) -> Result<String> {
        self.get_character_string_inner(tag_number, None)
    }

    /// As [`Reader::get_character_string`], checking the tag against
    /// `expected` instead of the `Universal`-class `tag_number`.
    pub fn get_character_string_expecting(
        &mut self,
        tag_number: u32,
        expected: Tag,
    ) -> Result<String> {
        self.get_character_string_inner(tag_number, Some(expected))
    }

    fn get_character_string_inner(
        &mut self,
        tag_number: u32,
        expected: Option<Tag>,
    ) -> Result<String> {
        check_known_tag_number(tag_number)?;

        // Validate and decode against a throwaway copy first so a character
        // decode failure leaves `self` untouched, per the all-or-nothing
        // contract.
        let mut probe = *self;
        let bytes = collect_content(&mut probe, tag_number, expected)?;
        let text = decode_text(tag_number, &bytes)?;
        *self = probe;
        Ok(text)
    }

    /// Decode a character string value and copy its UTF-8 representation
    /// into `dst`, returning the number of bytes written.
    ///
    /// Returns `Ok(None)` without advancing the cursor if `dst` is too small
    /// for the decoded text; a wire-format or character-decode violation is
    /// still a hard error.
    pub fn try_copy_character_string(
        &mut self,
        tag_number: u32,
        dst: &mut [u8],
    ) -> Result<Option<usize>> {
        self.try_copy_character_string_inner(tag_number, None, dst)
    }

    /// As [`Reader::try_copy_character_string`], checking the tag against
    /// `expected` instead of the `Universal`-class `tag_number`.
    pub fn try_copy_character_string_expecting(
        &mut self,
        tag_number: u32,
        expected: Tag,
        dst: &mut [u8],
    ) -> Result<Option<usize>> {
        self.try_copy_character_string_inner(tag_number, Some(expected), dst)
    }

    fn try_copy_character_string_inner(
        &mut self,
        tag_number: u32,
        expected: Option<Tag>,
        dst: &mut [u8],
    ) -> Result<Option<usize>> {
        check_known_tag_number(tag_number)?;

        let mut probe = *self;
        let bytes = collect_content(&mut probe, tag_number, expected)?;
        let text = decode_text(tag_number, &bytes)?;

        if text.len() > dst.len() {
            return Ok(None);
        }
        dst[..text.len()].copy_from_slice(text.as_bytes());
        *self = probe;
        Ok(Some(text.len()))
    }

    /// Copy a character string value's raw wire-shape bytes (undecoded, no
    /// character-set interpretation) into `dst`, reassembling a constructed
    /// encoding's segments if necessary.
    ///
    /// Returns `Ok(None)` without advancing the cursor if `dst` is too
    /// small.
    pub fn try_copy_character_string_bytes(
        &mut self,
        tag_number: u32,
        dst: &mut [u8],
    ) -> Result<Option<usize>> {
        self.try_copy_character_string_bytes_inner(tag_number, None, dst)
    }

    /// As [`Reader::try_copy_character_string_bytes`], checking the tag
    /// against `expected` instead of the `Universal`-class `tag_number`.
    pub fn try_copy_character_string_bytes_expecting(
        &mut self,
        tag_number: u32,
        expected: Tag,
        dst: &mut [u8],
    ) -> Result<Option<usize>> {
        self.try_copy_character_string_bytes_inner(tag_number, Some(expected), dst)
    }

    fn try_copy_character_string_bytes_inner(
        &mut self,
        tag_number: u32,
        expected: Option<Tag>,
        dst: &mut [u8],
    ) -> Result<Option<usize>> {
        check_known_tag_number(tag_number)?;

        let mut probe = *self;
        let bytes = collect_content(&mut probe, tag_number, expected)?;

        if bytes.len() > dst.len() {
            return Ok(None);
        }
        dst[..bytes.len()].copy_from_slice(&bytes);
        *self = probe;
        Ok(Some(bytes.len()))
    }
}

/// Reject a `tag_number` that isn't one of the recognized character string
/// universal tag numbers before attempting to read anything.
fn check_known_tag_number(tag_number: u32) -> Result<()> {
    if universal::CHARACTER_STRING_TAGS.contains(&tag_number) {
        Ok(())
    } else {
        Err(ErrorKind::InvalidArgument(InvalidArgumentReason::UnknownCharacterStringTag).into())
    }
}
