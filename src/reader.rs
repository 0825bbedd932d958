//! A cursor over an immutable, in-memory BER/CER/DER message.

use crate::error::{InvalidArgumentReason, MalformedReason};
use crate::tag::Class;
use crate::{EncodingRules, ErrorKind, Header, Length, Result, Tag};

/// Reject an explicit `expected` tag of class `Universal` whose number
/// doesn't match the accessor's own universal tag number, e.g. calling the
/// `OCTET STRING` accessor while claiming to expect `INTEGER` (X.690 §4.13,
/// §7).
fn check_expected_universal_number(universal_number: u32, expected: Option<Tag>) -> Result<()> {
    if let Some(tag) = expected {
        if tag.class() == Class::Universal && tag.number() != universal_number {
            return Err(ErrorKind::InvalidArgument(
                InvalidArgumentReason::WrongUniversalTagForAccessor,
            )
            .into());
        }
    }
    Ok(())
}

/// The span of one complete TLV production relative to the start of a
/// [`Reader`]'s remaining input: the length of the header, the length of
/// the content (excluding any trailing end-of-contents marker), and the
/// total number of bytes the production occupies on the wire (including
/// that marker, for an indefinite-length value).
#[derive(Copy, Clone, Debug)]
struct TlvSpan {
    header: Header,
    header_len: usize,
    content_len: usize,
    total_len: usize,
}

/// A cursor over a byte slice, decoding one TLV production at a time.
///
/// A `Reader` only ever advances: every operation either consumes some
/// prefix of its remaining input and moves forward, or fails and leaves the
/// cursor exactly where it was. Nothing in this crate exposes a way to move
/// a `Reader` backwards.
///
/// Entering a constructed value (`SEQUENCE`, `SET`, or a constructed string)
/// produces a fresh `Reader` borrowed over just that value's content, so
/// nested productions can never read past their enclosing value's boundary.
#[derive(Copy, Clone, Debug)]
pub struct Reader<'r> {
    remaining: &'r [u8],
    rules: EncodingRules,
}

impl<'r> Reader<'r> {
    /// Construct a reader over `input`, decoding it under `rules`.
    pub fn new(input: &'r [u8], rules: EncodingRules) -> Self {
        Self {
            remaining: input,
            rules,
        }
    }

    /// The encoding rules this reader was constructed with.
    pub const fn rules(&self) -> EncodingRules {
        self.rules
    }

    /// The number of bytes not yet consumed.
    pub const fn remaining_len(&self) -> usize {
        self.remaining.len()
    }

    /// Has every byte of this reader's input been consumed?
    pub const fn is_exhausted(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Fail unless every byte of this reader's input has been consumed.
    ///
    /// Callers that expect a message to occupy an entire buffer (rather
    /// than being followed by further, unrelated productions) call this
    /// once decoding finishes.
    pub fn throw_if_not_empty(&self) -> Result<()> {
        if self.is_exhausted() {
            Ok(())
        } else {
            Err(ErrorKind::Malformed(MalformedReason::TrailingData).into())
        }
    }

    /// Peek at the tag of the next TLV production without consuming
    /// anything.
    pub fn peek_tag(&self) -> Result<Tag> {
        Tag::decode(self.remaining).map(|(tag, _)| tag)
    }

    /// Peek at the header (tag and length) of the next TLV production
    /// without consuming anything.
    pub(crate) fn peek_header(&self) -> Result<Header> {
        Header::decode(self.remaining, self.rules).map(|(header, _)| header)
    }

    /// Peek at the bytes of the next complete TLV production — header plus
    /// content, including a trailing end-of-contents marker for an
    /// indefinite-length value — without consuming anything.
    pub fn peek_encoded_value(&self) -> Result<&'r [u8]> {
        let span = self.tlv_span()?;
        Ok(&self.remaining[..span.total_len])
    }

    /// Peek at the content octets of the next TLV production (excluding its
    /// header and, for an indefinite-length value, its trailing
    /// end-of-contents marker) without consuming anything.
    pub fn peek_content_bytes(&self) -> Result<&'r [u8]> {
        let span = self.tlv_span()?;
        Ok(&self.remaining[span.header_len..span.header_len + span.content_len])
    }

    /// Read the bytes of the next complete TLV production, advancing the
    /// cursor past it.
    ///
    /// On failure the cursor is left exactly where it was.
    pub fn get_encoded_value(&mut self) -> Result<&'r [u8]> {
        let span = self.tlv_span()?;
        let (value, rest) = self.remaining.split_at(span.total_len);
        self.remaining = rest;
        Ok(value)
    }

    /// Decode the header and length span of the next TLV production.
    fn tlv_span(&self) -> Result<TlvSpan> {
        let (header, header_len) = Header::decode(self.remaining, self.rules)?;

        let content_len = match header.length {
            Length::Definite(len) => {
                let len = len as usize;
                if header_len.checked_add(len).filter(|&n| n <= self.remaining.len()).is_none() {
                    return Err(ErrorKind::Malformed(MalformedReason::Truncated).into());
                }
                len
            }
            Length::Indefinite => {
                seek_end_of_contents(&self.remaining[header_len..], self.rules)?
            }
        };

        let total_len = match header.length {
            Length::Definite(_) => header_len + content_len,
            Length::Indefinite => header_len + content_len + 2,
        };

        if total_len > self.remaining.len() {
            return Err(ErrorKind::Malformed(MalformedReason::Truncated).into());
        }

        Ok(TlvSpan {
            header,
            header_len,
            content_len,
            total_len,
        })
    }

    /// Decode this TLV production's header, tag-checking it against
    /// `expected` (or, absent an explicit `expected`, the given universal
    /// class tag number) and requiring a primitive (non-constructed)
    /// encoding. Returns the header's length and the TLV's total length,
    /// without consuming anything.
    fn primitive_span(&self, universal_number: u32, expected: Option<Tag>) -> Result<(usize, usize)> {
        check_expected_universal_number(universal_number, expected)?;
        let want = expected.unwrap_or_else(|| Tag::universal(false, universal_number));
        let (header, header_len) = Header::decode(self.remaining, self.rules)?;
        header.tag.assert_eq(want)?;

        if header.tag.is_constructed() {
            return Err(ErrorKind::Malformed(MalformedReason::UnexpectedTag {
                expected: Some(Tag::universal(false, universal_number)),
                actual: header.tag,
            })
            .into());
        }

        // Header::decode already rejects indefinite length on a primitive tag.
        let content_len = header.length.definite().unwrap_or(0) as usize;
        let total_len = header_len
            .checked_add(content_len)
            .filter(|&n| n <= self.remaining.len())
            .ok_or(ErrorKind::Malformed(MalformedReason::Truncated))?;

        Ok((header_len, total_len))
    }

    /// Peek at a primitive value's content octets without consuming
    /// anything. Used by decoders (e.g. INTEGER's redundancy check) that
    /// must validate the content before committing to consuming it.
    pub(crate) fn peek_primitive_content(
        &self,
        universal_number: u32,
        expected: Option<Tag>,
    ) -> Result<&'r [u8]> {
        let (header_len, total_len) = self.primitive_span(universal_number, expected)?;
        Ok(&self.remaining[header_len..total_len])
    }

    /// Read a primitive value's content octets, checking that its tag
    /// matches `expected` (or, absent an explicit `expected`, the given
    /// universal class tag number) and that it is not constructed.
    ///
    /// Used by the fixed-shape scalar decoders (BOOLEAN, INTEGER,
    /// ENUMERATED, NULL, OBJECT IDENTIFIER) which have no constructed form.
    pub(crate) fn read_primitive_content(
        &mut self,
        universal_number: u32,
        expected: Option<Tag>,
    ) -> Result<&'r [u8]> {
        let (header_len, total_len) = self.primitive_span(universal_number, expected)?;
        let (value, rest) = self.remaining.split_at(total_len);
        self.remaining = rest;
        Ok(&value[header_len..])
    }

    /// As [`Reader::read_primitive_content`], but only actually consumes the
    /// TLV if `accept` returns `true` for its content bytes.
    ///
    /// A tag mismatch or malformed shape is still a hard error; `accept`
    /// returning `false` is the one non-error path that leaves the cursor
    /// untouched, for `try_read_*` accessors that treat "doesn't fit the
    /// requested width" as a sentinel rather than a parse failure.
    pub(crate) fn try_read_primitive_content(
        &mut self,
        universal_number: u32,
        expected: Option<Tag>,
        accept: impl FnOnce(&[u8]) -> bool,
    ) -> Result<Option<&'r [u8]>> {
        let (header_len, total_len) = self.primitive_span(universal_number, expected)?;
        let content = &self.remaining[header_len..total_len];
        if !accept(content) {
            return Ok(None);
        }

        let (value, rest) = self.remaining.split_at(total_len);
        self.remaining = rest;
        Ok(Some(&value[header_len..]))
    }

    /// Read this TLV production's header and tag-check it against
    /// `expected` (or, absent an explicit `expected`, the given universal
    /// class tag number), requiring a constructed encoding, then return a
    /// fresh [`Reader`] bounded to its content.
    ///
    /// Used by SEQUENCE, SET OF, and the constructed forms of BIT STRING
    /// and OCTET STRING.
    pub(crate) fn enter_constructed(
        &mut self,
        universal_number: u32,
        expected: Option<Tag>,
    ) -> Result<Reader<'r>> {
        check_expected_universal_number(universal_number, expected)?;
        let want = expected.unwrap_or_else(|| Tag::universal(true, universal_number));
        let span = self.tlv_span()?;

        span.header.tag.assert_eq(want)?;
        if !span.header.tag.is_constructed() {
            return Err(ErrorKind::Malformed(MalformedReason::UnexpectedTag {
                expected: Some(Tag::universal(true, universal_number)),
                actual: span.header.tag,
            })
            .into());
        }

        let body = &self.remaining[span.header_len..span.header_len + span.content_len];
        self.remaining = &self.remaining[span.total_len..];
        Ok(Reader::new(body, self.rules))
    }

    /// Decode this TLV production's header, tag-checking its class/number
    /// against `expected` (or, absent an explicit `expected`, the given
    /// universal class tag number) while accepting either a primitive or a
    /// constructed encoding. Returns the tag's constructedness together with
    /// the header length and total length, without consuming anything.
    fn primitive_or_constructed_span(
        &self,
        universal_number: u32,
        expected: Option<Tag>,
    ) -> Result<(bool, usize, usize)> {
        check_expected_universal_number(universal_number, expected)?;
        let want_number = expected.map(Tag::number).unwrap_or(universal_number);
        let want_class = expected.map(Tag::class);

        let span = self.tlv_span()?;

        if span.header.tag.number() != want_number {
            return Err(ErrorKind::Malformed(MalformedReason::UnexpectedTag {
                expected: Some(expected.unwrap_or_else(|| Tag::universal(false, universal_number))),
                actual: span.header.tag,
            })
            .into());
        }
        if let Some(class) = want_class {
            if span.header.tag.class() != class {
                return Err(ErrorKind::Malformed(MalformedReason::UnexpectedTag {
                    expected: Some(expected.unwrap()),
                    actual: span.header.tag,
                })
                .into());
            }
        }

        Ok((span.header.tag.is_constructed(), span.header_len, span.total_len))
    }

    /// Peek at this TLV production's content octets, accepting either a
    /// primitive or a constructed encoding of `universal_number`, without
    /// consuming anything.
    ///
    /// Used by `try_*` accessors that need to inspect the shape (primitive
    /// vs. constructed) before deciding whether to commit to reading it.
    pub(crate) fn peek_primitive_or_constructed_content(
        &self,
        universal_number: u32,
        expected: Option<Tag>,
    ) -> Result<(bool, &'r [u8])> {
        let (constructed, header_len, total_len) =
            self.primitive_or_constructed_span(universal_number, expected)?;
        Ok((constructed, &self.remaining[header_len..total_len]))
    }

    /// Read this TLV production's raw content octets, accepting either a
    /// primitive or a constructed encoding of `universal_number`, without
    /// interpreting the constructed case's nested segments.
    ///
    /// Used by BIT STRING and OCTET STRING, which reassemble a constructed
    /// encoding's segments themselves.
    pub(crate) fn read_primitive_or_constructed(
        &mut self,
        universal_number: u32,
        expected: Option<Tag>,
    ) -> Result<(bool, &'r [u8])> {
        let (constructed, header_len, total_len) =
            self.primitive_or_constructed_span(universal_number, expected)?;
        let (value, rest) = self.remaining.split_at(total_len);
        self.remaining = rest;
        Ok((constructed, &value[header_len..]))
    }
}

/// Walk a nested indefinite-length body, returning the number of content
/// octets that precede its matching end-of-contents marker.
///
/// `slice` starts immediately after the header that opened the
/// indefinite-length value. This performs a single linear scan with an
/// explicit depth counter rather than recursing: each indefinite-length
/// value nested inside increments the counter and each end-of-contents
/// marker decrements it, so the counter reaches zero exactly when the
/// marker terminating the outermost value is reached. Depth is bounded by
/// the size of `slice` (each nesting level consumes at least two header
/// bytes), so this never recurses on attacker-controlled input.
pub(crate) fn seek_end_of_contents(slice: &[u8], rules: EncodingRules) -> Result<usize> {
    let mut depth: usize = 1;
    let mut offset = 0usize;

    loop {
        if offset >= slice.len() {
            return Err(ErrorKind::Malformed(MalformedReason::UnterminatedIndefiniteLength).into());
        }

        let (header, header_len) = Header::decode(&slice[offset..], rules)?;

        if header.tag.is_end_of_contents() && header.length == Length::Definite(0) {
            depth -= 1;
            offset += header_len;
            if depth == 0 {
                return Ok(offset - header_len);
            }
            continue;
        }

        if header.length.is_indefinite() {
            depth += 1;
            offset += header_len;
            continue;
        }

        let content_len = header.length.definite().unwrap_or(0) as usize;
        offset = offset
            .checked_add(header_len)
            .and_then(|n| n.checked_add(content_len))
            .filter(|&n| n <= slice.len())
            .ok_or(ErrorKind::Malformed(MalformedReason::Truncated))?;
    }
}

#[cfg(test)]
mod tests {
    use super::Reader;
    use crate::tag::universal;
    use crate::{EncodingRules, Tag};

    #[test]
    fn peek_tag_does_not_advance() {
        let reader = Reader::new(&[0x02, 0x01, 0x2A], EncodingRules::Der);
        assert_eq!(reader.peek_tag().unwrap(), Tag::universal(false, universal::INTEGER));
        assert_eq!(reader.remaining_len(), 3);
    }

    #[test]
    fn get_encoded_value_advances_past_definite_tlv() {
        let mut reader = Reader::new(&[0x02, 0x01, 0x2A, 0xFF], EncodingRules::Der);
        let value = reader.get_encoded_value().unwrap();
        assert_eq!(value, &[0x02, 0x01, 0x2A]);
        assert_eq!(reader.remaining_len(), 1);
    }

    #[test]
    fn get_encoded_value_includes_eoc_for_indefinite_constructed() {
        // SEQUENCE, indefinite length, containing one INTEGER, then EOC.
        let bytes = [0x30, 0x80, 0x02, 0x01, 0x2A, 0x00, 0x00];
        let mut reader = Reader::new(&bytes, EncodingRules::Ber);
        let value = reader.get_encoded_value().unwrap();
        assert_eq!(value, &bytes[..]);
        assert!(reader.is_exhausted());
    }

    #[test]
    fn peek_content_bytes_excludes_header_and_eoc() {
        let bytes = [0x30, 0x80, 0x02, 0x01, 0x2A, 0x00, 0x00];
        let reader = Reader::new(&bytes, EncodingRules::Ber);
        assert_eq!(reader.peek_content_bytes().unwrap(), &[0x02, 0x01, 0x2A]);
    }

    #[test]
    fn cursor_unchanged_on_failure() {
        let bytes = [0x02, 0x05, 0x2A]; // length says 5, only 1 content byte present
        let reader = Reader::new(&bytes, EncodingRules::Der);
        assert!(reader.peek_encoded_value().is_err());
        assert_eq!(reader.remaining_len(), 3);
    }

    #[test]
    fn unterminated_indefinite_length_is_rejected() {
        let bytes = [0x30, 0x80, 0x02, 0x01, 0x2A]; // no EOC
        let reader = Reader::new(&bytes, EncodingRules::Ber);
        assert!(reader.peek_encoded_value().is_err());
    }

    #[test]
    fn nested_indefinite_length_is_walked_correctly() {
        // Outer SEQUENCE, indefinite, containing an inner SEQUENCE,
        // indefinite, containing one INTEGER; both terminated by EOC.
        let bytes = [
            0x30, 0x80, // outer SEQUENCE, indefinite
            0x30, 0x80, // inner SEQUENCE, indefinite
            0x02, 0x01, 0x2A, // INTEGER 42
            0x00, 0x00, // inner EOC
            0x00, 0x00, // outer EOC
        ];
        let mut reader = Reader::new(&bytes, EncodingRules::Ber);
        let value = reader.get_encoded_value().unwrap();
        assert_eq!(value, &bytes[..]);
        assert!(reader.is_exhausted());
    }

    #[test]
    fn expecting_accessor_rejects_mismatched_universal_tag() {
        use crate::error::{ErrorKind, InvalidArgumentReason};

        let mut reader = Reader::new(&[0x02, 0x01, 0x2A], EncodingRules::Der);
        let err = reader
            .read_primitive_content(
                universal::INTEGER,
                Some(Tag::universal(false, universal::OCTET_STRING)),
            )
            .unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::InvalidArgument(InvalidArgumentReason::WrongUniversalTagForAccessor)
        ));
        assert_eq!(reader.remaining_len(), 3);
    }

    #[test]
    fn throw_if_not_empty_detects_trailing_data() {
        let reader = Reader::new(&[0x05, 0x00, 0xFF], EncodingRules::Der);
        assert!(reader.throw_if_not_empty().is_err());
        let mut reader = Reader::new(&[0x05, 0x00], EncodingRules::Der);
        let _ = reader.get_encoded_value().unwrap();
        assert!(reader.throw_if_not_empty().is_ok());
    }
}
