//! ASN.1 tags: the identifier octet(s) that lead every TLV production.

mod class;
mod number;

pub use self::{class::Class, number::TagNumber};

use core::fmt;

use crate::error::MalformedReason;
use crate::{ErrorKind, Result};

/// Indicator bit (bit 6 of the first identifier octet) for constructed
/// (vs. primitive) form.
const CONSTRUCTED_FLAG: u8 = 0b0010_0000;

/// Universal tag numbers predefined by X.680, as used throughout this crate.
pub mod universal {
    /// `BOOLEAN`
    pub const BOOLEAN: u32 = 1;
    /// `INTEGER`
    pub const INTEGER: u32 = 2;
    /// `BIT STRING`
    pub const BIT_STRING: u32 = 3;
    /// `OCTET STRING`
    pub const OCTET_STRING: u32 = 4;
    /// `NULL`
    pub const NULL: u32 = 5;
    /// `OBJECT IDENTIFIER`
    pub const OBJECT_IDENTIFIER: u32 = 6;
    /// `ENUMERATED`
    pub const ENUMERATED: u32 = 10;
    /// `UTF8String`
    pub const UTF8_STRING: u32 = 12;
    /// `SEQUENCE` / `SEQUENCE OF`
    pub const SEQUENCE: u32 = 16;
    /// `SET` / `SET OF`
    pub const SET: u32 = 17;
    /// `NumericString`
    pub const NUMERIC_STRING: u32 = 18;
    /// `PrintableString`
    pub const PRINTABLE_STRING: u32 = 19;
    /// `TeletexString` (alias `T61String`)
    pub const TELETEX_STRING: u32 = 20;
    /// `VideotexString`
    pub const VIDEOTEX_STRING: u32 = 21;
    /// `IA5String`
    pub const IA5_STRING: u32 = 22;
    /// `UTCTime`
    pub const UTC_TIME: u32 = 23;
    /// `GeneralizedTime`
    pub const GENERALIZED_TIME: u32 = 24;
    /// `GraphicString`
    pub const GRAPHIC_STRING: u32 = 25;
    /// `VisibleString` (alias `ISO646String`)
    pub const VISIBLE_STRING: u32 = 26;
    /// `GeneralString`
    pub const GENERAL_STRING: u32 = 27;
    /// `UniversalString`
    pub const UNIVERSAL_STRING: u32 = 28;
    /// `BMPString`
    pub const BMP_STRING: u32 = 30;

    /// Universal tag numbers that name one of the character string types
    /// sharing the OCTET STRING wire shape (X.690 §8.21).
    pub const CHARACTER_STRING_TAGS: &[u32] = &[
        UTF8_STRING,
        NUMERIC_STRING,
        PRINTABLE_STRING,
        TELETEX_STRING,
        VIDEOTEX_STRING,
        IA5_STRING,
        GRAPHIC_STRING,
        VISIBLE_STRING,
        GENERAL_STRING,
        UNIVERSAL_STRING,
        BMP_STRING,
    ];
}

/// An ASN.1 tag: the decoded form of the identifier octet(s) at the start of
/// a TLV production.
///
/// Two tags are equal iff their class, constructedness, and tag number are
/// all equal (X.690 §8.1.2).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Tag {
    class: Class,
    constructed: bool,
    number: u32,
}

impl Tag {
    /// `EndOfContents`: `(Universal, primitive, 0)`, the two-byte `00 00`
    /// marker terminating an indefinite-length value.
    pub const END_OF_CONTENTS: Tag = Tag::new(Class::Universal, false, 0);

    /// Build a [`Tag`] from its three components.
    pub const fn new(class: Class, constructed: bool, number: u32) -> Self {
        Self {
            class,
            constructed,
            number,
        }
    }

    /// Build a `Universal`-class tag with the given constructedness and
    /// number — the common case for matching against the `universal::*`
    /// constants.
    pub const fn universal(constructed: bool, number: u32) -> Self {
        Self::new(Class::Universal, constructed, number)
    }

    /// This tag's class.
    pub const fn class(self) -> Class {
        self.class
    }

    /// Whether this tag marks a constructed (as opposed to primitive) value.
    pub const fn is_constructed(self) -> bool {
        self.constructed
    }

    /// This tag's number.
    pub const fn number(self) -> u32 {
        self.number
    }

    /// Is this the `EndOfContents` tag (ignoring length/content — callers
    /// combine this with a length-zero check)?
    pub const fn is_end_of_contents(self) -> bool {
        matches!(self.class, Class::Universal) && !self.constructed && self.number == 0
    }

    /// Assert that this tag matches `expected`'s class and number (its
    /// constructedness is not compared — BIT STRING/OCTET STRING may
    /// legally present either form).
    ///
    /// Mismatch is an [`ErrorKind::Malformed`] (the *content* of the
    /// message was wrong), not an [`ErrorKind::InvalidArgument`] (that kind
    /// is reserved for misuse by the caller, e.g. an `expected` with the
    /// wrong universal number for the accessor in use).
    pub fn assert_eq(self, expected: Tag) -> Result<Tag> {
        if self.class == expected.class && self.number == expected.number {
            Ok(self)
        } else {
            Err(ErrorKind::Malformed(MalformedReason::UnexpectedTag {
                expected: Some(expected),
                actual: self,
            })
            .into())
        }
    }

    /// Decode the leading identifier octet(s) of `input`.
    ///
    /// Returns the decoded [`Tag`] and the number of bytes consumed. Does
    /// not itself track a cursor; callers (the [`Reader`](crate::Reader))
    /// are responsible for advancing past the returned byte count.
    pub(crate) fn decode(input: &[u8]) -> Result<(Tag, usize)> {
        let first = *input
            .first()
            .ok_or(ErrorKind::Malformed(MalformedReason::Truncated))?;

        let class = Class::from_bits(first);
        let constructed = first & CONSTRUCTED_FLAG != 0;
        let low_bits = first & TagNumber::MASK;

        if low_bits != TagNumber::MASK {
            return Ok((Tag::new(class, constructed, low_bits as u32), 1));
        }

        // High-tag-number form: base-128 big-endian continuation octets.
        let mut number: u32 = 0;
        let mut consumed = 1usize;
        let mut first_continuation = true;

        loop {
            let byte = *input.get(consumed).ok_or(ErrorKind::Malformed(
                MalformedReason::Truncated,
            ))?;

            if first_continuation && byte == 0x80 {
                // X.690 §8.1.2.4.2 c): non-minimal encoding.
                return Err(ErrorKind::Malformed(MalformedReason::TagNumberInvalid).into());
            }
            first_continuation = false;

            // `u32::checked_shl` only rejects a shift *amount* >= the bit
            // width; a fixed 7-bit shift always "succeeds" even when it
            // would silently drop `number`'s top 7 bits. Reject that case
            // explicitly instead, so an oversized tag number is a hard
            // error rather than a wrapped, wrong one.
            if number > (u32::MAX >> 7) {
                return Err(ErrorKind::Malformed(MalformedReason::TagNumberInvalid).into());
            }
            number = (number << 7) | u32::from(byte & 0x7F);

            consumed += 1;

            if byte & 0x80 == 0 {
                break;
            }
        }

        if number > self::number::MAX_TAG_NUMBER {
            // X.690 §4.1: the tag number must fit in a 31-bit unsigned
            // integer.
            return Err(ErrorKind::Malformed(MalformedReason::TagNumberInvalid).into());
        }

        if number < TagNumber::MASK as u32 {
            // Would have fit in the short form; not a hard X.690 violation
            // for the *number* itself, but every real-world encoder uses
            // short form here and accepting this needlessly widens the set
            // of bytes this crate treats as equivalent under DER/CER.
            return Err(ErrorKind::Malformed(MalformedReason::TagNumberInvalid).into());
        }

        Ok((Tag::new(class, constructed, number), consumed))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let form = if self.constructed {
            "constructed"
        } else {
            "primitive"
        };

        if self.class == Class::Universal {
            let name = match self.number {
                universal::BOOLEAN => Some("BOOLEAN"),
                universal::INTEGER => Some("INTEGER"),
                universal::BIT_STRING => Some("BIT STRING"),
                universal::OCTET_STRING => Some("OCTET STRING"),
                universal::NULL => Some("NULL"),
                universal::OBJECT_IDENTIFIER => Some("OBJECT IDENTIFIER"),
                universal::ENUMERATED => Some("ENUMERATED"),
                universal::UTF8_STRING => Some("UTF8String"),
                universal::SEQUENCE => Some("SEQUENCE"),
                universal::SET => Some("SET"),
                universal::NUMERIC_STRING => Some("NumericString"),
                universal::PRINTABLE_STRING => Some("PrintableString"),
                universal::TELETEX_STRING => Some("TeletexString"),
                universal::VIDEOTEX_STRING => Some("VideotexString"),
                universal::IA5_STRING => Some("IA5String"),
                universal::UTC_TIME => Some("UTCTime"),
                universal::GENERALIZED_TIME => Some("GeneralizedTime"),
                universal::GRAPHIC_STRING => Some("GraphicString"),
                universal::VISIBLE_STRING => Some("VisibleString"),
                universal::GENERAL_STRING => Some("GeneralString"),
                universal::UNIVERSAL_STRING => Some("UniversalString"),
                universal::BMP_STRING => Some("BMPString"),
                _ => None,
            };

            match name {
                Some(name) => write!(f, "{} ({})", name, form),
                None => write!(f, "UNIVERSAL [{}] ({})", self.number, form),
            }
        } else {
            write!(f, "{} [{}] ({})", self.class, self.number, form)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{universal, Class, Tag};

    #[test]
    fn decode_short_form() {
        let (tag, consumed) = Tag::decode(&[0x02]).unwrap();
        assert_eq!(consumed, 1);
        assert_eq!(tag, Tag::universal(false, universal::INTEGER));
    }

    #[test]
    fn decode_constructed_sequence() {
        let (tag, consumed) = Tag::decode(&[0x30]).unwrap();
        assert_eq!(consumed, 1);
        assert_eq!(tag.class(), Class::Universal);
        assert!(tag.is_constructed());
        assert_eq!(tag.number(), universal::SEQUENCE);
    }

    #[test]
    fn decode_high_tag_number_form() {
        // Context-specific [33], constructed: 0xBF 0x21
        let (tag, consumed) = Tag::decode(&[0xBF, 0x21]).unwrap();
        assert_eq!(consumed, 2);
        assert_eq!(tag, Tag::new(Class::ContextSpecific, true, 33));
    }

    #[test]
    fn decode_high_tag_number_multi_byte() {
        // Private [0xFFF0], constructed: 0xFF 0x83 0xFF 0x70
        let (tag, consumed) = Tag::decode(&[0xFF, 0x83, 0xFF, 0x70]).unwrap();
        assert_eq!(consumed, 4);
        assert_eq!(tag, Tag::new(Class::Private, true, 0xFFF0));
    }

    #[test]
    fn reject_non_minimal_high_tag_number() {
        // High-tag-number form encoding a number that fits in the short form.
        assert!(Tag::decode(&[0x1F, 0x02]).is_err());
    }

    #[test]
    fn reject_leading_zero_continuation_byte() {
        assert!(Tag::decode(&[0x1F, 0x80, 0x21]).is_err());
    }

    #[test]
    fn reject_truncated_tag() {
        assert!(Tag::decode(&[]).is_err());
        assert!(Tag::decode(&[0x1F, 0x80 | 0x21]).is_err());
    }

    #[test]
    fn reject_tag_number_exceeding_31_bits() {
        // Five base-128 continuation octets can carry up to 35 bits, well
        // past the 31-bit ceiling X.690 §4.1 imposes on a tag number; this
        // must be rejected rather than silently wrapping.
        assert!(Tag::decode(&[0x1F, 0x8F, 0xFF, 0xFF, 0xFF, 0x7F]).is_err());
    }

    #[test]
    fn accept_tag_number_at_31_bit_ceiling() {
        // 0x7FFFFFFF (2^31 - 1), the largest tag number this crate accepts.
        let (tag, _) = Tag::decode(&[0x1F, 0x87, 0xFF, 0xFF, 0xFF, 0x7F]).unwrap();
        assert_eq!(tag.number(), 0x7FFF_FFFF);
    }

    #[test]
    fn end_of_contents() {
        assert!(Tag::END_OF_CONTENTS.is_end_of_contents());
        assert!(!Tag::universal(false, universal::NULL).is_end_of_contents());
    }

    #[test]
    fn assert_eq_ignores_constructedness() {
        let primitive = Tag::universal(false, universal::BIT_STRING);
        let constructed = Tag::universal(true, universal::BIT_STRING);
        assert!(primitive.assert_eq(constructed).is_ok());
    }
}
