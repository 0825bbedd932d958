//! TLV headers: the tag + length component that precedes every value.

use crate::error::MalformedReason;
use crate::{EncodingRules, ErrorKind, Length, Result, Tag};

/// The tag and length of a TLV production, decoded together since the
/// length's validity (definite vs. indefinite, minimality) depends on both
/// the tag's constructedness and the active [`EncodingRules`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Header {
    /// The tag identifying the type of the value that follows.
    pub tag: Tag,
    /// The length of the value's content octets.
    pub length: Length,
}

impl Header {
    /// Decode a [`Header`] from `input` under `rules`.
    ///
    /// Returns the header and the number of bytes consumed (i.e. the
    /// header's own encoded length).
    pub(crate) fn decode(input: &[u8], rules: EncodingRules) -> Result<(Header, usize)> {
        let (tag, tag_len) = Tag::decode(input)?;
        let (length, length_len) = Length::decode(&input[tag_len..], rules)?;

        if !tag.is_constructed() && length.is_indefinite() {
            // X.690 §8.1.3.2: a primitive encoding always has a definite length.
            return Err(ErrorKind::Malformed(MalformedReason::IndefiniteLengthNotAllowed).into());
        }

        if rules.is_cer() && tag.is_constructed() && length.is_definite() {
            // CER always chooses indefinite length for constructed encodings.
            return Err(
                ErrorKind::Malformed(MalformedReason::CerConstructedMustBeIndefinite).into(),
            );
        }

        Ok((Header { tag, length }, tag_len + length_len))
    }
}

#[cfg(test)]
mod tests {
    use super::Header;
    use crate::tag::universal;
    use crate::{EncodingRules, Length, Tag};

    #[test]
    fn decode_simple_integer_header() {
        let (header, consumed) = Header::decode(&[0x02, 0x01, 0x2A], EncodingRules::Der).unwrap();
        assert_eq!(header.tag, Tag::universal(false, universal::INTEGER));
        assert_eq!(header.length, Length::Definite(1));
        assert_eq!(consumed, 2);
    }

    #[test]
    fn primitive_with_indefinite_length_rejected() {
        assert!(Header::decode(&[0x02, 0x80], EncodingRules::Ber).is_err());
    }

    #[test]
    fn cer_rejects_definite_constructed() {
        let bytes = [0x30, 0x03, 0x02, 0x01, 0x01];
        assert!(Header::decode(&bytes, EncodingRules::Cer).is_err());
        assert!(Header::decode(&bytes, EncodingRules::Der).is_ok());
        assert!(Header::decode(&bytes, EncodingRules::Ber).is_ok());
    }
}
