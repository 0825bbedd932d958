//! `OBJECT IDENTIFIER` (X.690 §8.19).

use crate::error::MalformedReason;
use crate::tag::universal;
use crate::{ErrorKind, Reader, Result, Tag};

#[cfg(feature = "bigint")]
use alloc::string::String;
#[cfg(feature = "bigint")]
use num_bigint::BigUint;

/// Decode one base-128 sub-identifier starting at `content[offset]`,
/// returning its value and the number of bytes it occupied.
#[cfg(feature = "bigint")]
fn decode_sub_identifier(content: &[u8], offset: usize) -> Result<(BigUint, usize)> {
    if content.get(offset) == Some(&0x80) {
        return Err(ErrorKind::Malformed(MalformedReason::OidSubIdentifierNotMinimal).into());
    }

    let mut value = BigUint::from(0u8);
    let mut consumed = 0usize;

    loop {
        let byte = *content
            .get(offset + consumed)
            .ok_or(ErrorKind::Malformed(MalformedReason::OidTruncated))?;

        value = (value << 7u32) | BigUint::from(byte & 0x7F);
        consumed += 1;

        if byte & 0x80 == 0 {
            return Ok((value, consumed));
        }
    }
}

/// Split the first sub-identifier's value into the first two arcs, per
/// X.690 §8.19.4: `v < 40` → `(0, v)`; `v < 80` → `(1, v-40)`; else
/// `(2, v-80)`.
#[cfg(feature = "bigint")]
fn split_first_arc(value: &BigUint) -> (BigUint, BigUint) {
    if *value < BigUint::from(40u8) {
        (BigUint::from(0u8), value.clone())
    } else if *value < BigUint::from(80u8) {
        (BigUint::from(1u8), value - BigUint::from(40u8))
    } else {
        (BigUint::from(2u8), value - BigUint::from(80u8))
    }
}

impl<'r> Reader<'r> {
    /// Read an `OBJECT IDENTIFIER`'s dotted decimal textual form, e.g.
    /// `"1.2.840.113549"`.
    #[cfg(feature = "bigint")]
    pub fn read_object_identifier_as_string(&mut self) -> Result<String> {
        self.read_object_identifier_as_string_inner(None)
    }

    /// As [`Reader::read_object_identifier_as_string`], checking the tag
    /// against `expected` instead of the `OBJECT IDENTIFIER` universal tag.
    #[cfg(feature = "bigint")]
    pub fn read_object_identifier_as_string_expecting(&mut self, expected: Tag) -> Result<String> {
        self.read_object_identifier_as_string_inner(Some(expected))
    }

    #[cfg(feature = "bigint")]
    fn read_object_identifier_as_string_inner(&mut self, expected: Option<Tag>) -> Result<String> {
        use core::fmt::Write;

        let content = self.peek_primitive_content(universal::OBJECT_IDENTIFIER, expected)?;
        if content.is_empty() {
            return Err(ErrorKind::Malformed(MalformedReason::OidTruncated).into());
        }

        let (first_value, mut offset) = decode_sub_identifier(content, 0)?;
        let (arc0, arc1) = split_first_arc(&first_value);

        let mut text = String::new();
        write!(text, "{}.{}", arc0, arc1).expect("writing to a String cannot fail");

        while offset < content.len() {
            let (arc, consumed) = decode_sub_identifier(content, offset)?;
            write!(text, ".{}", arc).expect("writing to a String cannot fail");
            offset += consumed;
        }

        self.read_primitive_content(universal::OBJECT_IDENTIFIER, expected)?;
        Ok(text)
    }
}

#[cfg(test)]
#[cfg(feature = "bigint")]
mod tests {
    use crate::{EncodingRules, Reader};

    #[test]
    fn rsa_encryption_oid() {
        // 1.2.840.113549.1.1.1
        let bytes = [
            0x06, 0x09, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x01,
        ];
        let mut reader = Reader::new(&bytes, EncodingRules::Der);
        assert_eq!(
            reader.read_object_identifier_as_string().unwrap(),
            "1.2.840.113549.1.1.1"
        );
        assert!(reader.is_exhausted());
    }

    #[test]
    fn large_second_arc() {
        // 2.999.1234567890 — base-128: 999+40 = 1079 => [0x88, 0x37];
        // 1234567890 => [0x84, 0xCC, 0xD8, 0x85, 0x52].
        let bytes = [0x06, 0x07, 0x88, 0x37, 0x84, 0xCC, 0xD8, 0x85, 0x52];
        let mut reader = Reader::new(&bytes, EncodingRules::Der);
        assert_eq!(
            reader.read_object_identifier_as_string().unwrap(),
            "2.999.1234567890"
        );
        assert!(reader.is_exhausted());
    }

    #[test]
    fn leading_0x80_rejected() {
        let bytes = [0x06, 0x02, 0x80, 0x01];
        let mut reader = Reader::new(&bytes, EncodingRules::Der);
        assert!(reader.read_object_identifier_as_string().is_err());
        assert_eq!(reader.remaining_len(), 4);
    }

    #[test]
    fn truncated_sub_identifier_rejected() {
        let bytes = [0x06, 0x01, 0x80 | 0x2A];
        let mut reader = Reader::new(&bytes, EncodingRules::Der);
        assert!(reader.read_object_identifier_as_string().is_err());
    }

    #[test]
    fn empty_content_rejected() {
        let bytes = [0x06, 0x00];
        let mut reader = Reader::new(&bytes, EncodingRules::Der);
        assert!(reader.read_object_identifier_as_string().is_err());
    }
}
