//! `BOOLEAN` (X.690 §8.2).

use crate::error::MalformedReason;
use crate::{ErrorKind, Reader, Result, Tag};

impl<'r> Reader<'r> {
    /// Read a `BOOLEAN` value.
    ///
    /// `0x00` is `false`, `0xFF` is `true`. Any other single content byte is
    /// accepted as `true` under BER (X.690 §8.2.2 permits it) but rejected
    /// under CER/DER, which require the canonical `0xFF`.
    pub fn read_boolean(&mut self) -> Result<bool> {
        self.read_boolean_inner(None)
    }

    /// As [`Reader::read_boolean`], checking the tag against `expected`
    /// instead of the `BOOLEAN` universal tag.
    pub fn read_boolean_expecting(&mut self, expected: Tag) -> Result<bool> {
        self.read_boolean_inner(Some(expected))
    }

    fn read_boolean_inner(&mut self, expected: Option<Tag>) -> Result<bool> {
        let content = self.peek_primitive_content(crate::tag::universal::BOOLEAN, expected)?;

        let value = match content {
            [0x00] => false,
            [0xFF] => true,
            [_] if !self.rules().requires_minimal_encoding() => true,
            _ => return Err(ErrorKind::Malformed(MalformedReason::InvalidContent).into()),
        };

        self.read_primitive_content(crate::tag::universal::BOOLEAN, expected)?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use crate::{EncodingRules, Reader};

    #[test]
    fn der_true_and_false() {
        let mut reader = Reader::new(&[0x01, 0x01, 0xFF], EncodingRules::Der);
        assert_eq!(reader.read_boolean().unwrap(), true);

        let mut reader = Reader::new(&[0x01, 0x01, 0x00], EncodingRules::Der);
        assert_eq!(reader.read_boolean().unwrap(), false);
    }

    #[test]
    fn non_canonical_true_rejected_under_der_accepted_under_ber() {
        let bytes = [0x01, 0x01, 0x01];
        assert!(Reader::new(&bytes, EncodingRules::Der).read_boolean().is_err());
        assert!(Reader::new(&bytes, EncodingRules::Cer).read_boolean().is_err());
        assert_eq!(
            Reader::new(&bytes, EncodingRules::Ber).read_boolean().unwrap(),
            true
        );
    }

    #[test]
    fn wrong_length_rejected() {
        let bytes = [0x01, 0x02, 0xFF, 0xFF];
        assert!(Reader::new(&bytes, EncodingRules::Der).read_boolean().is_err());
    }

    #[test]
    fn cursor_unchanged_on_failure() {
        let bytes = [0x01, 0x01, 0x01];
        let mut reader = Reader::new(&bytes, EncodingRules::Der);
        assert!(reader.read_boolean().is_err());
        assert_eq!(reader.remaining_len(), 3);
    }
}
