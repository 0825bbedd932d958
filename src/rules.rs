//! Encoding rule sets: BER, CER, and DER.

use crate::{Error, ErrorKind, InvalidArgumentReason, Result};
use core::fmt;

/// Which of the three X.690 byte-level encodings a [`Reader`](crate::Reader)
/// enforces.
///
/// Immutable across the lifetime of a reader: every typed read consults this
/// value to decide whether e.g. an indefinite length or a non-canonical
/// BOOLEAN value is acceptable.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum EncodingRules {
    /// Basic Encoding Rules — permits many encodings of the same value.
    Ber,
    /// Canonical Encoding Rules — mandates indefinite-length constructed
    /// encodings with 1000-byte segments for primitive strings that don't
    /// fit in one segment.
    Cer,
    /// Distinguished Encoding Rules — exactly one valid encoding per value.
    Der,
}

impl EncodingRules {
    /// Does this rule set allow indefinite-length encodings?
    ///
    /// CER actually mandates indefinite length for constructed values
    /// ([`EncodingRules::is_cer`] callers enforce that separately in
    /// [`crate::Header::decode`]); it's DER alone that forbids the form
    /// outright.
    pub const fn allows_indefinite_length(self) -> bool {
        matches!(self, EncodingRules::Ber | EncodingRules::Cer)
    }

    /// Does this rule set require minimal length/tag encoding and reject
    /// non-canonical alternatives?
    pub const fn requires_minimal_encoding(self) -> bool {
        matches!(self, EncodingRules::Cer | EncodingRules::Der)
    }

    /// Does this rule set require SET OF canonical sort-order validation?
    pub const fn requires_set_of_order(self) -> bool {
        matches!(self, EncodingRules::Cer | EncodingRules::Der)
    }

    /// Is this [`EncodingRules::Cer`]?
    pub const fn is_cer(self) -> bool {
        matches!(self, EncodingRules::Cer)
    }

    /// Is this [`EncodingRules::Der`]?
    pub const fn is_der(self) -> bool {
        matches!(self, EncodingRules::Der)
    }
}

impl fmt::Display for EncodingRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EncodingRules::Ber => "BER",
            EncodingRules::Cer => "CER",
            EncodingRules::Der => "DER",
        })
    }
}

impl TryFrom<u8> for EncodingRules {
    type Error = Error;

    /// Convenience conversion for FFI-style callers; `0` = BER, `1` = CER,
    /// `2` = DER, anything else is
    /// [`InvalidArgumentReason::UnsupportedRules`].
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(EncodingRules::Ber),
            1 => Ok(EncodingRules::Cer),
            2 => Ok(EncodingRules::Der),
            _ => Err(ErrorKind::InvalidArgument(InvalidArgumentReason::UnsupportedRules).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EncodingRules;

    #[test]
    fn indefinite_length_allowed_under_ber_and_cer_not_der() {
        assert!(EncodingRules::Ber.allows_indefinite_length());
        assert!(EncodingRules::Cer.allows_indefinite_length());
        assert!(!EncodingRules::Der.allows_indefinite_length());
    }

    #[test]
    fn minimal_encoding_required_under_cer_and_der() {
        assert!(!EncodingRules::Ber.requires_minimal_encoding());
        assert!(EncodingRules::Cer.requires_minimal_encoding());
        assert!(EncodingRules::Der.requires_minimal_encoding());
    }
}
