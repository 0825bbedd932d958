//! ASN.1 length octets: definite short/long form and the BER indefinite form.

use core::fmt;

use crate::error::MalformedReason;
use crate::{EncodingRules, ErrorKind, Result};

/// Largest definite length this crate accepts, chosen to fit the platform's
/// signed 32-bit index range (X.690 doesn't itself cap lengths, but real
/// buffers do, and `i32::MAX` keeps every offset arithmetic operation in
/// this crate free of `u32` overflow without needing checked arithmetic
/// everywhere).
pub const MAX_LENGTH: u32 = i32::MAX as u32;

/// A decoded ASN.1 length.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Length {
    /// A definite length: the number of content octets follows directly.
    Definite(u32),
    /// An indefinite length: content runs until a two-byte end-of-contents
    /// marker. Only legal on a constructed encoding, and only under BER.
    Indefinite,
}

impl Length {
    /// Is this a definite length?
    pub const fn is_definite(self) -> bool {
        matches!(self, Length::Definite(_))
    }

    /// Is this the indefinite length marker?
    pub const fn is_indefinite(self) -> bool {
        matches!(self, Length::Indefinite)
    }

    /// Get the definite length value, if any.
    pub const fn definite(self) -> Option<u32> {
        match self {
            Length::Definite(n) => Some(n),
            Length::Indefinite => None,
        }
    }

    /// Decode a length field from `input` under the given `rules`.
    ///
    /// Returns the decoded [`Length`] and the number of bytes consumed.
    pub(crate) fn decode(input: &[u8], rules: EncodingRules) -> Result<(Length, usize)> {
        let first = *input
            .first()
            .ok_or(ErrorKind::Malformed(MalformedReason::Truncated))?;

        if first < 0x80 {
            return Ok((Length::Definite(u32::from(first)), 1));
        }

        if first == 0x80 {
            return if rules.allows_indefinite_length() {
                Ok((Length::Indefinite, 1))
            } else {
                Err(ErrorKind::Malformed(MalformedReason::IndefiniteLengthNotAllowed).into())
            };
        }

        if first == 0xFF {
            return Err(ErrorKind::Malformed(MalformedReason::LengthReserved).into());
        }

        let num_octets = usize::from(first & 0x7F);
        let octets = input
            .get(1..1 + num_octets)
            .ok_or(ErrorKind::Malformed(MalformedReason::Truncated))?;

        if rules.requires_minimal_encoding() {
            if octets.first() == Some(&0) {
                return Err(ErrorKind::Malformed(MalformedReason::LengthNotMinimal).into());
            }
        }

        let mut value: u64 = 0;
        for &byte in octets {
            value = value
                .checked_shl(8)
                .and_then(|v| v.checked_add(u64::from(byte)))
                .ok_or(ErrorKind::Malformed(MalformedReason::LengthOverflow))?;
        }

        if value > u64::from(MAX_LENGTH) {
            return Err(ErrorKind::Malformed(MalformedReason::LengthOverflow).into());
        }

        let value = value as u32;

        if rules.requires_minimal_encoding() && value < 0x80 {
            // Could have been encoded in short form.
            return Err(ErrorKind::Malformed(MalformedReason::LengthNotMinimal).into());
        }

        Ok((Length::Definite(value), 1 + num_octets))
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Definite(n) => fmt::Display::fmt(n, f),
            Length::Indefinite => f.write_str("indefinite"),
        }
    }
}
