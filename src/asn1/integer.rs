//! `INTEGER` (X.690 §8.3).

use crate::error::MalformedReason;
use crate::tag::universal;
use crate::{ErrorKind, Reader, Result, Tag};

#[cfg(feature = "bigint")]
use num_bigint::BigInt;

/// X.690 §8.3.2: content of 2+ bytes may not carry a redundant leading
/// octet — the top 9 bits must be neither all-zero nor all-one.
pub(super) fn check_minimal(content: &[u8]) -> Result<()> {
    if content.is_empty() {
        return Err(ErrorKind::Malformed(MalformedReason::InvalidContent).into());
    }

    if content.len() >= 2 {
        let (first, second) = (content[0], content[1]);
        let redundant =
            (first == 0x00 && second & 0x80 == 0) || (first == 0xFF && second & 0x80 != 0);
        if redundant {
            return Err(ErrorKind::Malformed(MalformedReason::IntegerNotMinimal).into());
        }
    }

    Ok(())
}

/// Decode two's-complement big-endian content, widened to `i128` (large
/// enough to hold every width this crate exposes a fixed accessor for).
pub(super) fn decode_signed(content: &[u8]) -> i128 {
    let mut value = i128::from(content[0] as i8);
    for &byte in &content[1..] {
        value = (value << 8) | i128::from(byte);
    }
    value
}

/// Decode unsigned content, rejecting a set sign bit (a negative value).
/// `check_minimal` having already run guarantees any leading `0x00` byte is
/// a genuine sign-clearing byte, not a redundant one.
fn decode_unsigned(content: &[u8]) -> Result<u128> {
    if content[0] & 0x80 != 0 {
        return Err(ErrorKind::Malformed(MalformedReason::InvalidContent).into());
    }

    let mut value: u128 = 0;
    for &byte in content {
        value = (value << 8) | u128::from(byte);
    }
    Ok(value)
}

macro_rules! impl_try_read_signed {
    ($name:ident, $expecting:ident, $ty:ty) => {
        #[doc = concat!("Read an `INTEGER` that fits in an [`", stringify!($ty), "`].")]
        ///
        /// Returns `Ok(None)` without advancing the cursor if the value is
        /// out of range for the requested width.
        pub fn $name(&mut self) -> Result<Option<$ty>> {
            self.try_read_signed_inner(None)
        }

        #[doc = concat!("As [`Reader::", stringify!($name), "`], checking the tag against `expected`.")]
        pub fn $expecting(&mut self, expected: Tag) -> Result<Option<$ty>> {
            self.try_read_signed_inner(Some(expected))
        }
    };
}

macro_rules! impl_try_read_unsigned {
    ($name:ident, $expecting:ident, $ty:ty) => {
        #[doc = concat!("Read an `INTEGER` that fits in a [`", stringify!($ty), "`].")]
        ///
        /// A single leading `0x00` used only to clear the sign bit is
        /// tolerated. Returns `Ok(None)` without advancing the cursor if the
        /// value is negative or out of range for the requested width.
        pub fn $name(&mut self) -> Result<Option<$ty>> {
            self.try_read_unsigned_inner(None)
        }

        #[doc = concat!("As [`Reader::", stringify!($name), "`], checking the tag against `expected`.")]
        pub fn $expecting(&mut self, expected: Tag) -> Result<Option<$ty>> {
            self.try_read_unsigned_inner(Some(expected))
        }
    };
}

impl<'r> Reader<'r> {
    /// Read an `INTEGER`'s raw two's-complement content octets, for
    /// arbitrary-precision use.
    pub fn get_integer_bytes(&mut self) -> Result<&'r [u8]> {
        self.get_integer_bytes_inner(None)
    }

    /// As [`Reader::get_integer_bytes`], checking the tag against
    /// `expected` instead of the `INTEGER` universal tag.
    pub fn get_integer_bytes_expecting(&mut self, expected: Tag) -> Result<&'r [u8]> {
        self.get_integer_bytes_inner(Some(expected))
    }

    fn get_integer_bytes_inner(&mut self, expected: Option<Tag>) -> Result<&'r [u8]> {
        check_minimal(self.peek_primitive_content(universal::INTEGER, expected)?)?;
        self.read_primitive_content(universal::INTEGER, expected)
    }

    /// Read an `INTEGER` as an arbitrary-precision signed value.
    #[cfg(feature = "bigint")]
    pub fn get_big_integer(&mut self) -> Result<BigInt> {
        Ok(BigInt::from_signed_bytes_be(self.get_integer_bytes()?))
    }

    /// As [`Reader::get_big_integer`], checking the tag against `expected`
    /// instead of the `INTEGER` universal tag.
    #[cfg(feature = "bigint")]
    pub fn get_big_integer_expecting(&mut self, expected: Tag) -> Result<BigInt> {
        Ok(BigInt::from_signed_bytes_be(
            self.get_integer_bytes_expecting(expected)?,
        ))
    }

    fn try_read_signed_inner<T>(&mut self, expected: Option<Tag>) -> Result<Option<T>>
    where
        T: TryFrom<i128>,
    {
        let content = self.peek_primitive_content(universal::INTEGER, expected)?;
        check_minimal(content)?;

        // Content wider than an i128 can't fit any requested width; bail out
        // before `decode_signed`'s shift loop would overflow.
        if content.len() > core::mem::size_of::<i128>() {
            return Ok(None);
        }
        let value = decode_signed(content);

        let narrowed = match T::try_from(value) {
            Ok(narrowed) => narrowed,
            Err(_) => return Ok(None),
        };

        self.read_primitive_content(universal::INTEGER, expected)?;
        Ok(Some(narrowed))
    }

    fn try_read_unsigned_inner<T>(&mut self, expected: Option<Tag>) -> Result<Option<T>>
    where
        T: TryFrom<u128>,
    {
        let content = self.peek_primitive_content(universal::INTEGER, expected)?;
        check_minimal(content)?;

        // Content wider than a u128 can't fit any requested width; bail out
        // before `decode_unsigned`'s shift loop would overflow.
        if content.len() > core::mem::size_of::<u128>() {
            return Ok(None);
        }

        let value = match decode_unsigned(content) {
            Ok(value) => value,
            Err(_) => return Ok(None),
        };

        let narrowed = match T::try_from(value) {
            Ok(narrowed) => narrowed,
            Err(_) => return Ok(None),
        };

        self.read_primitive_content(universal::INTEGER, expected)?;
        Ok(Some(narrowed))
    }

    impl_try_read_signed!(try_read_i8, try_read_i8_expecting, i8);
    impl_try_read_signed!(try_read_i16, try_read_i16_expecting, i16);
    impl_try_read_signed!(try_read_i32, try_read_i32_expecting, i32);
    impl_try_read_signed!(try_read_i64, try_read_i64_expecting, i64);

    impl_try_read_unsigned!(try_read_u8, try_read_u8_expecting, u8);
    impl_try_read_unsigned!(try_read_u16, try_read_u16_expecting, u16);
    impl_try_read_unsigned!(try_read_u32, try_read_u32_expecting, u32);
    impl_try_read_unsigned!(try_read_u64, try_read_u64_expecting, u64);
}

#[cfg(test)]
mod tests {
    use crate::{EncodingRules, Reader};

    #[test]
    fn zero() {
        let mut reader = Reader::new(&[0x02, 0x01, 0x00], EncodingRules::Der);
        assert_eq!(reader.try_read_i8().unwrap(), Some(0));
    }

    #[test]
    fn positive_boundary_127() {
        let mut reader = Reader::new(&[0x02, 0x01, 0x7F], EncodingRules::Der);
        assert_eq!(reader.try_read_i8().unwrap(), Some(127));
    }

    #[test]
    fn requires_extra_byte_past_127() {
        let mut reader = Reader::new(&[0x02, 0x02, 0x00, 0x80], EncodingRules::Der);
        assert_eq!(reader.try_read_i16().unwrap(), Some(128));
    }

    #[test]
    fn negative_minus_128() {
        let mut reader = Reader::new(&[0x02, 0x01, 0x80], EncodingRules::Der);
        assert_eq!(reader.try_read_i8().unwrap(), Some(-128));
    }

    #[test]
    fn redundant_leading_0xff_rejected() {
        let mut reader = Reader::new(&[0x02, 0x02, 0xFF, 0x7F], EncodingRules::Der);
        assert!(reader.try_read_i16().is_err());
    }

    #[test]
    fn redundant_leading_0x00_rejected() {
        let mut reader = Reader::new(&[0x02, 0x02, 0x00, 0x00], EncodingRules::Der);
        assert!(reader.try_read_i16().is_err());
    }

    #[test]
    fn unsigned_accessor_tolerates_sign_clearing_byte() {
        let mut reader = Reader::new(&[0x02, 0x02, 0x00, 0x80], EncodingRules::Der);
        assert_eq!(reader.try_read_u8().unwrap(), Some(128));
    }

    #[test]
    fn unsigned_accessor_rejects_negative_value() {
        let mut reader = Reader::new(&[0x02, 0x01, 0x80], EncodingRules::Der);
        assert_eq!(reader.try_read_u8().unwrap(), None);
    }

    #[test]
    fn value_too_wide_returns_none_without_advancing() {
        let bytes = [0x02, 0x02, 0x01, 0x00]; // 256, doesn't fit in i8/u8
        let mut reader = Reader::new(&bytes, EncodingRules::Der);
        assert_eq!(reader.try_read_i8().unwrap(), None);
        assert_eq!(reader.remaining_len(), 4);
    }

    #[test]
    fn get_integer_bytes_returns_raw_content() {
        let mut reader = Reader::new(&[0x02, 0x02, 0x01, 0x00], EncodingRules::Der);
        assert_eq!(reader.get_integer_bytes().unwrap(), &[0x01, 0x00]);
    }

    #[test]
    fn oversized_content_returns_none_rather_than_overflowing() {
        // 20 content bytes, far wider than any fixed-width accessor (or the
        // i128/u128 intermediate `decode_signed`/`decode_unsigned` use) can
        // hold; must report "doesn't fit" rather than panic.
        let bytes: [u8; 22] = {
            let mut b = [0x01u8; 22];
            b[0] = 0x02;
            b[1] = 20;
            b
        };
        let mut reader = Reader::new(&bytes, EncodingRules::Der);
        assert_eq!(reader.try_read_i64().unwrap(), None);
        assert_eq!(reader.try_read_u64().unwrap(), None);
        assert_eq!(reader.remaining_len(), bytes.len());
    }

    #[cfg(feature = "bigint")]
    #[test]
    fn big_integer_matches_native_width_for_small_values() {
        use num_bigint::BigInt;
        let mut reader = Reader::new(&[0x02, 0x01, 0x2A], EncodingRules::Der);
        assert_eq!(reader.get_big_integer().unwrap(), BigInt::from(42));
    }
}
