//! `BIT STRING` (X.690 §8.6).

use crate::error::MalformedReason;
use crate::tag::universal;
use crate::{ErrorKind, Reader, Result, Tag};

#[cfg(feature = "alloc")]
use super::constructed::{check_trailing_bits_zero, reassemble, Shape};

/// Validate and split a primitive BIT STRING's content into its unused-bit
/// count and payload, without checking trailing-bit canonicality (callers
/// that need the DER/CER trailing-zero check call
/// [`crate::asn1::constructed::check_trailing_bits_zero`] separately, since
/// for a constructed value that check only makes sense on the final,
/// reassembled byte).
fn split_primitive_content(content: &[u8]) -> Result<(u8, &[u8])> {
    let first = *content
        .first()
        .ok_or(ErrorKind::Malformed(MalformedReason::InvalidContent))?;
    if first > 7 {
        return Err(ErrorKind::Malformed(MalformedReason::BitStringUnusedBits).into());
    }
    if content.len() == 1 && first != 0 {
        return Err(ErrorKind::Malformed(MalformedReason::BitStringUnusedBits).into());
    }
    Ok((first, &content[1..]))
}

/// Compute the *normalized* last payload byte of a BIT STRING: the raw last
/// byte with its `unused_bits` low-order (trailing) bits forced to zero.
///
/// Exposed so callers that accept a non-canonical BER BIT STRING (whose
/// trailing bits the reader does not itself clear in the raw slice it
/// returns) can still obtain the canonical byte value without recomputing
/// the mask themselves.
pub fn normalized_last_byte(unused_bits: u8, payload: &[u8]) -> Option<u8> {
    let &last = payload.last()?;
    let mask = if unused_bits == 0 {
        0xFF
    } else {
        0xFFu8 << unused_bits
    };
    Some(last & mask)
}

impl<'r> Reader<'r> {
    /// Read a primitive `BIT STRING`'s unused-bit count and payload,
    /// returning `Ok(None)` without advancing the cursor if the value is
    /// actually encoded in constructed form (use
    /// [`Reader::try_copy_bit_string_bytes`] to also handle that case).
    pub fn try_get_primitive_bit_string_value(&mut self) -> Result<Option<(u8, &'r [u8])>> {
        self.try_get_primitive_bit_string_value_inner(None)
    }

    /// As [`Reader::try_get_primitive_bit_string_value`], checking the tag
    /// against `expected` instead of the `BIT STRING` universal tag.
    pub fn try_get_primitive_bit_string_value_expecting(
        &mut self,
        expected: Tag,
    ) -> Result<Option<(u8, &'r [u8])>> {
        self.try_get_primitive_bit_string_value_inner(Some(expected))
    }

    fn try_get_primitive_bit_string_value_inner(
        &mut self,
        expected: Option<Tag>,
    ) -> Result<Option<(u8, &'r [u8])>> {
        let (constructed, content) =
            self.peek_primitive_or_constructed_content(universal::BIT_STRING, expected)?;
        if constructed {
            return Ok(None);
        }

        let (unused, payload) = split_primitive_content(content)?;
        check_der_cer_trailing_bits(self.rules(), unused, payload)?;

        self.read_primitive_content(universal::BIT_STRING, expected)?;
        Ok(Some((unused, payload)))
    }
}

#[cfg(not(feature = "alloc"))]
fn check_der_cer_trailing_bits(
    rules: crate::EncodingRules,
    unused_bits: u8,
    payload: &[u8],
) -> Result<()> {
    if !rules.requires_minimal_encoding() {
        return Ok(());
    }
    let mask = if unused_bits == 0 {
        0
    } else {
        (1u8 << unused_bits) - 1
    };
    if let Some(&last) = payload.last() {
        if last & mask != 0 {
            return Err(ErrorKind::Malformed(MalformedReason::BitStringTrailingBitsNonzero).into());
        }
    }
    Ok(())
}

#[cfg(feature = "alloc")]
fn check_der_cer_trailing_bits(
    rules: crate::EncodingRules,
    unused_bits: u8,
    payload: &[u8],
) -> Result<()> {
    check_trailing_bits_zero(rules, unused_bits, payload.last().copied())
}

#[cfg(feature = "alloc")]
impl<'r> Reader<'r> {
    /// Read a `BIT STRING`'s unused-bit count and payload into `dst`,
    /// reassembling a constructed encoding's segments if necessary.
    ///
    /// Returns `Ok(None)` without advancing the cursor if `dst` is too small
    /// to hold the reassembled payload; a format violation is still a hard
    /// error.
    pub fn try_copy_bit_string_bytes(&mut self, dst: &mut [u8]) -> Result<Option<(u8, usize)>> {
        self.try_copy_bit_string_bytes_inner(dst, None)
    }

    /// As [`Reader::try_copy_bit_string_bytes`], checking the tag against
    /// `expected` instead of the `BIT STRING` universal tag.
    pub fn try_copy_bit_string_bytes_expecting(
        &mut self,
        dst: &mut [u8],
        expected: Tag,
    ) -> Result<Option<(u8, usize)>> {
        self.try_copy_bit_string_bytes_inner(dst, Some(expected))
    }

    pub(crate) fn try_copy_bit_string_bytes_inner(
        &mut self,
        dst: &mut [u8],
        expected: Option<Tag>,
    ) -> Result<Option<(u8, usize)>> {
        let mut probe = *self;
        let (constructed, content) =
            probe.peek_primitive_or_constructed_content(universal::BIT_STRING, expected)?;

        let (unused, written) = if constructed {
            if self.rules().is_der() {
                return Err(
                    ErrorKind::Malformed(MalformedReason::ConstructedSegmentRules).into(),
                );
            }
            let body = probe.enter_constructed(universal::BIT_STRING, expected)?;
            let mut pool = crate::secure_buffer::BufferPool::new();
            let mut scratch = pool.rent(dst.len().max(64));
            let result = reassemble(body, Shape::BitString, self.rules(), |segment| {
                scratch.extend_from_slice(segment);
                Ok(())
            })?;
            if result.len > dst.len() {
                return Ok(None);
            }
            check_trailing_bits_zero(self.rules(), result.unused_bits, scratch.last().copied())?;
            dst[..result.len].copy_from_slice(&scratch[..result.len]);
            (result.unused_bits, result.len)
        } else {
            let (unused, payload) = split_primitive_content(content)?;
            if payload.len() > dst.len() {
                return Ok(None);
            }
            check_trailing_bits_zero(self.rules(), unused, payload.last().copied())?;
            dst[..payload.len()].copy_from_slice(payload);
            probe.read_primitive_content(universal::BIT_STRING, expected)?;
            (unused, payload.len())
        };

        *self = probe;
        Ok(Some((unused, written)))
    }
}

/// Backing integer type a [`flagset::Flags`] enumeration may use for
/// [`Reader::get_named_bit_list_value`] — `u8`, `u16`, `u32`, or `u64`.
///
/// Implemented only for these four widths, matching the typed `INTEGER`
/// accessors; a BIT STRING whose meaningful content exceeds the chosen
/// width's byte length is rejected rather than silently truncated.
#[cfg(feature = "flags")]
pub trait NamedBitListRepr: Sized + Copy + Default {
    /// Number of bytes in this type's representation.
    const BYTE_LEN: usize;

    /// Set the bit at `index` (counting from the least-significant bit).
    fn with_bit_set(self, index: u32) -> Self;

    /// Test whether the bit at `index` is set.
    fn bit_is_set(self, index: u32) -> bool;
}

#[cfg(feature = "flags")]
macro_rules! impl_named_bit_list_repr {
    ($ty:ty) => {
        impl NamedBitListRepr for $ty {
            const BYTE_LEN: usize = core::mem::size_of::<$ty>();

            fn with_bit_set(self, index: u32) -> Self {
                self | (1 as $ty) << index
            }

            fn bit_is_set(self, index: u32) -> bool {
                self & ((1 as $ty) << index) != 0
            }
        }
    };
}

#[cfg(feature = "flags")]
impl_named_bit_list_repr!(u8);
#[cfg(feature = "flags")]
impl_named_bit_list_repr!(u16);
#[cfg(feature = "flags")]
impl_named_bit_list_repr!(u32);
#[cfg(feature = "flags")]
impl_named_bit_list_repr!(u64);

#[cfg(all(feature = "flags", feature = "alloc"))]
impl<'r> Reader<'r> {
    /// Read a `BIT STRING` as a `NamedBitList` flags value.
    ///
    /// Bit 0 of byte 0 (the first, most significant bit on the wire) maps to
    /// representation bit 0 (value `1`), bit 1 to representation bit 1
    /// (value `2`), and so on — the reverse of ASN.1 wire order, matching
    /// the conventional flags convention.
    ///
    /// Under DER/CER, the last declared named bit (the bit immediately
    /// preceding the unused bits) must be set; X.690 §11.2.2 requires
    /// trailing zero bits of a NamedBitList to be omitted from the encoding
    /// entirely; since the unused-bit count can't literally shrink further
    /// without also dropping a would-be-set bit, a declared but all-zero
    /// tail is rejected by requiring the final declared bit to be `1`.
    pub fn get_named_bit_list_value<T>(&mut self) -> Result<flagset::FlagSet<T>>
    where
        T: flagset::Flags,
        T::Type: NamedBitListRepr,
    {
        self.get_named_bit_list_value_inner(None)
    }

    /// As [`Reader::get_named_bit_list_value`], checking the tag against
    /// `expected` instead of the `BIT STRING` universal tag.
    pub fn get_named_bit_list_value_expecting<T>(
        &mut self,
        expected: Tag,
    ) -> Result<flagset::FlagSet<T>>
    where
        T: flagset::Flags,
        T::Type: NamedBitListRepr,
    {
        self.get_named_bit_list_value_inner(Some(expected))
    }

    fn get_named_bit_list_value_inner<T>(
        &mut self,
        expected: Option<Tag>,
    ) -> Result<flagset::FlagSet<T>>
    where
        T: flagset::Flags,
        T::Type: NamedBitListRepr,
    {
        let mut buf = [0u8; 8];
        let width = T::Type::BYTE_LEN.min(buf.len());

        let (unused, written) = self
            .try_copy_bit_string_bytes_inner(&mut buf[..width], expected)?
            .ok_or(ErrorKind::Malformed(MalformedReason::InvalidContent))?;

        let total_bits = written
            .checked_mul(8)
            .and_then(|bits| bits.checked_sub(unused as usize))
            .ok_or(ErrorKind::Malformed(MalformedReason::InvalidContent))?;

        if self.rules().requires_minimal_encoding() && total_bits > 0 {
            let last_wire_bit = total_bits - 1;
            let byte_index = last_wire_bit / 8;
            let bit_in_byte = 7 - (last_wire_bit % 8);
            if (buf[byte_index] >> bit_in_byte) & 1 == 0 {
                return Err(
                    ErrorKind::Malformed(MalformedReason::BitStringTrailingBitsNonzero).into(),
                );
            }
        }

        let mut repr = T::Type::default();
        for wire_bit in 0..total_bits {
            let byte_index = wire_bit / 8;
            let bit_in_byte = 7 - (wire_bit % 8);
            if (buf[byte_index] >> bit_in_byte) & 1 == 1 {
                repr = repr.with_bit_set(wire_bit as u32);
            }
        }

        Ok(flagset::FlagSet::new_truncated(repr))
    }
}
