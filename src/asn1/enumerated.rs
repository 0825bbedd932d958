//! `ENUMERATED` (X.690 §8.4) — same wire shape as `INTEGER` under tag number 10.

use crate::error::{InvalidArgumentReason, MalformedReason};
use crate::tag::universal;
use crate::{ErrorKind, Reader, Result, Tag};

/// Marker for types that back an `ENUMERATED` value: a closed set of
/// discrete variants, each with a distinct numeric discriminant — as
/// opposed to a [`flagset::Flags`](crate::asn1::bit_string) bit-flags set,
/// which backs a `NamedBitList` instead.
///
/// A blanket impl isn't provided since there's no safe automatic way to
/// derive this; callers implement it (typically via a derive macro outside
/// this crate's scope) for their own enum types.
pub trait Enumerated: Sized {
    /// Construct this type from its decoded discriminant, if recognized.
    fn from_enumerated_value(value: i128) -> Option<Self>;
}

impl<'r> Reader<'r> {
    /// Read an `ENUMERATED` value's raw two's-complement content octets.
    pub fn get_enumerated_bytes(&mut self) -> Result<&'r [u8]> {
        self.get_enumerated_bytes_inner(None)
    }

    /// As [`Reader::get_enumerated_bytes`], checking the tag against
    /// `expected` instead of the `ENUMERATED` universal tag.
    pub fn get_enumerated_bytes_expecting(&mut self, expected: Tag) -> Result<&'r [u8]> {
        self.get_enumerated_bytes_inner(Some(expected))
    }

    fn get_enumerated_bytes_inner(&mut self, expected: Option<Tag>) -> Result<&'r [u8]> {
        if let Some(tag) = expected {
            if tag.class() == crate::tag::Class::Universal && tag.number() != universal::ENUMERATED
            {
                return Err(ErrorKind::InvalidArgument(
                    InvalidArgumentReason::WrongUniversalTagForAccessor,
                )
                .into());
            }
        }

        let content = self.peek_primitive_content(universal::ENUMERATED, expected)?;
        super::integer::check_minimal(content)?;
        self.read_primitive_content(universal::ENUMERATED, expected)
    }

    /// Read an `ENUMERATED` value into a concrete `T: Enumerated` type.
    pub fn get_enumerated_value<T: Enumerated>(&mut self) -> Result<T> {
        self.get_enumerated_value_inner(None)
    }

    /// As [`Reader::get_enumerated_value`], checking the tag against
    /// `expected` instead of the `ENUMERATED` universal tag.
    pub fn get_enumerated_value_expecting<T: Enumerated>(&mut self, expected: Tag) -> Result<T> {
        self.get_enumerated_value_inner(Some(expected))
    }

    fn get_enumerated_value_inner<T: Enumerated>(&mut self, expected: Option<Tag>) -> Result<T> {
        // Peek first: content wider than an i128 can't name any variant, and
        // we must not call `decode_signed`'s shift loop on it, nor advance
        // the cursor, before that's been ruled out.
        let content = self.peek_primitive_content(universal::ENUMERATED, expected)?;
        super::integer::check_minimal(content)?;
        if content.len() > core::mem::size_of::<i128>() {
            return Err(ErrorKind::Malformed(MalformedReason::InvalidContent).into());
        }

        let content = self.get_enumerated_bytes_inner(expected)?;
        let value = super::integer::decode_signed(content);
        T::from_enumerated_value(value)
            .ok_or_else(|| ErrorKind::Malformed(MalformedReason::InvalidContent).into())
    }
}
