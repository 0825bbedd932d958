//! `OCTET STRING` (X.690 §8.7).

use crate::tag::universal;
use crate::{ErrorKind, Reader, Result, Tag};

#[cfg(feature = "alloc")]
use super::constructed::{reassemble, Shape};
#[cfg(feature = "alloc")]
use crate::error::MalformedReason;

impl<'r> Reader<'r> {
    /// Read a primitive `OCTET STRING`'s content, returning `Ok(None)`
    /// without advancing the cursor if the value is actually encoded in
    /// constructed form (use [`Reader::try_copy_octet_string_bytes`] to also
    /// handle that case).
    pub fn try_get_primitive_octet_string_bytes(&mut self) -> Result<Option<&'r [u8]>> {
        self.try_get_primitive_octet_string_bytes_inner(None)
    }

    /// As [`Reader::try_get_primitive_octet_string_bytes`], checking the tag
    /// against `expected` instead of the `OCTET STRING` universal tag.
    pub fn try_get_primitive_octet_string_bytes_expecting(
        &mut self,
        expected: Tag,
    ) -> Result<Option<&'r [u8]>> {
        self.try_get_primitive_octet_string_bytes_inner(Some(expected))
    }

    fn try_get_primitive_octet_string_bytes_inner(
        &mut self,
        expected: Option<Tag>,
    ) -> Result<Option<&'r [u8]>> {
        let (constructed, content) =
            self.peek_primitive_or_constructed_content(universal::OCTET_STRING, expected)?;
        if constructed {
            return Ok(None);
        }
        self.read_primitive_content(universal::OCTET_STRING, expected)?;
        Ok(Some(content))
    }
}

#[cfg(feature = "alloc")]
impl<'r> Reader<'r> {
    /// Read an `OCTET STRING`'s content into `dst`, reassembling a
    /// constructed encoding's segments if necessary.
    ///
    /// Returns `Ok(None)` without advancing the cursor if `dst` is too small
    /// to hold the reassembled content; a format violation is still a hard
    /// error.
    pub fn try_copy_octet_string_bytes(&mut self, dst: &mut [u8]) -> Result<Option<usize>> {
        self.try_copy_octet_string_bytes_inner(dst, None)
    }

    /// As [`Reader::try_copy_octet_string_bytes`], checking the tag against
    /// `expected` instead of the `OCTET STRING` universal tag.
    pub fn try_copy_octet_string_bytes_expecting(
        &mut self,
        dst: &mut [u8],
        expected: Tag,
    ) -> Result<Option<usize>> {
        self.try_copy_octet_string_bytes_inner(dst, Some(expected))
    }

    pub(crate) fn try_copy_octet_string_bytes_inner(
        &mut self,
        dst: &mut [u8],
        expected: Option<Tag>,
    ) -> Result<Option<usize>> {
        let mut probe = *self;
        let (constructed, content) =
            probe.peek_primitive_or_constructed_content(universal::OCTET_STRING, expected)?;

        let written = if constructed {
            if self.rules().is_der() {
                return Err(
                    ErrorKind::Malformed(MalformedReason::ConstructedSegmentRules).into(),
                );
            }
            let body = probe.enter_constructed(universal::OCTET_STRING, expected)?;
            let mut pool = crate::secure_buffer::BufferPool::new();
            let mut scratch = pool.rent(dst.len().max(64));
            let result = reassemble(
                body,
                Shape::OctetStringLike(universal::OCTET_STRING),
                self.rules(),
                |segment| {
                    scratch.extend_from_slice(segment);
                    Ok(())
                },
            )?;
            if result.len > dst.len() {
                return Ok(None);
            }
            dst[..result.len].copy_from_slice(&scratch[..result.len]);
            result.len
        } else {
            if content.len() > dst.len() {
                return Ok(None);
            }
            dst[..content.len()].copy_from_slice(content);
            probe.read_primitive_content(universal::OCTET_STRING, expected)?;
            content.len()
        };

        *self = probe;
        Ok(Some(written))
    }
}

#[cfg(test)]
#[cfg(feature = "alloc")]
mod tests {
    use crate::{EncodingRules, Reader};

    #[test]
    fn primitive_octet_string() {
        let bytes = [0x04, 0x03, 0x01, 0x02, 0x03];
        let mut reader = Reader::new(&bytes, EncodingRules::Der);
        assert_eq!(
            reader.try_get_primitive_octet_string_bytes().unwrap(),
            Some(&[0x01, 0x02, 0x03][..])
        );
        assert!(reader.is_exhausted());
    }

    #[test]
    fn constructed_shape_returns_none_for_primitive_only_accessor() {
        let bytes = [0x24, 0x03, 0x04, 0x01, 0xAA];
        let mut reader = Reader::new(&bytes, EncodingRules::Ber);
        assert_eq!(
            reader.try_get_primitive_octet_string_bytes().unwrap(),
            None
        );
        assert_eq!(reader.remaining_len(), 5);
    }

    #[test]
    fn der_rejects_constructed_octet_string() {
        let bytes = [0x24, 0x03, 0x04, 0x01, 0xAA];
        let mut reader = Reader::new(&bytes, EncodingRules::Der);
        let mut dst = [0u8; 16];
        assert!(reader.try_copy_octet_string_bytes(&mut dst).is_err());
    }

    #[test]
    fn ber_reassembles_constructed_segments() {
        let bytes = [
            0x24, 0x08, // constructed OCTET STRING, length 8
            0x04, 0x02, 0x01, 0x02, // segment 1
            0x04, 0x02, 0x03, 0x04, // segment 2
        ];
        let mut reader = Reader::new(&bytes, EncodingRules::Ber);
        let mut dst = [0u8; 16];
        let written = reader.try_copy_octet_string_bytes(&mut dst).unwrap().unwrap();
        assert_eq!(&dst[..written], &[0x01, 0x02, 0x03, 0x04]);
        assert!(reader.is_exhausted());
    }

    #[test]
    #[cfg(feature = "alloc")]
    fn cer_requires_1000_byte_non_final_segments() {
        let mut bytes = alloc::vec![0x24u8, 0x80]; // constructed OCTET STRING, indefinite length
        bytes.extend([0x04, 0x82, 0x03, 0xE8]); // segment header, len=1000
        bytes.extend(core::iter::repeat(0xAA).take(1000));
        bytes.extend([0x04, 0x01, 0xBB]); // final 1-byte segment
        bytes.extend([0x00, 0x00]); // end-of-contents

        let mut reader = Reader::new(&bytes, EncodingRules::Cer);
        let mut dst = alloc::vec![0u8; 2000];
        let written = reader
            .try_copy_octet_string_bytes(&mut dst)
            .unwrap()
            .unwrap();
        assert_eq!(written, 1001);
    }

    #[test]
    fn dst_too_small_returns_none() {
        let bytes = [0x04, 0x02, 0x01, 0x02];
        let mut reader = Reader::new(&bytes, EncodingRules::Der);
        let mut dst = [0u8; 1];
        assert_eq!(reader.try_copy_octet_string_bytes(&mut dst).unwrap(), None);
        assert_eq!(reader.remaining_len(), 4);
    }
}
