//! Shared iterative reassembly for constructed BIT STRING, OCTET STRING, and
//! (sharing the OCTET STRING wire shape) character string segments.

use alloc::vec::Vec;

use crate::error::MalformedReason;
use crate::tag::{universal, Class};
use crate::{EncodingRules, ErrorKind, Reader, Result};

/// Maximum content length of a non-final primitive segment inside a CER
/// constructed BIT STRING / OCTET STRING (X.690 §9.13, §9.2).
pub(super) const CER_SEGMENT_SIZE: usize = 1000;

/// Which universal type's wire shape a constructed reassembly is walking.
#[derive(Copy, Clone)]
pub(super) enum Shape {
    /// BIT STRING: each primitive segment's first content octet is an
    /// unused-bit count: 0..=7.
    BitString,
    /// OCTET STRING, or a character string type sharing its wire shape:
    /// every content octet belongs to the value.
    OctetStringLike(u32),
}

impl Shape {
    fn universal_number(self) -> u32 {
        match self {
            Shape::BitString => universal::BIT_STRING,
            Shape::OctetStringLike(number) => number,
        }
    }
}

/// Outcome of reassembling a constructed value's segments.
pub(super) struct Reassembled {
    pub(super) unused_bits: u8,
    pub(super) len: usize,
}

/// Walk `body` (the already-entered content of a constructed BIT STRING /
/// OCTET STRING) depth-first, feeding each primitive segment's payload to
/// `sink` in encoding order, and enforcing the segment-shape rules shared by
/// both types (X.690 §8.6.3, §8.7.3, §9.2, §9.13).
///
/// Uses an explicit stack of sub-readers rather than recursion, per design:
/// each nested constructed segment pushes its own bounded reader onto the
/// stack, so the maximum stack depth is the nesting depth of the input
/// rather than an unbounded call stack on attacker-controlled data.
pub(super) fn reassemble<'r>(
    body: Reader<'r>,
    shape: Shape,
    rules: EncodingRules,
    mut sink: impl FnMut(&[u8]) -> Result<()>,
) -> Result<Reassembled> {
    let universal_number = shape.universal_number();

    let mut stack: Vec<Reader<'r>> = alloc::vec![body];
    let mut total_len = 0usize;
    let mut prev_unused: Option<u8> = None;
    let mut prev_segment_len: Option<usize> = None;
    let mut segment_count = 0usize;

    while let Some(mut cur) = stack.pop() {
        if cur.is_exhausted() {
            continue;
        }

        let tag = cur.peek_tag()?;
        if tag.class() != Class::Universal || tag.number() != universal_number {
            return Err(ErrorKind::Malformed(MalformedReason::UnexpectedNestedTag).into());
        }

        if tag.is_constructed() {
            if rules.is_cer() || rules.is_der() {
                // CER forbids nested constructed segments; DER forbids the
                // constructed form of these types entirely (checked again
                // here since it can also appear nested under plain BER-style
                // input being read under DER).
                return Err(ErrorKind::Malformed(MalformedReason::ConstructedSegmentRules).into());
            }
            let inner = cur.enter_constructed(universal_number, None)?;
            stack.push(cur);
            stack.push(inner);
            continue;
        }

        let content = cur.read_primitive_content(universal_number, None)?;

        let (unused, payload) = match shape {
            Shape::BitString => {
                let first = *content
                    .first()
                    .ok_or(ErrorKind::Malformed(MalformedReason::InvalidContent))?;
                if first > 7 {
                    return Err(ErrorKind::Malformed(MalformedReason::BitStringUnusedBits).into());
                }
                if content.len() == 1 && first != 0 {
                    return Err(ErrorKind::Malformed(MalformedReason::BitStringUnusedBits).into());
                }
                (first, &content[1..])
            }
            Shape::OctetStringLike(_) => (0u8, content),
        };

        // Only the last segment of the flattened sequence may carry a
        // non-zero unused-bit count; if we already saw a segment and it had
        // one, it wasn't actually last.
        if let Some(prev) = prev_unused {
            if prev != 0 {
                return Err(ErrorKind::Malformed(MalformedReason::BitStringUnusedBits).into());
            }
        }
        // Likewise, under CER every non-final segment must be exactly
        // `CER_SEGMENT_SIZE` bytes.
        if let Some(len) = prev_segment_len {
            if rules.is_cer() && len != CER_SEGMENT_SIZE {
                return Err(ErrorKind::Malformed(MalformedReason::ConstructedSegmentRules).into());
            }
        }

        sink(payload)?;
        total_len += payload.len();
        segment_count += 1;
        prev_unused = Some(unused);
        prev_segment_len = Some(payload.len());

        stack.push(cur);
    }

    if segment_count == 0 {
        return Err(ErrorKind::Malformed(MalformedReason::InvalidContent).into());
    }

    if rules.is_cer() && total_len <= CER_SEGMENT_SIZE {
        // CER would have mandated a primitive encoding for a value this
        // short; a constructed encoding at or under the segment size is
        // non-canonical.
        return Err(ErrorKind::Malformed(MalformedReason::ConstructedSegmentRules).into());
    }

    Ok(Reassembled {
        unused_bits: prev_unused.unwrap_or(0),
        len: total_len,
    })
}

/// Check that the trailing (unused) bits of a BIT STRING's last content byte
/// are zero, as DER/CER require (X.690 §8.6.2.3, §11.2).
pub(super) fn check_trailing_bits_zero(
    rules: EncodingRules,
    unused_bits: u8,
    last_byte: Option<u8>,
) -> Result<()> {
    if !rules.requires_minimal_encoding() {
        return Ok(());
    }
    let Some(last) = last_byte else {
        return Ok(());
    };
    let mask = if unused_bits == 0 {
        0
    } else {
        (1u8 << unused_bits) - 1
    };
    if last & mask != 0 {
        return Err(ErrorKind::Malformed(MalformedReason::BitStringTrailingBitsNonzero).into());
    }
    Ok(())
}
