//! `SEQUENCE` and `SET OF` (X.690 §8.9–8.12).

use core::cmp::Ordering;

use crate::error::MalformedReason;
use crate::tag::universal;
use crate::{ErrorKind, Reader, Result, Tag};

impl<'r> Reader<'r> {
    /// Enter a `SEQUENCE`, returning a fresh [`Reader`] bounded to its
    /// content.
    pub fn read_sequence(&mut self) -> Result<Reader<'r>> {
        self.enter_constructed(universal::SEQUENCE, None)
    }

    /// As [`Reader::read_sequence`], checking the tag against `expected`
    /// instead of the `SEQUENCE` universal tag.
    pub fn read_sequence_expecting(&mut self, expected: Tag) -> Result<Reader<'r>> {
        self.enter_constructed(universal::SEQUENCE, Some(expected))
    }

    /// Enter a `SET OF`, returning a fresh [`Reader`] bounded to its content.
    ///
    /// Under DER/CER, the elements are additionally required to appear in
    /// canonical (X.690 §11.6) sort order; pass `skip_sort_validation = true`
    /// to suppress that check for data known to come from a non-compliant
    /// writer (BER never performs the check regardless of this flag).
    pub fn read_set_of(&mut self, skip_sort_validation: bool) -> Result<Reader<'r>> {
        self.read_set_of_inner(None, skip_sort_validation)
    }

    /// As [`Reader::read_set_of`], checking the tag against `expected`
    /// instead of the `SET OF` universal tag.
    pub fn read_set_of_expecting(
        &mut self,
        expected: Tag,
        skip_sort_validation: bool,
    ) -> Result<Reader<'r>> {
        self.read_set_of_inner(Some(expected), skip_sort_validation)
    }

    fn read_set_of_inner(
        &mut self,
        expected: Option<Tag>,
        skip_sort_validation: bool,
    ) -> Result<Reader<'r>> {
        // Validate against a throwaway copy first so a sort-order failure
        // leaves `self` exactly where it was, per the crate-wide
        // advance-only-on-success contract.
        let mut probe = *self;
        let body = probe.enter_constructed(universal::SET, expected)?;

        if self.rules().requires_set_of_order() && !skip_sort_validation {
            check_canonical_order(body)?;
        }

        *self = probe;
        Ok(body)
    }
}

/// Compare two encoded `SET OF` elements under X.690 §11.6's canonical
/// ordering: pad the shorter with conceptual trailing zero bytes to the
/// longer's length, compare lexicographically, and if still equal the
/// longer element sorts greater.
fn compare_encoded_elements(a: &[u8], b: &[u8]) -> Ordering {
    let common_len = a.len().min(b.len());
    match a[..common_len].cmp(&b[..common_len]) {
        Ordering::Equal => a.len().cmp(&b.len()),
        ordering => ordering,
    }
}

/// Walk `body`'s elements, failing if any adjacent pair is out of canonical
/// order. Does not consume from `body` itself — it operates on a copy of the
/// reader, since the caller's returned sub-reader must still expose every
/// element to its own caller.
fn check_canonical_order(mut body: Reader<'_>) -> Result<()> {
    let mut previous: Option<&[u8]> = None;

    while !body.is_exhausted() {
        let element = body.get_encoded_value()?;

        if let Some(prev) = previous {
            if compare_encoded_elements(prev, element) != Ordering::Less {
                return Err(ErrorKind::Malformed(MalformedReason::SetOfNotSorted).into());
            }
        }

        previous = Some(element);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{EncodingRules, Reader};

    #[test]
    fn sequence_yields_sub_reader_over_content() {
        let bytes = [0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02];
        let mut reader = Reader::new(&bytes, EncodingRules::Der);
        let mut seq = reader.read_sequence().unwrap();
        assert_eq!(seq.try_read_i8().unwrap(), Some(1));
        assert_eq!(seq.try_read_i8().unwrap(), Some(2));
        assert!(seq.is_exhausted());
        assert!(reader.is_exhausted());
    }

    #[test]
    fn set_of_in_canonical_order_accepted_under_der() {
        // INTEGER 1, INTEGER 2 — already in canonical order.
        let bytes = [0x31, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02];
        let mut reader = Reader::new(&bytes, EncodingRules::Der);
        let set = reader.read_set_of(false).unwrap();
        assert_eq!(set.remaining_len(), 6);
    }

    #[test]
    fn set_of_out_of_order_rejected_under_der_accepted_under_ber() {
        // INTEGER 2, INTEGER 1 — out of canonical order.
        let bytes = [0x31, 0x06, 0x02, 0x01, 0x02, 0x02, 0x01, 0x01];

        let mut der_reader = Reader::new(&bytes, EncodingRules::Der);
        assert!(der_reader.read_set_of(false).is_err());
        // The parent cursor is untouched on failure.
        assert_eq!(der_reader.remaining_len(), bytes.len());

        let mut ber_reader = Reader::new(&bytes, EncodingRules::Ber);
        assert!(ber_reader.read_set_of(false).is_ok());
    }

    #[test]
    fn skip_sort_validation_suppresses_the_check() {
        let bytes = [0x31, 0x06, 0x02, 0x01, 0x02, 0x02, 0x01, 0x01];
        let mut reader = Reader::new(&bytes, EncodingRules::Der);
        assert!(reader.read_set_of(true).is_ok());
    }

    #[test]
    fn shorter_prefix_sorts_before_longer_extension() {
        // [INTEGER content 0x01], [INTEGER content 0x01 0x00] — same prefix,
        // shorter first is canonical.
        let bytes = [
            0x31, 0x08, // SET OF, length 8
            0x02, 0x01, 0x01, // INTEGER 1 (encoded element: 02 01 01)
            0x02, 0x02, 0x01, 0x00, // INTEGER 256 (encoded element: 02 02 01 00)
        ];
        let mut reader = Reader::new(&bytes, EncodingRules::Der);
        assert!(reader.read_set_of(false).is_ok());
    }

    #[test]
    fn wrong_tag_rejected() {
        let bytes = [0x30, 0x00]; // SEQUENCE, not SET
        let mut reader = Reader::new(&bytes, EncodingRules::Der);
        assert!(reader.read_set_of(false).is_err());
    }
}
