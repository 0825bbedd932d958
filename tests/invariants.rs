//! Property-based checks of the invariants from spec §3/§8: a reader only
//! ever advances, and any failing call leaves the cursor exactly where it
//! was.

use proptest::prelude::*;
use x690_reader::{EncodingRules, Reader};

fn rules() -> impl Strategy<Value = EncodingRules> {
    prop_oneof![
        Just(EncodingRules::Ber),
        Just(EncodingRules::Cer),
        Just(EncodingRules::Der),
    ]
}

proptest! {
    /// Peeking never advances the cursor, no matter how many times it's
    /// called, and never panics on arbitrary (possibly malformed) input.
    #[test]
    fn peek_tag_never_advances(bytes in proptest::collection::vec(any::<u8>(), 0..64), rules in rules()) {
        let reader = Reader::new(&bytes, rules);
        let before = reader.remaining_len();
        let _ = reader.peek_tag();
        let _ = reader.peek_tag();
        prop_assert_eq!(reader.remaining_len(), before);
    }

    /// `peek_encoded_value` is idempotent: calling it repeatedly returns the
    /// same bytes and never consumes anything.
    #[test]
    fn peek_encoded_value_is_idempotent(bytes in proptest::collection::vec(any::<u8>(), 0..128), rules in rules()) {
        let reader = Reader::new(&bytes, rules);
        let first = reader.peek_encoded_value();
        let second = reader.peek_encoded_value();
        prop_assert_eq!(first.ok(), second.ok());
        prop_assert_eq!(reader.remaining_len(), bytes.len());
    }

    /// A failing typed read never leaves the cursor partially advanced.
    #[test]
    fn failing_reads_restore_the_cursor(bytes in proptest::collection::vec(any::<u8>(), 0..64), rules in rules()) {
        macro_rules! check {
            ($call:expr) => {{
                let mut reader = Reader::new(&bytes, rules);
                let before = reader.remaining_len();
                if $call(&mut reader).is_err() {
                    prop_assert_eq!(reader.remaining_len(), before);
                }
            }};
        }

        check!(|r: &mut Reader<'_>| r.read_boolean());
        check!(|r: &mut Reader<'_>| r.try_read_i32());
        check!(|r: &mut Reader<'_>| r.read_null());
        check!(|r: &mut Reader<'_>| r.get_integer_bytes());
        check!(|r: &mut Reader<'_>| r.try_get_primitive_bit_string_value());
        check!(|r: &mut Reader<'_>| r.try_get_primitive_octet_string_bytes());
        check!(|r: &mut Reader<'_>| r.read_sequence());
        check!(|r: &mut Reader<'_>| r.read_set_of(false));
    }

    /// No typed read ever panics on arbitrary bytes, regardless of rule set.
    #[test]
    fn typed_reads_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0..96), rules in rules()) {
        let mut reader = Reader::new(&bytes, rules);
        let _ = reader.read_boolean();
        let mut reader = Reader::new(&bytes, rules);
        let _ = reader.try_read_i64();
        let mut reader = Reader::new(&bytes, rules);
        let _ = reader.get_big_integer();
        let mut reader = Reader::new(&bytes, rules);
        let _ = reader.read_null();
        let mut reader = Reader::new(&bytes, rules);
        let _ = reader.read_object_identifier_as_string();
        let mut reader = Reader::new(&bytes, rules);
        let mut dst = [0u8; 32];
        let _ = reader.try_copy_bit_string_bytes(&mut dst);
        let mut reader = Reader::new(&bytes, rules);
        let _ = reader.try_copy_octet_string_bytes(&mut dst);
        let mut reader = Reader::new(&bytes, rules);
        let _ = reader.get_character_string(x690_reader::universal::UTF8_STRING);
        let mut reader = Reader::new(&bytes, rules);
        let _ = reader.read_sequence();
        let mut reader = Reader::new(&bytes, rules);
        let _ = reader.read_set_of(false);
    }
}
