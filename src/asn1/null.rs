//! `NULL` (X.690 §8.8).

use crate::error::MalformedReason;
use crate::tag::universal;
use crate::{ErrorKind, Reader, Result, Tag};

impl<'r> Reader<'r> {
    /// Read a `NULL` value: a primitive encoding with empty content.
    pub fn read_null(&mut self) -> Result<()> {
        self.read_null_inner(None)
    }

    /// As [`Reader::read_null`], checking the tag against `expected`
    /// instead of the `NULL` universal tag.
    pub fn read_null_expecting(&mut self, expected: Tag) -> Result<()> {
        self.read_null_inner(Some(expected))
    }

    fn read_null_inner(&mut self, expected: Option<Tag>) -> Result<()> {
        if !self.peek_primitive_content(universal::NULL, expected)?.is_empty() {
            return Err(ErrorKind::Malformed(MalformedReason::InvalidContent).into());
        }
        self.read_primitive_content(universal::NULL, expected)?;
        Ok(())
    }
}
