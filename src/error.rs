//! Error types.

use core::fmt;

use crate::Tag;

/// Result type.
pub type Result<T> = core::result::Result<T, Error>;

/// Error type.
///
/// Wraps an [`ErrorKind`] together with the byte offset (if known) at which
/// the decoder was positioned when the error occurred.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    position: Option<usize>,
}

impl Error {
    /// Create a new [`Error`] with no position information attached.
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            position: None,
        }
    }

    /// Attach (or overwrite) the byte position at which this error occurred.
    pub fn at(mut self, position: usize) -> Self {
        self.position = self.position.or(Some(position));
        self
    }

    /// Get the [`ErrorKind`] which occurred.
    pub fn kind(self) -> ErrorKind {
        self.kind
    }

    /// Get the position inside of the message where the error occurred, if known.
    pub fn position(self) -> Option<usize> {
        self.position
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if let Some(pos) = self.position {
            write!(f, " (at byte offset {})", pos)?;
        }

        Ok(())
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error::new(kind)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// The two kinds of failure this crate reports (see the error handling
/// design: every wire-format violation is [`ErrorKind::Malformed`], every
/// caller-side misuse is [`ErrorKind::InvalidArgument`]).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A violation of the X.690 wire format: a bad tag, a bad length, a
    /// non-minimal encoding under DER/CER, an indefinite length where one
    /// isn't allowed, an out-of-bounds slice, and so on.
    Malformed(MalformedReason),

    /// Caller-side misuse that is not itself a property of the encoded
    /// data: an unsupported [`EncodingRules`](crate::EncodingRules) value,
    /// an expected [`Tag`] whose class/number don't correspond to the
    /// decoder being called, and the like.
    InvalidArgument(InvalidArgumentReason),
}

impl ErrorKind {
    /// Annotate this [`ErrorKind`] with the position at which it occurred.
    pub fn at(self, position: usize) -> Error {
        Error::new(self).at(position)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Malformed(reason) => write!(f, "malformed encoding: {}", reason),
            ErrorKind::InvalidArgument(reason) => write!(f, "invalid argument: {}", reason),
        }
    }
}

/// Detail carried by [`ErrorKind::Malformed`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum MalformedReason {
    /// Ran out of input bytes before a TLV could be fully decoded.
    Truncated,
    /// A high-tag-number form tag was not minimally encoded, or its number
    /// does not fit in a `u32`.
    TagNumberInvalid,
    /// The tag byte identified an unsupported/reserved class or form.
    TagUnknown,
    /// The actual tag did not match the one the caller expected.
    UnexpectedTag {
        /// Tag expected by the caller, if there is a single such tag.
        expected: Option<Tag>,
        /// Tag actually present in the input.
        actual: Tag,
    },
    /// A length octet of `0xFF` was encountered (reserved by X.690).
    LengthReserved,
    /// An indefinite length was used where the current
    /// [`EncodingRules`](crate::EncodingRules) forbid it.
    IndefiniteLengthNotAllowed,
    /// A definite length was given for a primitive encoding in a context
    /// that requires it to fit a `u32`, or it does not fit a `u32`/`i32`.
    LengthOverflow,
    /// A definite length was not minimally encoded under DER/CER.
    LengthNotMinimal,
    /// A constructed value was given a definite length while parsing CER,
    /// where CER always chooses an indefinite-length constructed encoding.
    CerConstructedMustBeIndefinite,
    /// An indefinite-length value was never terminated by an
    /// end-of-contents marker before the input ran out.
    UnterminatedIndefiniteLength,
    /// The content of a primitive value had the wrong length or shape for
    /// its type (e.g. a BOOLEAN whose content isn't exactly one byte).
    InvalidContent,
    /// An INTEGER or ENUMERATED's content violated the minimal two's
    /// complement redundancy check of X.690 §8.3.2.
    IntegerNotMinimal,
    /// A BIT STRING's unused-bit count was out of the `0..=7` range, or was
    /// non-zero on an earlier-than-last constructed segment.
    BitStringUnusedBits,
    /// Trailing bits of a BIT STRING's final content byte (beyond the
    /// declared unused-bit count) were non-zero under DER/CER, or (for a
    /// named bit list) the last declared named bit was not set.
    BitStringTrailingBitsNonzero,
    /// A sub-identifier of an OBJECT IDENTIFIER was not minimally encoded
    /// (leading `0x80` continuation byte).
    OidSubIdentifierNotMinimal,
    /// An OBJECT IDENTIFIER's content was empty or truncated mid
    /// sub-identifier.
    OidTruncated,
    /// A constructed BIT STRING / OCTET STRING violated the segment-size
    /// or nesting rules of CER, or DER forbids the constructed form
    /// entirely for this type.
    ConstructedSegmentRules,
    /// An unexpected tag appeared inside a constructed BIT STRING / OCTET
    /// STRING reassembly.
    UnexpectedNestedTag,
    /// A SET OF's elements were not in canonical (DER/CER) sort order.
    SetOfNotSorted,
    /// Trailing, unconsumed data remained after a read that required the
    /// reader to be exhausted.
    TrailingData,
    /// A character string decoder rejected its input bytes as not being
    /// valid text in its associated encoding.
    InvalidCharacterData,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedReason::Truncated => write!(f, "input truncated"),
            MalformedReason::TagNumberInvalid => write!(f, "invalid high-tag-number encoding"),
            MalformedReason::TagUnknown => write!(f, "unknown or reserved tag class/form"),
            MalformedReason::UnexpectedTag { expected, actual } => {
                write!(f, "unexpected tag: ")?;
                if let Some(tag) = expected {
                    write!(f, "expected {}, ", tag)?;
                }
                write!(f, "got {}", actual)
            }
            MalformedReason::LengthReserved => write!(f, "reserved length octet 0xFF"),
            MalformedReason::IndefiniteLengthNotAllowed => {
                write!(f, "indefinite length not allowed under this rule set")
            }
            MalformedReason::LengthOverflow => write!(f, "length exceeds supported range"),
            MalformedReason::LengthNotMinimal => write!(f, "length not minimally encoded"),
            MalformedReason::CerConstructedMustBeIndefinite => {
                write!(f, "CER constructed value must use indefinite length")
            }
            MalformedReason::UnterminatedIndefiniteLength => {
                write!(f, "indefinite length value missing end-of-contents marker")
            }
            MalformedReason::InvalidContent => write!(f, "invalid content for this type"),
            MalformedReason::IntegerNotMinimal => {
                write!(f, "integer encoding contains redundant leading octet")
            }
            MalformedReason::BitStringUnusedBits => write!(f, "invalid unused-bits count"),
            MalformedReason::BitStringTrailingBitsNonzero => {
                write!(f, "non-zero trailing bits in BIT STRING")
            }
            MalformedReason::OidSubIdentifierNotMinimal => {
                write!(f, "OBJECT IDENTIFIER sub-identifier not minimally encoded")
            }
            MalformedReason::OidTruncated => write!(f, "OBJECT IDENTIFIER content truncated"),
            MalformedReason::ConstructedSegmentRules => {
                write!(f, "constructed value violates segment rules")
            }
            MalformedReason::UnexpectedNestedTag => {
                write!(f, "unexpected tag inside constructed reassembly")
            }
            MalformedReason::SetOfNotSorted => write!(f, "SET OF elements not in canonical order"),
            MalformedReason::TrailingData => write!(f, "trailing data after expected end of input"),
            MalformedReason::InvalidCharacterData => {
                write!(f, "invalid bytes for character string encoding")
            }
        }
    }
}

/// Detail carried by [`ErrorKind::InvalidArgument`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum InvalidArgumentReason {
    /// [`EncodingRules`](crate::EncodingRules) value was not one of
    /// `{Ber, Cer, Der}`.
    UnsupportedRules,
    /// Caller passed an expected [`Tag`] of class `Universal` whose number
    /// does not match the universal tag number of the typed accessor being
    /// invoked.
    WrongUniversalTagForAccessor,
    /// Caller passed a universal tag number to the character-string
    /// facade that isn't one of the recognized character string types.
    UnknownCharacterStringTag,
    /// Caller requested a [`flagset`] flags enumeration for an accessor
    /// whose backing type is not declared as bit-flags convention.
    NotANamedBitList,
}

impl fmt::Display for InvalidArgumentReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidArgumentReason::UnsupportedRules => {
                write!(f, "unsupported encoding rules")
            }
            InvalidArgumentReason::WrongUniversalTagForAccessor => {
                write!(f, "expected tag's universal number doesn't match accessor")
            }
            InvalidArgumentReason::UnknownCharacterStringTag => {
                write!(f, "unknown character string tag number")
            }
            InvalidArgumentReason::NotANamedBitList => {
                write!(f, "backing type is not a named bit list")
            }
        }
    }
}
