//! Pure Rust embedded-friendly implementation of the Basic, Canonical, and
//! Distinguished Encoding Rules ([BER]/[CER]/[DER]) of ASN.1 as described in
//! ITU [X.690].
//!
//! # About
//!
//! This crate is a *reader* only: it walks Tag-Length-Value productions in
//! an in-memory buffer and exposes typed accessors for every ASN.1 universal
//! type, enforcing each encoding rule set's conformance requirements (the
//! companion encoder is a separate concern, out of scope here).
//!
//! It avoids heap usage for the zero-copy accessors and gates every
//! allocating operation (constructed-value reassembly, `BigInt`/`String`
//! conveniences) behind the `alloc` feature.
//!
//! # Minimum Supported Rust Version
//!
//! This crate requires **Rust 1.65** at a minimum.
//!
//! [BER]: https://www.itu.int/rec/T-REC-X.690/
//! [CER]: https://www.itu.int/rec/T-REC-X.690/
//! [DER]: https://www.itu.int/rec/T-REC-X.690/
//! [X.690]: https://www.itu.int/rec/T-REC-X.690/

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod asn1;
mod error;
mod header;
mod length;
mod reader;
mod rules;
#[cfg(feature = "alloc")]
mod secure_buffer;
mod tag;

pub use crate::{
    error::{Error, ErrorKind, InvalidArgumentReason, MalformedReason, Result},
    header::Header,
    length::Length,
    reader::Reader,
    rules::EncodingRules,
    tag::{universal, Class, Tag, TagNumber},
};

pub use crate::asn1::Enumerated;

pub use crate::asn1::normalized_last_byte;

#[cfg(feature = "flags")]
#[cfg_attr(docsrs, doc(cfg(feature = "flags")))]
pub use crate::asn1::NamedBitListRepr;

#[cfg(feature = "flags")]
#[cfg_attr(docsrs, doc(cfg(feature = "flags")))]
pub use flagset::{FlagSet, Flags};

#[cfg(feature = "bigint")]
#[cfg_attr(docsrs, doc(cfg(feature = "bigint")))]
pub use num_bigint::{BigInt, BigUint};
