//! # cbor-core
//! A decoder for CBOR (RFC 8949), the Concise Binary Object Representation.
//! It parses a byte slice into a tagged, tree-shaped [`Value`], following
//! the major-type dispatch the RFC itself is structured around.
//!
//! ## This Crate
//! This crate decodes CBOR; it does not encode it. Given a byte slice, it
//! produces a `Value` tree that preserves enough of the original wire
//! structure (definite vs. indefinite length, tag stacks, integer width) to
//! be useful for inspection and further conversion, without forcing every
//! caller's data model up front.
//!
//! ### Key features
//! - Handles every major type (0-7), including indefinite-length byte
//!   strings, text strings, arrays and maps.
//! - Understands the tag refinements listed in the RFC's registry that are
//!   recognizable without external context: bignums, decimal fractions,
//!   big floats, date/time strings, epoch timestamps, URIs, base-encoded
//!   string wrappers, and tag 258 sets.
//! - Configurable recursion depth and strictness around trailing bytes and
//!   duplicate map keys.
//!
//! ### Cargo Features
//! - `debug`  (default) derives `Debug` on the value types.
//! - `clone`  (default) derives `Clone` on the value types.
//!
//! ## Quick Start
//!
//! ```
//! use cbor_core::decode;
//!
//! // The two-byte encoding of the unsigned integer 10.
//! let bytes = [0x0a];
//! let value = decode(&bytes).unwrap();
//! assert_eq!(value.as_u64(), Some(10));
//! ```
//!
//! Decoding with explicit options, rejecting trailing bytes:
//!
//! ```
//! use cbor_core::{decode_with_options, DecodeOptions};
//!
//! let bytes = [0x0a, 0xff]; // 10, then a stray break byte
//! let opts = DecodeOptions { strict_trailing: true, ..DecodeOptions::default() };
//! assert!(decode_with_options(&bytes, &opts).is_err());
//! ```

pub(crate) mod error;
pub(crate) mod length;
pub(crate) mod value;
pub(crate) mod ordermap;
pub(crate) mod decode;
pub(crate) mod front;

pub use decode::DecodeOptions;
pub use error::{CborError, CborResult};
pub use front::{decode, decode_with_len, decode_with_options, decode_with_options_len};
pub use ordermap::OrderedMap;
pub use value::{
    ArrayValue, BaseEncodedData, BaseVariant, ByteStringValue, DateStringValue, FloatValue,
    IntRepr, MapValue, Numeric, TextStringValue, Value,
};


#[cfg(test)]
mod roundtrip;
