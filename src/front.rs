//! The public decode entry points.
//!
//! Mirrors the ancestor decoder's `NBTRead`/`decode` split: a default-options
//! convenience function for the common case, and an explicit-options
//! variant for callers that need strict-mode or a non-default depth bound.

use crate::decode::{decode_from_slice, DecodeOptions};
use crate::error::CborResult;
use crate::value::Value;

/// Decodes a single CBOR item from `bytes` using default options (§10.3):
/// non-strict trailing data, non-strict duplicate keys, a recursion depth
/// bound of 1000.
///
/// Trailing bytes after the item are ignored; use [`decode_with_options`]
/// with `strict_trailing: true` to reject them.
pub fn decode(bytes: &[u8]) -> CborResult<Value> {
    decode_from_slice(bytes, &DecodeOptions::default()).map(|(value, _)| value)
}

/// Like [`decode`], but also returns how many bytes of `bytes` were
/// consumed by the decoded item.
pub fn decode_with_len(bytes: &[u8]) -> CborResult<(Value, usize)> {
    decode_from_slice(bytes, &DecodeOptions::default())
}

/// Decodes a single CBOR item from `bytes` under caller-supplied
/// `DecodeOptions`.
pub fn decode_with_options(bytes: &[u8], opts: &DecodeOptions) -> CborResult<Value> {
    decode_from_slice(bytes, opts).map(|(value, _)| value)
}

/// Like [`decode_with_options`], also returning the number of bytes
/// consumed.
pub fn decode_with_options_len(bytes: &[u8], opts: &DecodeOptions) -> CborResult<(Value, usize)> {
    decode_from_slice(bytes, opts)
}
