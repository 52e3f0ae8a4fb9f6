//! The scalar, container and tag-dispatch decoders (§4.2-§4.8).
//!
//! Decoding runs over an in-memory `Cursor<&[u8]>`: no real I/O ever
//! happens, but reading through `std::io::Read`/`Seek` via `byteorder`
//! keeps the same reader-based shape the ancestor decoder uses, rather than
//! hand-rolling slice-index bookkeeping.

use std::io::{Cursor, Read, Seek, SeekFrom};

use byteorder::{ReadBytesExt, BE};
use chrono::NaiveDateTime;
use half::f16;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::ToPrimitive;

use crate::error::{digest_eof, CborError, CborResult};
use crate::ordermap::OrderedMap;
use crate::value::{
    ArrayValue, BaseEncodedData, BaseVariant, ByteStringValue, DateStringValue, FloatValue,
    IntRepr, MapValue, Numeric, TextStringValue, Value,
};

const BREAK: u8 = 0xFF;

/// Per-decode knobs (§10.3). Not part of the wire format, just the caller's
/// recursion and strictness preferences.
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    /// Recursion bound from §5; exceeding it fails with `DepthExceeded`.
    pub max_depth: usize,
    /// When true, the whole input buffer must be consumed (§4.9, §7).
    pub strict_trailing: bool,
    /// When true, a map seen twice with the same key fails with
    /// `DuplicateMapKey` instead of silently overwriting (§9).
    pub strict_duplicate_keys: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: 1000,
            strict_trailing: false,
            strict_duplicate_keys: false,
        }
    }
}

pub(crate) fn decode_from_slice(bytes: &[u8], opts: &DecodeOptions) -> CborResult<(Value, usize)> {
    let mut cursor = Cursor::new(bytes);
    let value = decode_item(&mut cursor, &mut Vec::new(), 0, opts)?;
    let consumed = cursor.position() as usize;
    if opts.strict_trailing && consumed != bytes.len() {
        return Err(CborError::TrailingBytes {
            consumed,
            total: bytes.len(),
        });
    }
    Ok((value, consumed))
}

/// Decodes one self-delimiting item starting at the reader's current
/// position (§4.9), threading the pending tag stack and recursion depth
/// through to whichever scalar/container decoder finally produces a value.
fn decode_item<R: Read + Seek>(
    reader: &mut R,
    tags: &mut Vec<u64>,
    depth: usize,
    opts: &DecodeOptions,
) -> CborResult<Value> {
    if depth > opts.max_depth {
        return Err(CborError::DepthExceeded {
            limit: opts.max_depth,
        });
    }

    let initial = digest_eof(reader.read_u8())?;
    let major = initial >> 5;
    let info = initial & 0x1F;

    match major {
        0 => decode_uint(reader, info, tags),
        1 => decode_negint(reader, info, tags),
        2 => decode_byte_string(reader, info, tags),
        3 => decode_text_string(reader, info, tags),
        4 => decode_array(reader, info, tags, depth, opts),
        5 => decode_map(reader, info, tags, depth, opts),
        6 => decode_tagged(reader, info, tags, depth, opts),
        7 => decode_simple(reader, info, tags),
        _ => unreachable!("major type is a 3-bit field, all 8 values are handled above"),
    }
}

fn wrap_generic(tags: Vec<u64>, value: Value) -> Value {
    if tags.is_empty() {
        value
    } else {
        Value::Tagged {
            tags,
            value: Box::new(value),
        }
    }
}

fn take_tags(tags: &mut Vec<u64>) -> Vec<u64> {
    std::mem::take(tags)
}

/// True when the accumulated stack is exactly the single tag this
/// refinement recognizes (§4.8: "only a single tag is matched per
/// refinement").
fn matches_single(tags: &[u64], tag: u64) -> bool {
    tags.len() == 1 && tags[0] == tag
}

fn tag_argument_as_u64(repr: &IntRepr) -> CborResult<u64> {
    match repr {
        IntRepr::Native(v) => Ok(*v),
        IntRepr::Big(v) => v.to_u64().ok_or(CborError::IntegerOutOfRange),
    }
}

// ---------------------------------------------------------------------
// Major 6: tags (§4.8)
// ---------------------------------------------------------------------

fn decode_tagged<R: Read + Seek>(
    reader: &mut R,
    info: u8,
    tags: &mut Vec<u64>,
    depth: usize,
    opts: &DecodeOptions,
) -> CborResult<Value> {
    if info == 31 {
        return Err(CborError::MalformedHeader { info });
    }
    let (argument, _) = crate::length::read_length(reader, info)?;
    let tag = tag_argument_as_u64(&argument)?;
    tags.push(tag);
    decode_item(reader, tags, depth + 1, opts)
}

// ---------------------------------------------------------------------
// Major 0 / 1: integers (§4.2)
// ---------------------------------------------------------------------

fn decode_uint<R: Read>(reader: &mut R, info: u8, tags: &mut Vec<u64>) -> CborResult<Value> {
    let (argument, _) = crate::length::read_length(reader, info)?;
    let taken = take_tags(tags);
    if matches_single(&taken, 1) {
        let millis = int_repr_to_millis(&argument)?;
        return Ok(Value::EpochDate {
            millis,
            from_float: false,
        });
    }
    Ok(wrap_generic(taken, Value::UInt(argument)))
}

fn decode_negint<R: Read>(reader: &mut R, info: u8, tags: &mut Vec<u64>) -> CborResult<Value> {
    let (argument, _) = crate::length::read_length(reader, info)?;
    let taken = take_tags(tags);
    if matches_single(&taken, 1) {
        // mathematical value is -1 - argument
        let seconds = match &argument {
            IntRepr::Native(n) => -1i128 - (*n as i128),
            IntRepr::Big(n) => -1i128 - big_to_i128(n)?,
        };
        return Ok(Value::EpochDate {
            millis: seconds * 1000,
            from_float: false,
        });
    }
    Ok(wrap_generic(taken, Value::NegInt(argument)))
}

fn int_repr_to_millis(repr: &IntRepr) -> CborResult<i128> {
    let seconds = match repr {
        IntRepr::Native(n) => *n as i128,
        IntRepr::Big(n) => big_to_i128(n)?,
    };
    Ok(seconds * 1000)
}

fn big_to_i128(n: &BigUint) -> CborResult<i128> {
    n.to_i128().ok_or(CborError::IntegerOutOfRange)
}

// ---------------------------------------------------------------------
// Major 2: byte strings (§4.3)
// ---------------------------------------------------------------------

fn read_definite_bytes<R: Read>(reader: &mut R, info: u8) -> CborResult<Vec<u8>> {
    let (argument, _) = crate::length::read_length(reader, info)?;
    let len = match argument {
        IntRepr::Native(v) => usize::try_from(v).map_err(|_| CborError::IntegerOutOfRange)?,
        IntRepr::Big(_) => return Err(CborError::IntegerOutOfRange),
    };
    let mut buf = vec![0u8; len];
    digest_eof(reader.read_exact(&mut buf))?;
    Ok(buf)
}

fn decode_byte_string<R: Read + Seek>(
    reader: &mut R,
    info: u8,
    tags: &mut Vec<u64>,
) -> CborResult<Value> {
    let bsv = if info == 31 {
        let mut chunks = Vec::new();
        loop {
            let b = digest_eof(reader.read_u8())?;
            if b == BREAK {
                break;
            }
            let major = b >> 5;
            let chunk_info = b & 0x1F;
            if major != 2 || chunk_info == 31 {
                return Err(CborError::MalformedIndefinite { found_major: major });
            }
            chunks.push(read_definite_bytes(reader, chunk_info)?);
        }
        ByteStringValue::Indefinite(chunks)
    } else {
        ByteStringValue::Definite(read_definite_bytes(reader, info)?)
    };

    let taken = take_tags(tags);
    if matches_single(&taken, 2) {
        let bytes = bsv.joined();
        return Ok(Value::BigNum(BigInt::from_bytes_be(Sign::Plus, &bytes)));
    }
    if matches_single(&taken, 3) {
        let bytes = bsv.joined();
        let positive = BigInt::from_bytes_be(Sign::Plus, &bytes);
        return Ok(Value::BigNum(-BigInt::from(1) - positive));
    }
    for (tag, variant) in [
        (21u64, BaseVariant::Base64Url),
        (22u64, BaseVariant::Base64),
        (23u64, BaseVariant::Base16),
    ] {
        if matches_single(&taken, tag) {
            return Ok(Value::BaseEncoded {
                variant,
                data: BaseEncodedData::Bytes(bsv),
            });
        }
    }
    Ok(wrap_generic(taken, Value::ByteString(bsv)))
}

// ---------------------------------------------------------------------
// Major 3: text strings (§4.4)
// ---------------------------------------------------------------------

fn read_definite_text<R: Read>(reader: &mut R, info: u8) -> CborResult<String> {
    let bytes = read_definite_bytes(reader, info)?;
    String::from_utf8(bytes).map_err(|_| CborError::InvalidUtf8)
}

fn decode_text_string<R: Read + Seek>(
    reader: &mut R,
    info: u8,
    tags: &mut Vec<u64>,
) -> CborResult<Value> {
    let tsv = if info == 31 {
        let mut chunks = Vec::new();
        loop {
            let b = digest_eof(reader.read_u8())?;
            if b == BREAK {
                break;
            }
            let major = b >> 5;
            let chunk_info = b & 0x1F;
            if major != 3 || chunk_info == 31 {
                return Err(CborError::MalformedIndefinite { found_major: major });
            }
            chunks.push(read_definite_text(reader, chunk_info)?);
        }
        TextStringValue::Indefinite(chunks)
    } else {
        TextStringValue::Definite(read_definite_text(reader, info)?)
    };

    let taken = take_tags(tags);
    if matches_single(&taken, 0) {
        return parse_date_string(tsv.joined());
    }
    if matches_single(&taken, 32) {
        return Ok(Value::Uri(tsv.joined()));
    }
    if matches_single(&taken, 35) {
        return Ok(Value::Regexp(tsv.joined()));
    }
    if matches_single(&taken, 36) {
        return Ok(Value::Mime(tsv.joined()));
    }
    for (tag, variant) in [(33u64, BaseVariant::Base64Url), (34u64, BaseVariant::Base64)] {
        if matches_single(&taken, tag) {
            return Ok(Value::BaseEncoded {
                variant,
                data: BaseEncodedData::Text(tsv),
            });
        }
    }
    Ok(wrap_generic(taken, Value::TextString(tsv)))
}

/// Tag 0 (§4.4, §9): parses RFC 3339. A `+` offset is split off and
/// discarded before parsing, matching the source decoder's lossy handling
/// rather than silently fixing it — see DESIGN.md.
fn parse_date_string(raw: String) -> CborResult<Value> {
    let date_part = match raw.find('+') {
        Some(idx) => &raw[..idx],
        None => raw.as_str(),
    };
    let naive =
        parse_naive_rfc3339(date_part).ok_or_else(|| CborError::InvalidRfc3339(raw.clone()))?;
    Ok(Value::DateString(DateStringValue { naive, raw }))
}

fn parse_naive_rfc3339(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    // Offsetless (or `+`-truncated) input: retry with an explicit UTC
    // marker so a bare `YYYY-MM-DDTHH:MM:SS[.fff]` still parses.
    let with_zone = format!("{}Z", s.trim_end_matches('Z'));
    chrono::DateTime::parse_from_rfc3339(&with_zone)
        .ok()
        .map(|dt| dt.naive_utc())
}

// ---------------------------------------------------------------------
// Major 4: arrays (§4.5)
// ---------------------------------------------------------------------

fn decode_array<R: Read + Seek>(
    reader: &mut R,
    info: u8,
    tags: &mut Vec<u64>,
    depth: usize,
    opts: &DecodeOptions,
) -> CborResult<Value> {
    let (items, indefinite) = if info == 31 {
        let mut items = Vec::new();
        loop {
            if peek_is_break(reader)? {
                consume_break(reader)?;
                break;
            }
            items.push(decode_item(reader, &mut Vec::new(), depth + 1, opts)?);
        }
        (items, true)
    } else {
        let (argument, _) = crate::length::read_length(reader, info)?;
        let n = match argument {
            IntRepr::Native(v) => usize::try_from(v).map_err(|_| CborError::IntegerOutOfRange)?,
            IntRepr::Big(_) => return Err(CborError::IntegerOutOfRange),
        };
        let mut items = Vec::with_capacity(n.min(4096));
        for _ in 0..n {
            items.push(decode_item(reader, &mut Vec::new(), depth + 1, opts)?);
        }
        (items, false)
    };

    let taken = take_tags(tags);
    if matches_single(&taken, 4) {
        return build_numeric_pair(items, 4, |exponent, mantissa| Value::DecimalFraction {
            mantissa: Box::new(mantissa),
            exponent: Box::new(exponent),
        });
    }
    if matches_single(&taken, 5) {
        return build_numeric_pair(items, 5, |exponent, mantissa| Value::BigFloat {
            mantissa: Box::new(mantissa),
            exponent: Box::new(exponent),
        });
    }
    if matches_single(&taken, 258) {
        let mut deduped: Vec<Value> = Vec::with_capacity(items.len());
        for item in items {
            if !deduped.contains(&item) {
                deduped.push(item);
            }
        }
        return Ok(Value::Set(deduped));
    }

    Ok(wrap_generic(
        taken,
        Value::Array(ArrayValue { items, indefinite }),
    ))
}

/// Builds a tag 4/5 value from its two-element array payload, which RFC
/// 8949 encodes as `[exponent, mantissa]` (§8 scenario 12: `[-2, 27315]` is
/// exponent -2, mantissa 27315).
fn build_numeric_pair(
    items: Vec<Value>,
    tag: u64,
    build: impl FnOnce(Numeric, Numeric) -> Value,
) -> CborResult<Value> {
    if items.len() != 2 {
        return Err(CborError::MalformedTagPayload { tag });
    }
    let mut it = items.into_iter();
    let exponent =
        value_to_numeric(&it.next().unwrap()).ok_or(CborError::MalformedTagPayload { tag })?;
    let mantissa =
        value_to_numeric(&it.next().unwrap()).ok_or(CborError::MalformedTagPayload { tag })?;
    Ok(build(exponent, mantissa))
}

fn value_to_numeric(v: &Value) -> Option<Numeric> {
    match v {
        Value::UInt(IntRepr::Native(n)) => match i64::try_from(*n) {
            Ok(small) => Some(Numeric::Small(small)),
            Err(_) => Some(Numeric::Big(BigInt::from(*n))),
        },
        Value::UInt(IntRepr::Big(n)) => Some(Numeric::Big(BigInt::from(n.clone()))),
        Value::NegInt(IntRepr::Native(n)) => {
            let value = -1i128 - (*n as i128);
            match i64::try_from(value) {
                Ok(small) => Some(Numeric::Small(small)),
                Err(_) => Some(Numeric::Big(BigInt::from(value))),
            }
        }
        Value::NegInt(IntRepr::Big(n)) => {
            Some(Numeric::Big(-BigInt::from(1) - BigInt::from(n.clone())))
        }
        Value::BigNum(n) => Some(Numeric::Big(n.clone())),
        _ => None,
    }
}

// ---------------------------------------------------------------------
// Major 5: maps (§4.6)
// ---------------------------------------------------------------------

fn decode_map<R: Read + Seek>(
    reader: &mut R,
    info: u8,
    tags: &mut Vec<u64>,
    depth: usize,
    opts: &DecodeOptions,
) -> CborResult<Value> {
    let mut entries = OrderedMap::new();
    let indefinite = info == 31;
    if indefinite {
        loop {
            if peek_is_break(reader)? {
                consume_break(reader)?;
                break;
            }
            let key = decode_item(reader, &mut Vec::new(), depth + 1, opts)?;
            let value = decode_item(reader, &mut Vec::new(), depth + 1, opts)?;
            insert_map_entry(&mut entries, key, value, opts)?;
        }
    } else {
        let (argument, _) = crate::length::read_length(reader, info)?;
        let n = match argument {
            IntRepr::Native(v) => usize::try_from(v).map_err(|_| CborError::IntegerOutOfRange)?,
            IntRepr::Big(_) => return Err(CborError::IntegerOutOfRange),
        };
        for _ in 0..n {
            let key = decode_item(reader, &mut Vec::new(), depth + 1, opts)?;
            let value = decode_item(reader, &mut Vec::new(), depth + 1, opts)?;
            insert_map_entry(&mut entries, key, value, opts)?;
        }
    }

    let taken = take_tags(tags);
    Ok(wrap_generic(
        taken,
        Value::Map(MapValue { entries, indefinite }),
    ))
}

fn insert_map_entry(
    entries: &mut OrderedMap,
    key: Value,
    value: Value,
    opts: &DecodeOptions,
) -> CborResult<()> {
    if opts.strict_duplicate_keys && entries.contains_key(&key) {
        return Err(CborError::DuplicateMapKey);
    }
    entries.insert(key, value);
    Ok(())
}

// ---------------------------------------------------------------------
// Major 7: simple values and floats (§4.7)
// ---------------------------------------------------------------------

fn decode_simple<R: Read>(reader: &mut R, info: u8, tags: &mut Vec<u64>) -> CborResult<Value> {
    match info {
        20 => Ok(wrap_generic(take_tags(tags), Value::Bool(false))),
        21 => Ok(wrap_generic(take_tags(tags), Value::Bool(true))),
        22 => Ok(wrap_generic(take_tags(tags), Value::Null)),
        23 => Ok(wrap_generic(take_tags(tags), Value::Undefined)),
        25 => {
            let bits = digest_eof(reader.read_u16::<BE>())?;
            let value = f16::from_bits(bits).to_f32();
            finish_float(tags, FloatValue::Half(value))
        }
        26 => {
            let value = digest_eof(reader.read_f32::<BE>())?;
            finish_float(tags, FloatValue::Single(value))
        }
        27 => {
            let value = digest_eof(reader.read_f64::<BE>())?;
            finish_float(tags, FloatValue::Double(value))
        }
        _ => Err(CborError::MalformedSimple { info }),
    }
}

fn finish_float(tags: &mut Vec<u64>, float: FloatValue) -> CborResult<Value> {
    let taken = take_tags(tags);
    if matches_single(&taken, 1) {
        let millis = (float.to_f64() * 1000.0).round() as i128;
        return Ok(Value::EpochDate {
            millis,
            from_float: true,
        });
    }
    Ok(wrap_generic(taken, Value::Float(float)))
}

// ---------------------------------------------------------------------
// Shared container helpers
// ---------------------------------------------------------------------

fn peek_is_break<R: Read + Seek>(reader: &mut R) -> CborResult<bool> {
    let b = digest_eof(reader.read_u8())?;
    digest_eof(reader.seek(SeekFrom::Current(-1)).map(|_| ()))?;
    Ok(b == BREAK)
}

fn consume_break<R: Read>(reader: &mut R) -> CborResult<()> {
    let b = digest_eof(reader.read_u8())?;
    debug_assert_eq!(b, BREAK);
    Ok(())
}
