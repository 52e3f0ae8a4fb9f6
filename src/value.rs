//! The decoded value tree (§3 of the design doc): a tagged sum over every
//! CBOR major type plus the handful of tag-interpreted refinements this
//! decoder understands natively. Everything else collapses to `Tagged`.

use chrono::NaiveDateTime;
use num_bigint::{BigInt, BigUint};

use crate::ordermap::OrderedMap;

/// An integer argument as read by the length reader (§4.1): either a plain
/// 64-bit value or, once the high bits would lose precision in that width,
/// an arbitrary-precision one.
#[derive(Debug, Clone, PartialEq)]
pub enum IntRepr {
    Native(u64),
    Big(BigUint),
}

impl IntRepr {
    pub fn to_bigint(&self) -> BigUint {
        match self {
            IntRepr::Native(v) => BigUint::from(*v),
            IntRepr::Big(v) => v.clone(),
        }
    }
}

/// A byte string, either a single definite-length run or an ordered list of
/// definite-length chunks making up an indefinite-length string (§3, §4.3).
#[derive(Debug, Clone, PartialEq)]
pub enum ByteStringValue {
    Definite(Vec<u8>),
    Indefinite(Vec<Vec<u8>>),
}

impl ByteStringValue {
    /// A joined view over the chunks, concatenating them if indefinite.
    pub fn joined(&self) -> Vec<u8> {
        match self {
            ByteStringValue::Definite(b) => b.clone(),
            ByteStringValue::Indefinite(chunks) => chunks.concat(),
        }
    }
}

/// A text string, either definite or an ordered list of UTF-8-validated
/// chunks (§3, §4.4).
#[derive(Debug, Clone, PartialEq)]
pub enum TextStringValue {
    Definite(String),
    Indefinite(Vec<String>),
}

impl TextStringValue {
    pub fn joined(&self) -> String {
        match self {
            TextStringValue::Definite(s) => s.clone(),
            TextStringValue::Indefinite(chunks) => chunks.concat(),
        }
    }
}

/// An ordered sequence of items (§4.5), tracking whether it was encoded with
/// a known length or terminated by a break.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayValue {
    pub items: Vec<Value>,
    pub indefinite: bool,
}

/// An ordered key/value mapping (§4.6). Insertion order is preserved and
/// duplicate keys overwrite in place (see DESIGN.md for the open question
/// this resolves).
#[derive(Debug, Clone, PartialEq)]
pub struct MapValue {
    pub entries: OrderedMap,
    pub indefinite: bool,
}

/// An IEEE-754 float, tagged with the width it was actually encoded at
/// (§4.7); half-precision values are widened to `f32` without loss since
/// every binary16 value is exactly representable in binary32.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FloatValue {
    Half(f32),
    Single(f32),
    Double(f64),
}

impl FloatValue {
    pub fn to_f64(self) -> f64 {
        match self {
            FloatValue::Half(v) => v as f64,
            FloatValue::Single(v) => v as f64,
            FloatValue::Double(v) => v,
        }
    }
}

/// The "numeric" constraint placed on decimal-fraction/big-float payloads
/// (§4.5): either a native or big integer, signed.
#[derive(Debug, Clone, PartialEq)]
pub enum Numeric {
    Small(i64),
    Big(BigInt),
}

/// Which base encoding a tag 21/22/23/33/34 wrapper advertises (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseVariant {
    Base64Url,
    Base64,
    Base16,
}

/// The payload carried by a base-encoded string wrapper: byte strings for
/// tags 21-23, text strings (already encoded as base64/base64url text) for
/// tags 33-34.
#[derive(Debug, Clone, PartialEq)]
pub enum BaseEncodedData {
    Bytes(ByteStringValue),
    Text(TextStringValue),
}

impl BaseEncodedData {
    /// Decodes a tag 21-23/33-34 wrapper back to raw bytes. Byte-string
    /// wrappers (21-23) already carry the bytes directly; text wrappers
    /// (33-34) hold base64/base64url text that still needs decoding.
    /// Returns `None` for base16 text (no tag wraps a text string as
    /// base16) or when the wrapped text is not valid base64[url].
    pub fn decode_to_bytes(&self, variant: BaseVariant) -> Option<Vec<u8>> {
        use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
        use base64::Engine;
        match (variant, self) {
            (_, BaseEncodedData::Bytes(b)) => Some(b.joined()),
            (BaseVariant::Base64, BaseEncodedData::Text(t)) => STANDARD.decode(t.joined()).ok(),
            (BaseVariant::Base64Url, BaseEncodedData::Text(t)) => {
                URL_SAFE_NO_PAD.decode(t.joined()).ok()
            }
            (BaseVariant::Base16, BaseEncodedData::Text(_)) => None,
        }
    }
}

/// A tag-0 date string: the RFC 3339 text as parsed into a naive (no
/// timezone) timestamp, plus the original text. See DESIGN.md for why the
/// timezone offset, if any, is dropped rather than preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct DateStringValue {
    pub naive: NaiveDateTime,
    pub raw: String,
}

/// A decoded CBOR item (§3). Produced once by the decoder and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Major 0.
    UInt(IntRepr),
    /// Major 1. Stores the decoded *argument*; the mathematical value is
    /// `-1 - argument`.
    NegInt(IntRepr),
    ByteString(ByteStringValue),
    TextString(TextStringValue),
    Array(ArrayValue),
    Map(MapValue),
    /// Tag 258 over an array: deduplicated, first-occurrence order kept.
    Set(Vec<Value>),
    Bool(bool),
    Null,
    Undefined,
    Float(FloatValue),
    /// Tags 2/3: an arbitrary-precision signed integer.
    BigNum(BigInt),
    /// Tag 5: `(mantissa, exponent)`.
    BigFloat {
        mantissa: Box<Numeric>,
        exponent: Box<Numeric>,
    },
    /// Tag 4: `(mantissa, exponent)`.
    DecimalFraction {
        mantissa: Box<Numeric>,
        exponent: Box<Numeric>,
    },
    /// Tag 0 over a text string.
    DateString(DateStringValue),
    /// Tag 1 over an integer or float. `millis` is milliseconds since the
    /// Unix epoch; `from_float` records which payload shape produced it
    /// (integer payloads are exact, float payloads are rounded per §4.7).
    EpochDate { millis: i128, from_float: bool },
    /// Tag 32.
    Uri(String),
    /// Tag 36.
    Mime(String),
    /// Tag 35.
    Regexp(String),
    /// Tags 21/22/23/33/34.
    BaseEncoded {
        variant: BaseVariant,
        data: BaseEncodedData,
    },
    /// Any tag stack that matched none of the recognized refinements
    /// above; preserved verbatim in encounter order (§4.8).
    Tagged { tags: Vec<u64>, value: Box<Value> },
}

impl Value {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt(IntRepr::Native(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::UInt(IntRepr::Native(v)) => i64::try_from(*v).ok(),
            Value::NegInt(IntRepr::Native(n)) => {
                // mathematical value is -1 - n
                if *n <= i64::MAX as u64 {
                    Some(-1 - *n as i64)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::TextString(TextStringValue::Definite(s)) => Some(s.as_str()),
            Value::Uri(s) | Value::Mime(s) | Value::Regexp(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(&a.items),
            Value::Set(items) => Some(items),
            _ => None,
        }
    }

    /// Decodes a base64/base64url/base16 wrapper (tags 21-23, 33-34) back
    /// to raw bytes; see [`BaseEncodedData::decode_to_bytes`].
    pub fn decoded_base_bytes(&self) -> Option<Vec<u8>> {
        match self {
            Value::BaseEncoded { variant, data } => data.decode_to_bytes(*variant),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&OrderedMap> {
        match self {
            Value::Map(m) => Some(&m.entries),
            _ => None,
        }
    }

    /// Strips a generic tag wrapper, returning the inner value and the
    /// tags that were carried (empty if this wasn't a `Tagged` value).
    pub fn untagged(&self) -> (&Value, &[u64]) {
        match self {
            Value::Tagged { tags, value } => (value.as_ref(), tags.as_slice()),
            other => (other, &[]),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(IntRepr::Native(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        if v >= 0 {
            Value::UInt(IntRepr::Native(v as u64))
        } else {
            Value::NegInt(IntRepr::Native((-1 - v) as u64))
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(FloatValue::Double(v))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::TextString(TextStringValue::Definite(s))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::TextString(TextStringValue::Definite(s.to_string()))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(ArrayValue {
            items,
            indefinite: false,
        })
    }
}
