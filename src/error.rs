use std::fmt;

/// Everything that can go wrong while decoding a CBOR item.
///
/// A flat enum with a hand-written `Display` impl, the same shape the
/// ancestor decoder uses for its own error type, rather than a boxed
/// `dyn Error` or a `thiserror`-derived type.
#[derive(Debug, Clone, PartialEq)]
pub enum CborError {
    /// The buffer ran out while an item was still being read.
    UnexpectedEof,
    /// The additional-information field of an initial byte was 28, 29 or 30.
    MalformedHeader { info: u8 },
    /// The additional-information field of a major-7 item was not a
    /// recognized simple value or float width.
    MalformedSimple { info: u8 },
    /// A chunk inside an indefinite byte/text string was not a definite
    /// string of the expected major type.
    MalformedIndefinite { found_major: u8 },
    /// A tag-4/5 payload was not an array of exactly two numeric elements.
    MalformedTagPayload { tag: u64 },
    /// Byte content of a text string was not valid UTF-8.
    InvalidUtf8,
    /// An 8-byte argument was supposed to fit a native width but did not.
    IntegerOutOfRange,
    /// A tag-0 payload could not be parsed as an RFC 3339 date string.
    InvalidRfc3339(String),
    /// Recursion bound (see `DecodeOptions::max_depth`) was exhausted.
    DepthExceeded { limit: usize },
    /// Strict mode: the decoded item did not consume the entire buffer.
    TrailingBytes { consumed: usize, total: usize },
    /// Strict mode: a map contained the same key more than once.
    DuplicateMapKey,
}

pub type CborResult<T> = Result<T, CborError>;

/// Lifts a failed read from the in-memory cursor into `UnexpectedEof`.
pub(crate) fn digest_eof<T>(r: Result<T, std::io::Error>) -> CborResult<T> {
    match r {
        Ok(v) => Ok(v),
        Err(_) => Err(CborError::UnexpectedEof),
    }
}

impl fmt::Display for CborError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CborError::UnexpectedEof => write!(f, "unexpected end of input while decoding an item"),
            CborError::MalformedHeader { info } => write!(
                f,
                "malformed initial byte: additional-information field {} is reserved",
                info
            ),
            CborError::MalformedSimple { info } => write!(
                f,
                "malformed major-7 item: additional-information field {} is not a known simple value or float width",
                info
            ),
            CborError::MalformedIndefinite { found_major } => write!(
                f,
                "chunk inside an indefinite string had major type {}, expected a matching definite string",
                found_major
            ),
            CborError::MalformedTagPayload { tag } => write!(
                f,
                "tag {} requires an array of exactly two numeric elements",
                tag
            ),
            CborError::InvalidUtf8 => write!(f, "text string bytes were not valid UTF-8"),
            CborError::IntegerOutOfRange => {
                write!(f, "integer argument does not fit the claimed native width")
            }
            CborError::InvalidRfc3339(msg) => {
                write!(f, "tag 0 payload is not a valid RFC 3339 date: {}", msg)
            }
            CborError::DepthExceeded { limit } => write!(
                f,
                "recursion depth exceeded the configured limit of {}",
                limit
            ),
            CborError::TrailingBytes { consumed, total } => write!(
                f,
                "decoded item consumed {} of {} bytes; trailing data remains",
                consumed, total
            ),
            CborError::DuplicateMapKey => write!(f, "map contained a duplicate key"),
        }
    }
}

impl std::error::Error for CborError {}
