//! The length reader (§4.1): decodes the argument carried by an initial
//! byte's additional-information field, promoting to a big integer when a
//! full 8-byte argument would otherwise lose precision.

use std::io::Read;

use byteorder::{ReadBytesExt, BE};
use num_bigint::BigUint;

use crate::error::{digest_eof, CborError, CborResult};
use crate::value::IntRepr;

/// High 32 bits threshold from the source decoder: an 8-byte argument whose
/// upper half exceeds this is carried as a big integer rather than a native
/// `u64`, even though it would technically still fit. Values at or below
/// the threshold stay exactly representable without the extra allocation.
const EIGHT_BYTE_BIG_THRESHOLD: u32 = 0x001F_FFFF;

/// Reads the argument for additional-information field `info`.
///
/// Returns `(argument, bytes_consumed)` where `bytes_consumed` counts only
/// the follow-on bytes (0, 1, 2, 4 or 8) — the initial byte itself is the
/// caller's concern. `info` must not be 31 (indefinite); callers detect
/// that sentinel before reaching here.
pub(crate) fn read_length<R: Read>(reader: &mut R, info: u8) -> CborResult<(IntRepr, usize)> {
    match info {
        0..=23 => Ok((IntRepr::Native(info as u64), 0)),
        24 => {
            let v = digest_eof(reader.read_u8())?;
            Ok((IntRepr::Native(v as u64), 1))
        }
        25 => {
            let v = digest_eof(reader.read_u16::<BE>())?;
            Ok((IntRepr::Native(v as u64), 2))
        }
        26 => {
            let v = digest_eof(reader.read_u32::<BE>())?;
            Ok((IntRepr::Native(v as u64), 4))
        }
        27 => {
            let v = digest_eof(reader.read_u64::<BE>())?;
            let high32 = (v >> 32) as u32;
            let repr = if high32 > EIGHT_BYTE_BIG_THRESHOLD {
                IntRepr::Big(BigUint::from(v))
            } else {
                IntRepr::Native(v)
            };
            Ok((repr, 8))
        }
        _ => Err(CborError::MalformedHeader { info }),
    }
}
