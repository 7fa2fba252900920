//! Shared winnow-based parsers for the fixed-layout pieces of an OPT file.

use winnow::Parser;
use winnow::binary::{le_f32, le_i32, le_u16};
use winnow::combinator::repeat;
use winnow::error::ContextError;

use crate::vector::{Vector2, Vector3};

/// Common result type for winnow parsers.
pub type WResult<T> = Result<T, winnow::error::ErrMode<ContextError>>;

/// Byte width of a stored pointer or count.
pub const WORD_SIZE: usize = 4;
/// Byte width of a 2-vector (two f32).
pub const VECTOR2_SIZE: usize = 8;
/// Byte width of a 3-vector (three f32).
pub const VECTOR3_SIZE: usize = 12;
/// Byte width of one index tuple.
pub const INDEX_TUPLE_SIZE: usize = 16;

/// Parse a 2-vector stored as X, Y.
pub fn parse_vector2<V: Vector2>(input: &mut &[u8]) -> WResult<V> {
    let x = le_f32.parse_next(input)?;
    let y = le_f32.parse_next(input)?;
    Ok(V::from_xy(x, y))
}

/// Parse a 3-vector stored as X, Y, Z.
pub fn parse_vector3<V: Vector3>(input: &mut &[u8]) -> WResult<V> {
    let x = le_f32.parse_next(input)?;
    let y = le_f32.parse_next(input)?;
    let z = le_f32.parse_next(input)?;
    Ok(V::from_xyz(x, y, z))
}

/// Parse four consecutive i32 indices.
pub fn parse_index_tuple(input: &mut &[u8]) -> WResult<[i32; 4]> {
    let a = le_i32.parse_next(input)?;
    let b = le_i32.parse_next(input)?;
    let c = le_i32.parse_next(input)?;
    let d = le_i32.parse_next(input)?;
    Ok([a, b, c, d])
}

/// Parse `count` little-endian u16 values.
pub fn parse_u16_array(input: &mut &[u8], count: usize) -> WResult<Vec<u16>> {
    repeat(count, le_u16).parse_next(input)
}

/// Decode the bytes before the first NUL as ASCII. Bytes outside the ASCII
/// range become `?`.
pub fn ascii_until_nul(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    bytes[..end]
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { '?' })
        .collect()
}
