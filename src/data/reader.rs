use winnow::Parser;
use winnow::binary::{le_f32, le_i16, le_i32, le_u32};

use crate::address::AddressTranslator;
use crate::data::parser_utils::{
    self, INDEX_TUPLE_SIZE, VECTOR2_SIZE, VECTOR3_SIZE, WORD_SIZE, WResult, ascii_until_nul,
};
use crate::error::{IResult, OptError};
use crate::vector::{Vector2, Vector3};

/// Cursor over a whole OPT file held in memory.
///
/// Every read advances the cursor. Pointers read from the file are followed
/// with [`OptReader::seek`], which applies the file's global offset.
#[derive(Debug, Clone)]
pub struct OptReader<'a> {
    data: &'a [u8],
    pos: usize,
    address: AddressTranslator,
}

impl<'a> OptReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            address: AddressTranslator::default(),
        }
    }

    pub fn address(&self) -> AddressTranslator {
        self.address
    }

    pub fn set_address(&mut self, address: AddressTranslator) {
        self.address = address;
    }

    /// Current stream position. May sit past the end after a fixed-width
    /// string that ended in a NUL close to EOF.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn remaining(&self) -> &'a [u8] {
        self.data.get(self.pos..).unwrap_or(&[])
    }

    /// Move to the stream position a stored pointer refers to.
    pub fn seek(&mut self, stored: impl Into<i64>) -> IResult<()> {
        let stored = stored.into();
        let position = self.address.to_stream_position(stored);
        if position < 0 || position > self.data.len() as i64 {
            return Err(OptError::InvalidPointer {
                pointer: stored,
                position,
            });
        }
        self.pos = position as usize;
        Ok(())
    }

    /// Move to a raw stream position.
    pub fn seek_position(&mut self, position: usize) -> IResult<()> {
        if position > self.data.len() {
            return Err(OptError::InvalidPointer {
                pointer: self.address.to_stored_pointer(position as i64),
                position: position as i64,
            });
        }
        self.pos = position;
        Ok(())
    }

    /// Return to a position read earlier, clamped to the end of the data.
    pub fn restore_position(&mut self, position: usize) {
        self.pos = position.min(self.data.len());
    }

    /// Stream position a stored pointer refers to, without moving.
    pub fn stream_position_of(&self, stored: i32) -> i64 {
        self.address.to_stream_position(stored as i64)
    }

    /// Consume exactly `n` bytes. Fails without moving if fewer remain.
    pub fn take(&mut self, n: usize) -> IResult<&'a [u8]> {
        let remaining = self.remaining();
        if remaining.len() < n {
            return Err(OptError::UnexpectedEof {
                offset: self.pos,
                need: n,
                have: remaining.len(),
            });
        }
        self.pos += n;
        Ok(&remaining[..n])
    }

    fn parse<O>(
        &mut self,
        need: usize,
        parser: impl FnOnce(&mut &'a [u8]) -> WResult<O>,
    ) -> IResult<O> {
        let offset = self.pos;
        let mut input = self.take(need)?;
        parser(&mut input).map_err(|e| OptError::Parse {
            offset,
            detail: format!("{e}"),
        })
    }

    pub fn read_i32(&mut self) -> IResult<i32> {
        self.parse(WORD_SIZE, |input| le_i32.parse_next(input))
    }

    pub fn read_u32(&mut self) -> IResult<u32> {
        self.parse(WORD_SIZE, |input| le_u32.parse_next(input))
    }

    pub fn read_i16(&mut self) -> IResult<i16> {
        self.parse(2, |input| le_i16.parse_next(input))
    }

    pub fn read_f32(&mut self) -> IResult<f32> {
        self.parse(WORD_SIZE, |input| le_f32.parse_next(input))
    }

    /// Look at the next i32 without consuming it.
    pub fn peek_i32(&self) -> Option<i32> {
        let bytes = self.remaining().get(..WORD_SIZE)?;
        let input = &mut &bytes[..];
        le_i32::<_, winnow::error::ContextError>
            .parse_next(input)
            .ok()
    }

    pub fn read_index_tuple(&mut self) -> IResult<[i32; 4]> {
        self.parse(INDEX_TUPLE_SIZE, parser_utils::parse_index_tuple)
    }

    pub fn read_vector2<V: Vector2>(&mut self) -> IResult<V> {
        self.parse(VECTOR2_SIZE, parser_utils::parse_vector2::<V>)
    }

    pub fn read_vector3<V: Vector3>(&mut self) -> IResult<V> {
        self.parse(VECTOR3_SIZE, parser_utils::parse_vector3::<V>)
    }

    pub fn read_u16_array(&mut self, count: usize) -> IResult<Vec<u16>> {
        self.parse(count * 2, |input| parser_utils::parse_u16_array(input, count))
    }

    pub fn read_bytes(&mut self, n: usize) -> IResult<Vec<u8>> {
        Ok(self.take(n)?.to_vec())
    }

    /// Read a fixed-width ASCII field.
    ///
    /// The text stops at the first NUL or fills the whole width. The cursor
    /// always advances by exactly `width`, so a NUL-terminated name close to
    /// EOF may leave the cursor past the end of the data.
    pub fn read_string(&mut self, width: usize) -> IResult<String> {
        let remaining = self.remaining();
        let window = &remaining[..width.min(remaining.len())];
        let terminated = window.contains(&0);
        if !terminated && window.len() < width {
            return Err(OptError::UnexpectedEof {
                offset: self.pos,
                need: width,
                have: remaining.len(),
            });
        }
        self.pos += width;
        Ok(ascii_until_nul(window))
    }

    /// Read `count` items with `f`, never pre-allocating more than the
    /// remaining bytes could hold.
    pub fn read_list<T>(
        &mut self,
        count: usize,
        item_size: usize,
        mut f: impl FnMut(&mut Self) -> IResult<T>,
    ) -> IResult<Vec<T>> {
        let capacity = count.min(self.remaining().len() / item_size.max(1));
        let mut items = Vec::with_capacity(capacity);
        for _ in 0..count {
            items.push(f(self)?);
        }
        Ok(items)
    }
}
