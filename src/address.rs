/// Converts between pointers as stored in an OPT file and real stream
/// positions.
///
/// The engine loads the file body at a fixed address, so every pointer in the
/// file (names, data blocks, child tables) is biased by the same per-file
/// `global_offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AddressTranslator {
    global_offset: i32,
}

impl AddressTranslator {
    pub fn new(global_offset: i32) -> Self {
        Self { global_offset }
    }

    pub fn global_offset(&self) -> i32 {
        self.global_offset
    }

    /// Physical stream position for a pointer read from the file.
    pub fn to_stream_position(&self, stored: i64) -> i64 {
        stored - self.global_offset as i64
    }

    /// The pointer value that would be stored in the file for a stream
    /// position.
    pub fn to_stored_pointer(&self, position: i64) -> i64 {
        position + self.global_offset as i64
    }

    /// Whether `stored` can point past the header at all. Pointers at or below
    /// the global offset land on the header or before the file start.
    pub fn is_plausible(&self, stored: i64) -> bool {
        stored > self.global_offset as i64
    }
}
