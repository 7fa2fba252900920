//! Top-of-file header.
//!
//! Two schemas exist. Modern files start with the negated format version
//! followed by the body length (the file length minus an 8-byte prelude).
//! Legacy files start directly with the total file length and are version 0.
//! Both continue with the raw global offset, a 16-bit word of unknown use,
//! and the root part table.

use tracing::debug;

use crate::address::AddressTranslator;
use crate::data::OptReader;
use crate::diagnostics::Diagnostics;
use crate::error::{IResult, OptError};

/// Bytes of the modern header that the declared length does not count.
pub const MODERN_PRELUDE_LENGTH: i64 = 8;
/// Value normally found in the header's unknown-use word.
pub const EXPECTED_UNKNOWN_WORD: i16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptHeader {
    /// 0 for the legacy schema.
    pub version: u32,
    /// Total file length the header claims, prelude included.
    pub declared_length: i64,
    pub global_offset: i32,
    pub unknown_word: i16,
    pub root_count: i32,
    /// Stored pointer to the root child-address table.
    pub root_table: i32,
}

impl OptHeader {
    pub fn address(&self) -> AddressTranslator {
        AddressTranslator::new(self.global_offset)
    }

    pub fn is_legacy(&self) -> bool {
        self.version == 0
    }

    /// Parse the header from the start of the file.
    ///
    /// A declared length that disagrees with the real length is reported and
    /// then treated as fatal: nothing after it can be trusted.
    pub fn read(reader: &mut OptReader<'_>, diagnostics: &mut dyn Diagnostics) -> IResult<Self> {
        reader.seek_position(0)?;

        let marker = reader.read_i32()?;
        let (version, declared_length) = if marker < 0 {
            let version = marker
                .checked_neg()
                .ok_or(OptError::InvalidVersion(marker))?;
            let body_length = reader.read_i32()? as i64;
            (version as u32, body_length + MODERN_PRELUDE_LENGTH)
        } else {
            (0, marker as i64)
        };

        if declared_length != reader.len() as i64 {
            let err = OptError::LengthMismatch {
                declared: declared_length,
                actual: reader.len(),
            };
            diagnostics.report(&err.to_string());
            return Err(err);
        }

        // The bytes before the global offset field don't count towards it.
        let consumed = reader.position() as i32;
        let raw_global_offset = reader.read_i32()?;
        let global_offset = raw_global_offset.wrapping_sub(consumed);

        let unknown_word = reader.read_i16()?;
        if unknown_word != EXPECTED_UNKNOWN_WORD {
            diagnostics.report(&format!(
                "Unknown use header word normally containing {EXPECTED_UNKNOWN_WORD:X} contains {unknown_word:X}"
            ));
        }

        let root_count = reader.read_i32()?;
        let root_table = reader.read_i32()?;

        debug!(version, global_offset, root_count, "decoded OPT header");

        Ok(OptHeader {
            version,
            declared_length,
            global_offset,
            unknown_word,
            root_count,
            root_table,
        })
    }
}
