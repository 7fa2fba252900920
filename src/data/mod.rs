/// Shared winnow parsers for fixed-layout fields
pub mod parser_utils;
/// Pointer-aware cursor over an in-memory OPT file
pub mod reader;

pub use reader::OptReader;
