use thiserror::Error;

/// Fatal decoding failures. Anything recoverable is reported through a
/// [`Diagnostics`](crate::Diagnostics) sink instead.
#[derive(Error, Debug)]
pub enum OptError {
    #[error("unexpected end of data at 0x{offset:X}: need {need} bytes, have {have}")]
    UnexpectedEof {
        offset: usize,
        need: usize,
        have: usize,
    },
    #[error("stored pointer 0x{pointer:X} resolves to invalid stream position {position}")]
    InvalidPointer { pointer: i64, position: i64 },
    #[error(
        "file length expected is {declared} but actual length is {actual}; file may be corrupt"
    )]
    LengthMismatch { declared: i64, actual: usize },
    #[error("unsupported version marker {0}")]
    InvalidVersion(i32),
    #[error("node nesting exceeds {depth} levels at 0x{offset:X}")]
    RecursionLimit { depth: usize, offset: usize },
    #[error("parse error at 0x{offset:X}: {detail}")]
    Parse { offset: usize, detail: String },
    #[error("IO error")]
    Io(#[from] std::io::Error),
}

impl OptError {
    /// True for errors caused by running out of input, which some payloads
    /// tolerate.
    pub fn is_eof(&self) -> bool {
        matches!(self, OptError::UnexpectedEof { .. })
    }
}

pub type IResult<T> = Result<T, OptError>;
