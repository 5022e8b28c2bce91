use thiserror::Error;

use crate::chunk::ChunkId;

/// Structural problems with a container or chunk record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("unrecognised container signature {found:?}")]
    UnknownSignature { found: ChunkId },

    #[error("unrecognised form tag {found:?}")]
    UnknownFormTag { found: ChunkId },

    #[error("chunk ids must be exactly 4 bytes long (got {len})")]
    ChunkIdLength { len: usize },

    #[error("chunk {id:?} declares {declared} bytes but carries {actual}")]
    SizeMismatch { id: ChunkId, declared: u64, actual: u64 },

    #[error("body was expected to end at offset {expected:#x} but ended at {actual:#x}")]
    EndMismatch { expected: usize, actual: usize },

    #[error("chunk {id:?} at offset {offset:#x} needs {need} bytes but its parent only has {left} left")]
    SpanOverrun { id: ChunkId, offset: usize, need: u64, left: u64 },

    #[error("group chunk {id:?} must carry exactly 4 bytes of group type (got {len})")]
    MalformedGroup { id: ChunkId, len: u64 },

    #[error("chunk {id:?} has children but {reason}")]
    UnexpectedChildren { id: ChunkId, reason: &'static str },

    #[error("{what} of {value} does not fit in its {width}-bit size field")]
    SizeOverflow { what: &'static str, value: u64, width: u32 },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid format: {0}")]
    Format(#[from] FormatError),

    #[error("unexpected end of data at offset {offset:#x} (need {need} bytes, have {have})")]
    Truncated { offset: usize, need: u64, have: usize },

    #[error("invalid argument: {0}")]
    Argument(&'static str),

    #[error("index {index} is out of range (len {len})")]
    OutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn is_format(&self) -> bool { matches!(self, Error::Format(_)) }

    pub fn is_truncation(&self) -> bool { matches!(self, Error::Truncated { .. }) }
}

pub type Result<T> = std::result::Result<T, Error>;
