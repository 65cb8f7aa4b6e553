use thiserror::Error;

use crate::scene::Guid;

/// Everything that can go wrong while decoding a scene stream.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("scene stream ended early or could not be read")]
    Io(#[from] std::io::Error),
    #[error("bad scene cookie {0:#010x}")]
    BadCookie(u32),
    #[error("negative {what} count {count}")]
    NegativeCount { what: &'static str, count: i32 },
    #[error("{what} {guid} does not resolve")]
    UnknownGuid { what: &'static str, guid: Guid },
    #[error("string is not valid UTF-16")]
    InvalidString,
    #[error("invalid {what} value {value}")]
    InvalidEnum { what: &'static str, value: u32 },
    #[error("{texels} radiance texels do not form six square power of two faces")]
    InvalidCubemap { texels: usize },
    #[error("{what} index {index} out of range for {len} entries")]
    IndexOutOfRange { what: &'static str, index: i64, len: usize },
}

pub type ImportResult<T> = Result<T, ImportError>;
