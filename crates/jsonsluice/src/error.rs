//! Error type shared by every stage of the pipeline.
//!
//! Every failure carries the byte offset (from the start of the stream) at
//! which it was detected, plus a human-readable message. All errors are fatal
//! to the iteration that produced them.

use std::fmt;

/// Classifies a streaming failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed bytes at the token level: bad escape, bad number, unknown
    /// keyword, stray byte, premature end of a lexeme.
    Lexical,
    /// Tokens in an order JSON does not allow: unbalanced brackets, missing
    /// comma or colon, a value where a key was expected.
    Structural,
    /// The pointer string is not RFC 6901.
    PointerSyntax,
    /// The stream ended without the pointer matching a container.
    PointerNotFound,
    /// The pointer matched a scalar rather than an object or array.
    PointerNotIterable,
    /// The leaf decoder rejected a child's raw bytes.
    Decode,
    /// The byte source failed.
    Io,
}

impl ErrorKind {
    fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Lexical => "lexical error",
            ErrorKind::Structural => "structural error",
            ErrorKind::PointerSyntax => "pointer syntax error",
            ErrorKind::PointerNotFound => "pointer not found",
            ErrorKind::PointerNotIterable => "pointer not iterable",
            ErrorKind::Decode => "decode error",
            ErrorKind::Io => "i/o error",
        }
    }
}

/// An error raised while streaming items out of a JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    offset: u64,
    msg: String,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, offset: u64, msg: impl Into<String>) -> Self {
        Self {
            kind,
            offset,
            msg: msg.into(),
        }
    }

    pub(crate) fn lexical(offset: u64, msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Lexical, offset, msg)
    }

    pub(crate) fn structural(offset: u64, msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Structural, offset, msg)
    }

    pub(crate) fn pointer_syntax(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::PointerSyntax, 0, msg)
    }

    pub(crate) fn pointer_not_found(offset: u64) -> Self {
        Self::new(
            ErrorKind::PointerNotFound,
            offset,
            "stream ended before the pointer matched a container",
        )
    }

    pub(crate) fn pointer_not_iterable(offset: u64) -> Self {
        Self::new(
            ErrorKind::PointerNotIterable,
            offset,
            "pointer matched a scalar value",
        )
    }

    pub(crate) fn decode(offset: u64, msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Decode, offset, msg)
    }

    pub(crate) fn io(offset: u64, err: &std::io::Error) -> Self {
        Self::new(ErrorKind::Io, offset, err.to_string())
    }

    /// The failure classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Byte offset from the start of the stream at which the error was
    /// detected. For malformed lexemes this is the offset of the first byte
    /// of the lexeme.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// The human-readable message, without the kind/offset prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.msg
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at byte {}: {}",
            self.kind.as_str(),
            self.offset,
            self.msg
        )
    }
}

impl std::error::Error for Error {}
