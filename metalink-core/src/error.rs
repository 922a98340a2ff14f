//! Error types for Metalink parsing.
//!
//! Recoverable problems (missing required attributes, malformed numbers)
//! never surface here - the state machine skips or defaults them inline.
//! Only fatal conditions become a [`ParseError`].

use std::fmt;

/// Fatal error codes for a parse.
///
/// Each maps to a distinct non-zero integer so embedders can report a
/// single status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    /// Malformed XML reported by the tokenizer.
    ParserError = 1,
    /// A collection could not grow to accept a committed entity.
    OutOfMemory = 2,
    /// An attribute list was malformed beyond what the tokenizer caught.
    BadAttribute = 3,
    /// Builder invariant violation: a commit or setter ran with no
    /// staged entity of the right kind.
    InvalidState = 4,
}

impl ErrorCode {
    /// Stable integer value for this code.
    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Get a human-readable message for this error code.
    pub fn message(self) -> &'static str {
        match self {
            Self::ParserError => "malformed XML",
            Self::OutOfMemory => "out of memory",
            Self::BadAttribute => "bad attribute",
            Self::InvalidState => "invalid builder state",
        }
    }
}

/// Error returned when parsing fails.
#[derive(Debug)]
pub struct ParseError {
    pub code: ErrorCode,
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(code: ErrorCode) -> Self {
        ParseError { code, message: code.message().to_owned() }
    }

    pub(crate) fn tokenizer(detail: impl fmt::Display) -> Self {
        ParseError {
            code: ErrorCode::ParserError,
            message: detail.to_string(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code.code())
    }
}

impl std::error::Error for ParseError {}
