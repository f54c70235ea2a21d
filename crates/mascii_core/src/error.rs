//! Error types for Maya ASCII decoding.
//!
//! Two layers are distinguished:
//!
//! - [`DecodeError`]: a failure confined to one command. The parse pass
//!   records it as a [`CommandError`] and moves on to the next command.
//! - [`ParseError`]: a failure that aborts the whole pass (I/O, input that
//!   never terminates, or any command error when running strict).

use thiserror::Error;

use crate::command::CommandType;
use crate::ma::types::AttrType;

/// Errors confined to a single command.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("Unterminated {context}, remaining input: {remaining:?}")]
    Lex {
        context: &'static str,
        remaining: String,
    },

    #[error("Unknown attribute type: {0}")]
    UnknownAttrType(String),

    #[error("Truncated {attr_type} value: expected {expected} tokens, found {actual}")]
    TruncatedRecord {
        attr_type: AttrType,
        expected: usize,
        actual: usize,
    },

    #[error("Cannot continue {path}: stored as {existing}, got {incoming}")]
    AttrTypeMismatch {
        path: String,
        existing: AttrType,
        incoming: AttrType,
    },

    #[error("Invalid reference edit opcode {opcode:?} at token {position}")]
    ReferenceEdit { opcode: String, position: usize },

    #[error("Invalid number format: {0}")]
    InvalidNumber(String),

    #[error("Invalid {expected}: {found:?}")]
    InvalidValue {
        expected: &'static str,
        found: String,
    },

    #[error("{command}: missing {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },
}

/// Result type for per-command decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// A decode failure attached to the command it came from.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("line {line} ({kind}): {source}")]
pub struct CommandError {
    /// First source line of the command
    pub line: usize,

    /// Command keyword
    pub kind: CommandType,

    #[source]
    pub source: DecodeError,
}

/// Errors that abort a parse pass.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unterminated command starting at line {line}")]
    Unterminated { line: usize },

    #[error("Parse error at line {line}: {source}")]
    Command {
        line: usize,
        #[source]
        source: DecodeError,
    },
}

impl From<CommandError> for ParseError {
    fn from(err: CommandError) -> Self {
        ParseError::Command {
            line: err.line,
            source: err.source,
        }
    }
}

/// Result type for parse passes.
pub type ParseResult<T> = Result<T, ParseError>;
