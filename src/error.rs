//! Error types for respkv
//!
//! Each layer has its own error enum; `RespError` unifies them for
//! callers that cross layers (network, binaries).

use thiserror::Error;

/// Result type alias using RespError
pub type Result<T> = std::result::Result<T, RespError>;

/// Unified error type for respkv operations
#[derive(Debug, Error)]
pub enum RespError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    // -------------------------------------------------------------------------
    // Dispatch Errors
    // -------------------------------------------------------------------------
    #[error(transparent)]
    Command(#[from] CommandError),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failure to turn bytes into a [`Value`](crate::protocol::Value)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer ends before the frame does. A streaming transport should
    /// read more bytes and retry.
    #[error("frame incomplete")]
    FrameIncomplete,

    /// Length, terminator or numeric format mismatch.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// Unrecognized leading type byte.
    #[error("unknown type byte: {0:#04x}")]
    UnknownType(u8),

    /// Arrays nested deeper than the decoder allows.
    #[error("nesting depth exceeds limit of {0}")]
    DepthExceeded(usize),

    /// A standalone top-level Error frame. Carries the peer's text verbatim.
    #[error("{0}")]
    ErrorReply(String),
}

impl DecodeError {
    /// True when waiting for more bytes could turn this into a success
    pub fn is_incomplete(&self) -> bool {
        matches!(self, DecodeError::FrameIncomplete)
    }
}

/// Failure to serialize a Value
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// SimpleString or Error text containing CR or LF
    #[error("invalid content: {0:?} contains CR or LF")]
    InvalidContent(String),
}

/// Dispatcher-level failures. Display text is what the peer sees.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("invalid command format")]
    InvalidFormat,

    #[error("empty command")]
    EmptyCommand,

    #[error("command must be a string")]
    NotAString,

    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    #[error("{0} requires an argument")]
    MissingArgument(&'static str),

    #[error("{0} accepts exactly one argument")]
    TooManyArguments(&'static str),

    #[error("{0} argument must be a string")]
    ArgumentNotString(&'static str),
}
