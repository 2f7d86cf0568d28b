//! Dispatch Module
//!
//! Routes a decoded request to a command handler and turns every outcome,
//! including decode failures, into a response Value.
//!
//! ## Request Shape
//! ```text
//! Array [ BulkString|SimpleString <name>, <arg>, ... ]
//! ```
//! Names are matched case-insensitively against the registry.

mod handlers;

use std::collections::HashMap;

use crate::error::CommandError;
use crate::protocol::{encode, Decoder, FrameResult, Value};

pub use handlers::{echo, ping};

/// A command implementation. Receives the arguments after the name.
pub type Handler = Box<dyn Fn(&[Value]) -> Result<Value, CommandError> + Send + Sync>;

/// Sent when even an error reply cannot be encoded
const FALLBACK_REPLY: &[u8] = b"-ERR internal error\r\n";

/// Command registry
pub struct Dispatcher {
    handlers: HashMap<String, Handler>,
    decoder: Decoder,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Decoder::default())
    }
}

impl Dispatcher {
    /// Dispatcher with the built-in PING and ECHO commands
    pub fn new(decoder: Decoder) -> Self {
        let mut dispatcher = Self::empty(decoder);
        dispatcher.register("PING", ping);
        dispatcher.register("ECHO", echo);
        dispatcher
    }

    /// Dispatcher with no commands registered
    pub fn empty(decoder: Decoder) -> Self {
        Self {
            handlers: HashMap::new(),
            decoder,
        }
    }

    /// Add or replace a command. Returns `true` if a command was replaced.
    pub fn register<F>(&mut self, name: &str, handler: F) -> bool
    where
        F: Fn(&[Value]) -> Result<Value, CommandError> + Send + Sync + 'static,
    {
        self.handlers
            .insert(name.to_ascii_uppercase(), Box::new(handler))
            .is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(&name.to_ascii_uppercase())
    }

    /// Run a request and return the handler's result
    pub fn execute(&self, request: &Value) -> Result<Value, CommandError> {
        let parts = match request {
            Value::Array(Some(parts)) => parts,
            _ => return Err(CommandError::InvalidFormat),
        };

        let (name, args) = parts.split_first().ok_or(CommandError::EmptyCommand)?;
        let name = name.as_string_bytes().ok_or(CommandError::NotAString)?;
        let name = String::from_utf8_lossy(name);

        let handler = self
            .handlers
            .get(&name.to_ascii_uppercase())
            .ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?;

        tracing::trace!("Executing {} with {} argument(s)", name, args.len());
        handler(args)
    }

    /// Response Value for a request; failures become Error values
    pub fn dispatch(&self, request: &Value) -> Value {
        match self.execute(request) {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Command failed: {}", e);
                error_reply(&e.to_string())
            }
        }
    }

    /// Response Value for a decode outcome
    pub fn dispatch_frame(&self, frame: &FrameResult) -> Value {
        match frame {
            Ok(request) => self.dispatch(request),
            Err(e) => {
                tracing::debug!("Rejecting undecodable request: {}", e);
                error_reply(&e.to_string())
            }
        }
    }

    /// Decode a raw request, run it and encode the response
    pub fn handle_request(&self, input: &[u8]) -> Vec<u8> {
        let frame = self.decoder.decode(input, 0).map(|(value, _)| value);
        let response = self.dispatch_frame(&frame);
        encode_response(&response)
    }
}

/// Error value with line breaks flattened so it always encodes
pub fn error_reply(message: &str) -> Value {
    Value::Error(message.replace(['\r', '\n'], " "))
}

/// Encode a response, substituting an error reply if it cannot be encoded
pub fn encode_response(response: &Value) -> Vec<u8> {
    encode(response).unwrap_or_else(|e| {
        tracing::warn!("Failed to encode response: {}", e);
        encode(&error_reply(&e.to_string())).unwrap_or_else(|_| FALLBACK_REPLY.to_vec())
    })
}
