//! Client Module
//!
//! Blocking TCP client plus the helpers the interactive CLI needs.

mod format;
mod tokenizer;

use std::io::BufWriter;
use std::net::TcpStream;
use std::time::Duration;

use crate::error::{RespError, Result};
use crate::protocol::{write_value, Decoder, FrameReader, FrameResult, Value, MAX_BULK_LEN};

pub use format::format_value;
pub use tokenizer::{to_request, tokenize};

/// A connection to a respkv server
pub struct Client {
    reader: FrameReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to `addr`, applying `timeout_ms` to reads and writes (0 = none)
    pub fn connect(addr: &str, timeout_ms: u64) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .map_err(|e| RespError::Network(format!("failed to connect to {}: {}", addr, e)))?;
        stream.set_nodelay(true)?;

        if timeout_ms > 0 {
            let timeout = Some(Duration::from_millis(timeout_ms));
            stream.set_read_timeout(timeout)?;
            stream.set_write_timeout(timeout)?;
        }

        let read_stream = stream.try_clone()?;
        Ok(Self {
            reader: FrameReader::new(read_stream, Decoder::default(), MAX_BULK_LEN as usize),
            writer: BufWriter::new(stream),
        })
    }

    /// Send a request and wait for the response.
    ///
    /// An Error reply from the server comes back as
    /// `Ok(Err(DecodeError::ErrorReply(..)))`.
    pub fn send(&mut self, request: &Value) -> Result<FrameResult> {
        write_value(&mut self.writer, request)?;
        self.reader
            .read_frame()?
            .ok_or_else(|| RespError::Network("server closed the connection".to_string()))
    }

    /// Send command words as an Array of BulkStrings
    pub fn command<S: AsRef<str>>(&mut self, words: &[S]) -> Result<FrameResult> {
        self.send(&to_request(words))
    }
}
