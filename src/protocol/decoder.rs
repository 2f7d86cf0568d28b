//! Protocol decoder
//!
//! Cursor-based recursive descent over a single borrowed buffer. Each
//! call returns the decoded value together with the offset just past its
//! frame, so array elements are decoded in place without copying
//! sub-slices around.
//!
//! A standalone top-level Error frame is reported as
//! [`DecodeError::ErrorReply`]; the same frame inside an array stays a
//! [`Value::Error`] element so arrays can mix successes and errors.

use bytes::Bytes;

use super::encoder::CRLF;
use super::Value;
use crate::error::DecodeError;

/// Default maximum array nesting depth
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Maximum length of a bulk string in bytes (512 MB)
pub const MAX_BULK_LEN: i64 = 512 * 1024 * 1024;

/// Upper bound on up-front element allocation. A declared count is only a
/// claim until the elements actually parse.
const PREALLOC_CAP: usize = 1024;

type Decoded = Result<(Value, usize), DecodeError>;

/// Decode one frame starting at `offset` with the default depth limit
pub fn decode(buf: &[u8], offset: usize) -> Decoded {
    Decoder::default().decode(buf, offset)
}

/// Frame decoder with a configurable nesting limit
#[derive(Debug, Clone, Copy)]
pub struct Decoder {
    max_depth: usize,
}

impl Default for Decoder {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Decoder {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Decode the frame at `offset`.
    ///
    /// Returns the value and the offset of the first byte after it.
    pub fn decode(&self, buf: &[u8], offset: usize) -> Decoded {
        match self.decode_value(buf, offset, 0)? {
            (Value::Error(message), _) => Err(DecodeError::ErrorReply(message)),
            decoded => Ok(decoded),
        }
    }

    /// `depth` counts the arrays enclosing the frame at `offset`
    fn decode_value(&self, buf: &[u8], offset: usize, depth: usize) -> Decoded {
        let tag = *buf.get(offset).ok_or(DecodeError::FrameIncomplete)?;

        match tag {
            b'+' => {
                let (line, next) = read_line(buf, offset + 1)?;
                Ok((Value::SimpleString(to_text(line, "simple string")?), next))
            }
            b'-' => {
                let (line, next) = read_line(buf, offset + 1)?;
                Ok((Value::Error(to_text(line, "error")?), next))
            }
            b':' => {
                let (line, next) = read_line(buf, offset + 1)?;
                Ok((Value::Integer(parse_i64(line)?), next))
            }
            b'$' => decode_bulk(buf, offset),
            b'*' => self.decode_array(buf, offset, depth),
            other => Err(DecodeError::UnknownType(other)),
        }
    }

    fn decode_array(&self, buf: &[u8], offset: usize, depth: usize) -> Decoded {
        let (header, mut cursor) = read_line(buf, offset + 1)?;
        let count = parse_i64(header)?;

        if count == -1 {
            return Ok((Value::Array(None), cursor));
        }
        if count < 0 {
            return Err(DecodeError::MalformedFrame(format!(
                "invalid array length {}",
                count
            )));
        }
        if depth >= self.max_depth {
            return Err(DecodeError::DepthExceeded(self.max_depth));
        }

        let count = usize::try_from(count).map_err(|_| {
            DecodeError::MalformedFrame(format!("array length {} out of range", count))
        })?;

        let mut elements = Vec::with_capacity(count.min(PREALLOC_CAP));
        for _ in 0..count {
            let (element, next) = self.decode_value(buf, cursor, depth + 1)?;
            elements.push(element);
            cursor = next;
        }

        Ok((Value::Array(Some(elements)), cursor))
    }
}

fn decode_bulk(buf: &[u8], offset: usize) -> Decoded {
    let (header, content_start) = read_line(buf, offset + 1)?;
    let len = parse_i64(header)?;

    if len == -1 {
        return Ok((Value::BulkString(None), content_start));
    }
    if !(0..=MAX_BULK_LEN).contains(&len) {
        return Err(DecodeError::MalformedFrame(format!(
            "invalid bulk string length {}",
            len
        )));
    }

    let content_end = content_start + len as usize;
    let frame_end = content_end + CRLF.len();

    // Only terminator bytes that have actually arrived can disagree with CRLF;
    // content is binary-safe and may itself contain CRLF.
    let received = &buf[content_end.min(buf.len())..frame_end.min(buf.len())];
    if received != &CRLF[..received.len()] {
        return Err(DecodeError::MalformedFrame(format!(
            "bulk string of declared length {} is not terminated by CRLF",
            len
        )));
    }
    if buf.len() < frame_end {
        return Err(DecodeError::FrameIncomplete);
    }

    let data = Bytes::copy_from_slice(&buf[content_start..content_end]);
    Ok((Value::BulkString(Some(data)), frame_end))
}

/// Finds the CRLF at or after `start`.
///
/// Returns the bytes before it and the offset just past it.
fn read_line(buf: &[u8], start: usize) -> Result<(&[u8], usize), DecodeError> {
    let rest = buf.get(start..).ok_or(DecodeError::FrameIncomplete)?;
    let end = rest
        .windows(CRLF.len())
        .position(|window| window == CRLF)
        .ok_or(DecodeError::FrameIncomplete)?;

    Ok((&rest[..end], start + end + CRLF.len()))
}

fn parse_i64(line: &[u8]) -> Result<i64, DecodeError> {
    std::str::from_utf8(line)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| {
            DecodeError::MalformedFrame(format!(
                "invalid integer {:?}",
                String::from_utf8_lossy(line)
            ))
        })
}

fn to_text(line: &[u8], kind: &str) -> Result<String, DecodeError> {
    String::from_utf8(line.to_vec())
        .map_err(|_| DecodeError::MalformedFrame(format!("invalid utf-8 in {}", kind)))
}
