//! Stream-based I/O helpers
//!
//! The decoder works on a buffer that is assumed to hold a whole frame.
//! `FrameReader` is the transport side of that contract: it keeps reading
//! from the stream into a `BytesMut` until the decoder stops answering
//! `FrameIncomplete`.

use std::io::{ErrorKind, Read, Write};

use bytes::{Buf, BytesMut};

use super::{encode_into, Decoder, Value};
use crate::error::{DecodeError, RespError, Result};

/// Bytes requested from the stream per read
const READ_CHUNK_SIZE: usize = 4096;

/// Outcome of decoding one frame off the stream
pub type FrameResult = std::result::Result<Value, DecodeError>;

/// Reads whole frames off a byte stream
pub struct FrameReader<R> {
    reader: R,
    buffer: BytesMut,
    decoder: Decoder,
    max_buffer: usize,
}

impl<R: Read> FrameReader<R> {
    pub fn new(reader: R, decoder: Decoder, max_buffer: usize) -> Self {
        Self {
            reader,
            buffer: BytesMut::with_capacity(READ_CHUNK_SIZE),
            decoder,
            max_buffer,
        }
    }

    /// Read the next frame.
    ///
    /// Returns `Ok(None)` when the peer closes the stream between frames.
    /// A frame that fails to decode is returned as `Ok(Some(Err(..)))` and
    /// the buffered input is dropped so the next request starts clean.
    pub fn read_frame(&mut self) -> Result<Option<FrameResult>> {
        loop {
            // The pending frame is re-decoded from the start after every read.
            // Large frames arriving in many chunks cost quadratic parse work.
            if !self.buffer.is_empty() {
                match self.decoder.decode(&self.buffer, 0) {
                    Ok((value, next)) => {
                        self.buffer.advance(next);
                        return Ok(Some(Ok(value)));
                    }
                    Err(e) if e.is_incomplete() => {}
                    Err(e) => {
                        self.buffer.clear();
                        return Ok(Some(Err(e)));
                    }
                }
            }

            if self.buffer.len() >= self.max_buffer {
                return Err(RespError::Network(format!(
                    "pending frame exceeds {} bytes",
                    self.max_buffer
                )));
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let n = match self.reader.read(&mut chunk) {
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            if n == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Err(std::io::Error::new(
                    ErrorKind::UnexpectedEof,
                    "stream closed in the middle of a frame",
                )
                .into());
            }

            tracing::trace!("Read {} bytes, {} buffered", n, self.buffer.len() + n);
            self.buffer.extend_from_slice(&chunk[..n]);
        }
    }

    /// Bytes received but not yet consumed by a decoded frame
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }
}

/// Encode a value and write it to a stream
pub fn write_value<W: Write>(writer: &mut W, value: &Value) -> Result<()> {
    let mut bytes = BytesMut::new();
    encode_into(value, &mut bytes)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    /// Hands out its data a few bytes at a time
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        step: usize,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let end = (self.pos + self.step).min(self.data.len());
            let n = (end - self.pos).min(buf.len());
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    fn reader(data: &[u8]) -> FrameReader<Cursor<Vec<u8>>> {
        FrameReader::new(Cursor::new(data.to_vec()), Decoder::default(), 1024)
    }

    #[test]
    fn reads_consecutive_frames() {
        let mut frames = reader(b"+OK\r\n:5\r\n");
        assert_eq!(frames.read_frame().unwrap(), Some(Ok(Value::simple("OK"))));
        assert_eq!(frames.read_frame().unwrap(), Some(Ok(Value::Integer(5))));
        assert_eq!(frames.read_frame().unwrap(), None);
    }

    #[test]
    fn reassembles_split_frame() {
        let data = b"*2\r\n$4\r\nECHO\r\n$5\r\nhello\r\n".to_vec();
        let mut frames = FrameReader::new(
            Trickle { data, pos: 0, step: 3 },
            Decoder::default(),
            1024,
        );
        assert_eq!(
            frames.read_frame().unwrap(),
            Some(Ok(Value::array(vec![Value::bulk("ECHO"), Value::bulk("hello")])))
        );
        assert_eq!(frames.buffered(), 0);
    }

    /// Hands out its data in the given pieces, one per read
    struct Chunks(Vec<Vec<u8>>);

    impl Read for Chunks {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.0.is_empty() {
                return Ok(0);
            }
            let chunk = self.0.remove(0);
            buf[..chunk.len()].copy_from_slice(&chunk);
            Ok(chunk.len())
        }
    }

    #[test]
    fn split_after_embedded_crlf_is_reassembled() {
        let pieces = vec![b"*2\r\n$4\r\nECHO\r\n$6\r\na\r\n".to_vec(), b"b\r\n\r\n".to_vec()];
        let mut frames = FrameReader::new(Chunks(pieces), Decoder::default(), 1024);
        assert_eq!(
            frames.read_frame().unwrap(),
            Some(Ok(Value::array(vec![Value::bulk("ECHO"), Value::bulk(b"a\r\nb\r\n")])))
        );
        assert_eq!(frames.read_frame().unwrap(), None);
    }

    #[test]
    fn bad_frame_is_reported_and_dropped() {
        let mut frames = reader(b"?oops\r\n");
        assert_eq!(
            frames.read_frame().unwrap(),
            Some(Err(DecodeError::UnknownType(b'?')))
        );
        assert_eq!(frames.buffered(), 0);
        assert_eq!(frames.read_frame().unwrap(), None);
    }

    #[test]
    fn eof_mid_frame_is_io_error() {
        let mut frames = reader(b"$10\r\nabc");
        match frames.read_frame() {
            Err(RespError::Io(e)) => assert_eq!(e.kind(), ErrorKind::UnexpectedEof),
            other => panic!("expected UnexpectedEof, got {:?}", other),
        }
    }

    #[test]
    fn oversized_frame_rejected() {
        let mut data = b"$4096\r\n".to_vec();
        data.extend(std::iter::repeat(b'x').take(2000));
        let mut frames = FrameReader::new(Cursor::new(data), Decoder::default(), 16);
        assert!(matches!(frames.read_frame(), Err(RespError::Network(_))));
    }

    #[test]
    fn write_value_encodes() {
        let mut out = Vec::new();
        write_value(&mut out, &Value::bulk("hi")).unwrap();
        assert_eq!(out, b"$2\r\nhi\r\n");
    }
}
