//! Protocol encoder
//!
//! Value → wire bytes. Writes straight into a `BytesMut`; integers are
//! formatted on the stack with `itoa`.
//!
//! ## Wire Format
//! ```text
//! SimpleString   +<text>\r\n
//! Error          -<text>\r\n
//! Integer        :<decimal>\r\n
//! BulkString     $<len>\r\n<bytes>\r\n      null: $-1\r\n
//! Array          *<count>\r\n<element>...   null: *-1\r\n
//! ```

use bytes::{BufMut, BytesMut};

use super::Value;
use crate::error::EncodeError;

pub(crate) const CRLF: &[u8] = b"\r\n";

/// Encode a value to bytes
pub fn encode(value: &Value) -> Result<Vec<u8>, EncodeError> {
    let mut dst = BytesMut::new();
    encode_into(value, &mut dst)?;
    Ok(dst.to_vec())
}

/// Encode a value onto the end of `dst`.
///
/// On error `dst` may hold a partial frame and should be discarded.
pub fn encode_into(value: &Value, dst: &mut BytesMut) -> Result<(), EncodeError> {
    match value {
        Value::SimpleString(text) => write_line(b'+', text, dst),
        Value::Error(message) => write_line(b'-', message, dst),
        Value::Integer(n) => {
            dst.put_u8(b':');
            write_i64(*n, dst);
            dst.put_slice(CRLF);
            Ok(())
        }
        Value::BulkString(None) => {
            dst.put_slice(b"$-1\r\n");
            Ok(())
        }
        Value::BulkString(Some(data)) => {
            dst.reserve(data.len() + 16);
            dst.put_u8(b'$');
            write_i64(data.len() as i64, dst);
            dst.put_slice(CRLF);
            dst.put_slice(data);
            dst.put_slice(CRLF);
            Ok(())
        }
        Value::Array(None) => {
            dst.put_slice(b"*-1\r\n");
            Ok(())
        }
        Value::Array(Some(elements)) => {
            dst.put_u8(b'*');
            write_i64(elements.len() as i64, dst);
            dst.put_slice(CRLF);
            for element in elements {
                encode_into(element, dst)?;
            }
            Ok(())
        }
    }
}

/// Writes a CRLF-terminated text frame, refusing text that would split it
fn write_line(tag: u8, text: &str, dst: &mut BytesMut) -> Result<(), EncodeError> {
    if text.bytes().any(|b| b == b'\r' || b == b'\n') {
        return Err(EncodeError::InvalidContent(text.to_string()));
    }
    dst.put_u8(tag);
    dst.put_slice(text.as_bytes());
    dst.put_slice(CRLF);
    Ok(())
}

fn write_i64(val: i64, dst: &mut BytesMut) {
    let mut buf = itoa::Buffer::new();
    dst.put_slice(buf.format(val).as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(value: Value) -> Vec<u8> {
        encode(&value).unwrap()
    }

    #[test]
    fn scalars() {
        assert_eq!(enc(Value::simple("OK")), b"+OK\r\n");
        assert_eq!(enc(Value::error("ERR boom")), b"-ERR boom\r\n");
        assert_eq!(enc(Value::Integer(0)), b":0\r\n");
        assert_eq!(enc(Value::Integer(-42)), b":-42\r\n");
        assert_eq!(enc(Value::Integer(i64::MIN)), b":-9223372036854775808\r\n");
    }

    #[test]
    fn bulk_always_terminated() {
        assert_eq!(enc(Value::bulk("hello")), b"$5\r\nhello\r\n");
        assert_eq!(enc(Value::bulk("")), b"$0\r\n\r\n");
        assert_eq!(enc(Value::null_bulk()), b"$-1\r\n");
    }

    #[test]
    fn bulk_is_binary_safe() {
        assert_eq!(enc(Value::bulk(b"a\r\nb\0")), b"$5\r\na\r\nb\0\r\n");
    }

    #[test]
    fn arrays() {
        assert_eq!(enc(Value::null_array()), b"*-1\r\n");
        assert_eq!(enc(Value::array(vec![])), b"*0\r\n");
        assert_eq!(
            enc(Value::array(vec![
                Value::Integer(1),
                Value::array(vec![Value::simple("OK")]),
            ])),
            b"*2\r\n:1\r\n*1\r\n+OK\r\n"
        );
    }

    #[test]
    fn rejects_line_breaks_in_text() {
        assert!(matches!(
            encode(&Value::simple("a\r\nb")),
            Err(EncodeError::InvalidContent(_))
        ));
        assert!(encode(&Value::error("bad\n")).is_err());
        assert!(encode(&Value::array(vec![Value::simple("x\ry")])).is_err());
    }
}
