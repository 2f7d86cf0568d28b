//! Value definitions
//!
//! The tagged union every other component operates on.

use bytes::Bytes;

/// A single protocol value.
///
/// `BulkString(None)` and `Array(None)` are the protocol's null forms
/// (`$-1` / `*-1`) and never compare equal to the empty forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Status reply, e.g. `+OK\r\n`. Must not contain CR or LF.
    SimpleString(String),

    /// Error reply, e.g. `-ERR boom\r\n`. Must not contain CR or LF.
    Error(String),

    /// Signed 64-bit integer, e.g. `:42\r\n`.
    Integer(i64),

    /// Binary-safe string, e.g. `$5\r\nhello\r\n`. `None` is null.
    BulkString(Option<Bytes>),

    /// Ordered sequence of values, e.g. `*1\r\n:1\r\n`. `None` is null.
    Array(Option<Vec<Value>>),
}

impl Value {
    pub fn simple(text: impl Into<String>) -> Self {
        Value::SimpleString(text.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Value::Error(message.into())
    }

    /// Bulk string copied from any byte source
    pub fn bulk(data: impl AsRef<[u8]>) -> Self {
        Value::BulkString(Some(Bytes::copy_from_slice(data.as_ref())))
    }

    pub fn null_bulk() -> Self {
        Value::BulkString(None)
    }

    pub fn array(elements: Vec<Value>) -> Self {
        Value::Array(Some(elements))
    }

    pub fn null_array() -> Self {
        Value::Array(None)
    }

    /// Returns `true` for the null bulk string and the null array
    pub fn is_null(&self) -> bool {
        matches!(self, Value::BulkString(None) | Value::Array(None))
    }

    /// Text-bearing payload of a string variant.
    ///
    /// Yields the bytes of a SimpleString or non-null BulkString.
    pub fn as_string_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::SimpleString(s) => Some(s.as_bytes()),
            Value::BulkString(Some(b)) => Some(b),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<Bytes> for Value {
    fn from(data: Bytes) -> Self {
        Value::BulkString(Some(data))
    }
}

impl From<Vec<Value>> for Value {
    fn from(elements: Vec<Value>) -> Self {
        Value::Array(Some(elements))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_bulk_differs_from_empty() {
        assert_ne!(Value::null_bulk(), Value::bulk(b""));
        assert!(Value::null_bulk().is_null());
        assert!(!Value::bulk(b"").is_null());
    }

    #[test]
    fn null_array_differs_from_empty() {
        assert_ne!(Value::null_array(), Value::array(vec![]));
        assert!(Value::null_array().is_null());
        assert!(!Value::array(vec![]).is_null());
    }

    #[test]
    fn string_bytes() {
        assert_eq!(Value::simple("PING").as_string_bytes(), Some(&b"PING"[..]));
        assert_eq!(Value::bulk("hi").as_string_bytes(), Some(&b"hi"[..]));
        assert_eq!(Value::null_bulk().as_string_bytes(), None);
        assert_eq!(Value::Integer(1).as_string_bytes(), None);
        assert_eq!(Value::error("x").as_string_bytes(), None);
    }
}
