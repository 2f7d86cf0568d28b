//! Protocol Module
//!
//! RESP-style wire format: five type tags, CRLF-terminated scalars and
//! length-prefixed bulk strings and arrays.
//!
//! ### Types
//! - `+` SimpleString - `+OK\r\n`
//! - `-` Error        - `-ERR boom\r\n`
//! - `:` Integer      - `:42\r\n`
//! - `$` BulkString   - `$5\r\nhello\r\n` (null: `$-1\r\n`)
//! - `*` Array        - `*2\r\n:1\r\n:2\r\n` (null: `*-1\r\n`)

mod value;
mod encoder;
mod decoder;
mod codec;

pub use value::Value;
pub use encoder::{encode, encode_into};
pub use decoder::{decode, Decoder, DEFAULT_MAX_DEPTH, MAX_BULK_LEN};
pub use codec::{write_value, FrameReader, FrameResult};
