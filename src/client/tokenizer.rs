//! Line tokenizer for the interactive client
//!
//! Splits on whitespace. A `"` toggles quoted mode and is dropped; inside
//! quotes whitespace is kept as part of the token. Empty tokens are never
//! produced, and an unterminated quote simply runs to the end of the line.

use crate::protocol::Value;

/// Split a line into command words
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

/// Wrap command words as an Array of BulkStrings
pub fn to_request<S: AsRef<str>>(tokens: &[S]) -> Value {
    Value::array(
        tokens
            .iter()
            .map(|token| Value::bulk(token.as_ref().as_bytes()))
            .collect(),
    )
}
