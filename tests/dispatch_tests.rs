//! Dispatcher Tests
//!
//! Raw request bytes in, raw response bytes out.

use respkv::protocol::{encode, Decoder, Value};
use respkv::Dispatcher;

fn handle(request: &Value) -> Vec<u8> {
    let dispatcher = Dispatcher::default();
    dispatcher.handle_request(&encode(request).unwrap())
}

fn command(words: &[&str]) -> Value {
    Value::array(words.iter().map(|w| Value::bulk(w)).collect())
}

#[test]
fn test_ping() {
    assert_eq!(handle(&command(&["PING"])), b"+PONG\r\n");
}

#[test]
fn test_ping_ignores_arguments() {
    assert_eq!(handle(&command(&["ping", "extra"])), b"+PONG\r\n");
}

#[test]
fn test_echo() {
    assert_eq!(handle(&command(&["ECHO", "hi"])), b"$2\r\nhi\r\n");
}

#[test]
fn test_echo_binary_argument() {
    let request = Value::array(vec![Value::bulk("echo"), Value::bulk(b"a\r\nb")]);
    assert_eq!(handle(&request), b"$4\r\na\r\nb\r\n");
}

#[test]
fn test_echo_missing_argument() {
    assert_eq!(handle(&command(&["ECHO"])), b"-ECHO requires an argument\r\n");
}

#[test]
fn test_echo_too_many_arguments() {
    assert_eq!(
        handle(&command(&["ECHO", "a", "b"])),
        b"-ECHO accepts exactly one argument\r\n"
    );
}

#[test]
fn test_echo_non_string_argument() {
    let request = Value::array(vec![Value::bulk("ECHO"), Value::Integer(5)]);
    assert_eq!(handle(&request), b"-ECHO argument must be a string\r\n");
}

#[test]
fn test_unknown_command() {
    assert_eq!(handle(&command(&["FOO"])), b"-Unknown command 'FOO'\r\n");
}

#[test]
fn test_non_array_request() {
    assert_eq!(handle(&Value::bulk("PING")), b"-invalid command format\r\n");
}

#[test]
fn test_non_string_command_name() {
    let request = Value::array(vec![Value::Integer(1)]);
    assert_eq!(handle(&request), b"-command must be a string\r\n");
}

#[test]
fn test_empty_command() {
    assert_eq!(handle(&Value::array(vec![])), b"-empty command\r\n");
}

#[test]
fn test_decode_failure_becomes_error_reply() {
    let dispatcher = Dispatcher::default();
    let response = dispatcher.handle_request(b"$5\r\nhelo\r\n");
    assert!(response.starts_with(b"-malformed frame"));
    assert!(response.ends_with(b"\r\n"));

    assert_eq!(
        dispatcher.handle_request(b"?\r\n"),
        b"-unknown type byte: 0x3f\r\n"
    );
}

#[test]
fn test_peer_error_is_echoed_back() {
    let dispatcher = Dispatcher::default();
    assert_eq!(dispatcher.handle_request(b"-ERR boom\r\n"), b"-ERR boom\r\n");
}

#[test]
fn test_depth_limit_from_decoder() {
    let dispatcher = Dispatcher::new(Decoder::new(1));
    assert_eq!(
        dispatcher.handle_request(b"*1\r\n*1\r\n$4\r\nPING\r\n"),
        b"-nesting depth exceeds limit of 1\r\n"
    );
    assert_eq!(dispatcher.handle_request(b"*1\r\n$4\r\nPING\r\n"), b"+PONG\r\n");
}

#[test]
fn test_registered_command() {
    let mut dispatcher = Dispatcher::default();
    dispatcher.register("INCRBY", |args| match args {
        [Value::Integer(a), Value::Integer(b)] => Ok(Value::Integer(a + b)),
        _ => Ok(Value::error("ERR expected two integers")),
    });
    let request = Value::array(vec![
        Value::bulk("incrby"),
        Value::Integer(40),
        Value::Integer(2),
    ]);
    assert_eq!(
        dispatcher.handle_request(&encode(&request).unwrap()),
        b":42\r\n"
    );
}
