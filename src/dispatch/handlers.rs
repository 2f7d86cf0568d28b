//! Built-in command handlers
//!
//! Handlers receive the arguments that follow the command name.

use crate::error::CommandError;
use crate::protocol::Value;

/// PING: ignores its arguments
pub fn ping(_args: &[Value]) -> Result<Value, CommandError> {
    Ok(Value::simple("PONG"))
}

/// ECHO: returns its single argument as a bulk string
pub fn echo(args: &[Value]) -> Result<Value, CommandError> {
    match args {
        [] => Err(CommandError::MissingArgument("ECHO")),
        [arg] => arg
            .as_string_bytes()
            .map(Value::bulk)
            .ok_or(CommandError::ArgumentNotString("ECHO")),
        _ => Err(CommandError::TooManyArguments("ECHO")),
    }
}
