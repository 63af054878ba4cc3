use thiserror::Error;

use crate::{key_value_store::StoreError, resp::RespValue};

/// Errors a single command can reply with.
///
/// None of them affect the connection: each one becomes an error reply and the
/// client can carry on sending commands.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum CommandError {
    #[error("invalid command format, expected a non-empty array of bulk strings")]
    InvalidCommand,
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("wrong number of arguments for '{0}' command")]
    WrongNumberOfArguments(&'static str),
    #[error("syntax error")]
    SyntaxError,
    #[error("value is not an integer or out of range")]
    NotAnInteger,
    #[error("invalid expire time in 'set' command")]
    InvalidExpireTime,
    #[error("timeout is not a float or out of range")]
    InvalidTimeout,
    #[error("timeout is not an integer or out of range")]
    InvalidBlockTimeout,
    #[error("timeout is negative")]
    NegativeTimeout,
    #[error("Unbalanced 'xread' list of streams: for each stream key an ID or '$' must be specified.")]
    UnbalancedXreadStreams,
    #[error("MULTI calls can not be nested")]
    NestedMulti,
    #[error("EXEC without MULTI")]
    ExecWithoutMulti,
    #[error("DISCARD without MULTI")]
    DiscardWithoutMulti,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CommandError {
    /// Converts the error into the reply sent back to the client.
    ///
    /// Store errors already carry their reply prefix (`ERR` or `WRONGTYPE`);
    /// everything else is a generic `ERR`.
    pub fn as_resp(&self) -> RespValue {
        match self {
            CommandError::Store(err) => RespValue::Error(err.to_string()),
            err => RespValue::Error(format!("ERR {}", err)),
        }
    }
}
