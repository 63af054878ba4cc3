use std::sync::Arc;

use crate::{commands::command_error::CommandError, key_value_store::KeyValueStore, resp::RespValue};

/// Represents the parsed arguments for the GET command
pub struct GetArguments {
    /// The key name to retrieve from the store
    key: String,
}

impl GetArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        let [key]: [String; 1] = arguments
            .try_into()
            .map_err(|_| CommandError::WrongNumberOfArguments("get"))?;

        Ok(Self { key })
    }
}

/// Handles the GET command.
///
/// Replies with the string stored at the key, or a null bulk string when the
/// key is missing, has expired, or holds a list or a stream.
pub async fn get(
    store: Arc<KeyValueStore>,
    arguments: Vec<String>,
) -> Result<RespValue, CommandError> {
    let get_arguments = GetArguments::parse(arguments)?;

    match store.get(&get_arguments.key).await {
        Some(value) => Ok(RespValue::BulkString(value)),
        None => Ok(RespValue::NullBulkString),
    }
}
