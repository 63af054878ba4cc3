use std::sync::Arc;

use crate::{commands::command_error::CommandError, key_value_store::KeyValueStore, resp::RespValue};

pub struct LpopArguments {
    key: String,
}

impl LpopArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        let [key]: [String; 1] = arguments
            .try_into()
            .map_err(|_| CommandError::WrongNumberOfArguments("lpop"))?;

        Ok(Self { key })
    }
}

/// Handles the LPOP command.
///
/// # Returns
///
/// * `Ok(RespValue::BulkString)` - The removed head of the list
/// * `Ok(RespValue::NullBulkString)` - If the key is missing, empty or not a list
pub async fn lpop(
    store: Arc<KeyValueStore>,
    arguments: Vec<String>,
) -> Result<RespValue, CommandError> {
    let lpop_arguments = LpopArguments::parse(arguments)?;

    match store.lpop(&lpop_arguments.key).await {
        Some(value) => Ok(RespValue::BulkString(value)),
        None => Ok(RespValue::NullBulkString),
    }
}
