use std::sync::Arc;

use crate::{commands::command_error::CommandError, key_value_store::KeyValueStore, resp::RespValue};

pub struct IncrArguments {
    key: String,
}

impl IncrArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        let [key]: [String; 1] = arguments
            .try_into()
            .map_err(|_| CommandError::WrongNumberOfArguments("incr"))?;

        Ok(Self { key })
    }
}

/// Handles the INCR command.
///
/// # Returns
///
/// * `Ok(RespValue::Integer)` - The value after the increment
/// * `Err(CommandError::Store(StoreError::NotAnInteger))` - If the value is not an integer or would overflow
/// * `Err(CommandError::Store(StoreError::WrongType))` - If the key holds a list or a stream
pub async fn incr(
    store: Arc<KeyValueStore>,
    arguments: Vec<String>,
) -> Result<RespValue, CommandError> {
    let incr_arguments = IncrArguments::parse(arguments)?;

    let value = store.incr(&incr_arguments.key).await?;

    Ok(RespValue::Integer(value))
}
