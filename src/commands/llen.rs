use std::sync::Arc;

use crate::{commands::command_error::CommandError, key_value_store::KeyValueStore, resp::RespValue};

pub struct LlenArguments {
    key: String,
}

impl LlenArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        let [key]: [String; 1] = arguments
            .try_into()
            .map_err(|_| CommandError::WrongNumberOfArguments("llen"))?;

        Ok(Self { key })
    }
}

/// Handles the LLEN command. Missing keys and non-list keys have length 0.
pub async fn llen(
    store: Arc<KeyValueStore>,
    arguments: Vec<String>,
) -> Result<RespValue, CommandError> {
    let llen_arguments = LlenArguments::parse(arguments)?;

    let length = store.llen(&llen_arguments.key).await;

    Ok(RespValue::Integer(length as i64))
}
