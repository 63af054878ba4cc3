use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    commands::{blocking::BLPOP, command_error::CommandError},
    key_value_store::KeyValueStore,
    resp::RespValue,
    state::State,
};

pub struct LpushArguments {
    key: String,
    values: Vec<String>,
}

impl LpushArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.len() < 2 {
            return Err(CommandError::WrongNumberOfArguments("lpush"));
        }

        let mut arguments = arguments.into_iter();

        Ok(Self {
            key: arguments.next().unwrap_or_default(),
            values: arguments.collect(),
        })
    }
}

/// Handles the LPUSH command.
///
/// Each value in turn becomes the new head of the list, so `LPUSH k a b c`
/// leaves the list as `c, b, a`. A key holding a string or a stream is turned
/// into a fresh list. Connections blocked in BLPOP on the key are woken, one
/// per pushed value.
///
/// # Returns
///
/// * `Ok(RespValue::Integer)` - The length of the list after the push
/// * `Err(CommandError::WrongNumberOfArguments)` - If no value was given
pub async fn lpush(
    store: Arc<KeyValueStore>,
    state: Arc<Mutex<State>>,
    arguments: Vec<String>,
) -> Result<RespValue, CommandError> {
    let lpush_arguments = LpushArguments::parse(arguments)?;

    let list_length = store
        .lpush(&lpush_arguments.key, &lpush_arguments.values)
        .await;

    let mut state_guard = state.lock().await;
    state_guard.notify_subscribers(BLPOP, &lpush_arguments.key, lpush_arguments.values.len());

    Ok(RespValue::Integer(list_length as i64))
}
