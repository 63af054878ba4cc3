use std::{sync::Arc, time::Duration};

use tokio::time::Instant;

use crate::{commands::command_error::CommandError, key_value_store::KeyValueStore, resp::RespValue};

/// Represents the parsed arguments for the SET command
#[derive(Debug)]
pub struct SetArguments {
    /// The key name to store the value under
    key: String,
    /// The value to be stored under the given key
    value: String,
    /// Expiration of the key value pair
    expiration: Option<Instant>,
}

impl SetArguments {
    /// Parses command arguments into a SetArguments structure.
    ///
    /// Supports `SET key value [EX seconds | PX milliseconds]`. Option names are
    /// case-insensitive, and when several expiry options are given the last one wins.
    ///
    /// # Arguments
    ///
    /// * `arguments` - A vector of strings representing the command arguments:
    ///   - Format 1: `[key, value]` - For permanent storage
    ///   - Format 2: `[key, value, "EX", seconds]` - Expires after `seconds`
    ///   - Format 3: `[key, value, "PX", milliseconds]` - Expires after `milliseconds`
    ///
    /// # Returns
    ///
    /// * `Ok(SetArguments)` - Successfully parsed arguments, with the expiry resolved to an instant
    /// * `Err(CommandError::WrongNumberOfArguments)` - If the key or the value is missing
    /// * `Err(CommandError::SyntaxError)` - If an option is unknown or has no value
    /// * `Err(CommandError::NotAnInteger)` - If the expiry is not an integer
    /// * `Err(CommandError::InvalidExpireTime)` - If the expiry is zero, negative or too large
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // SET with expiration (expires in 1000ms)
    /// let result = SetArguments::parse(vec![
    ///     "mykey".to_string(),
    ///     "hello".to_string(),
    ///     "PX".to_string(),
    ///     "1000".to_string()
    /// ]);
    /// // Returns: Ok(SetArguments { key: "mykey", value: "hello", expiration: Some(now + 1s) })
    ///
    /// // Unknown option
    /// let result = SetArguments::parse(vec![
    ///     "mykey".to_string(),
    ///     "hello".to_string(),
    ///     "KEEPTTL".to_string(),
    /// ]);
    /// // Returns: Err(CommandError::SyntaxError)
    /// ```
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        let mut arguments = arguments.into_iter();
        let (Some(key), Some(value)) = (arguments.next(), arguments.next()) else {
            return Err(CommandError::WrongNumberOfArguments("set"));
        };

        let mut expiration = None;

        while let Some(option) = arguments.next() {
            let unit_in_ms = match option.to_uppercase().as_str() {
                "EX" => 1000,
                "PX" => 1,
                _ => return Err(CommandError::SyntaxError),
            };

            let amount = arguments.next().ok_or(CommandError::SyntaxError)?;
            expiration = Some(parse_expiration(&amount, unit_in_ms)?);
        }

        Ok(Self {
            key,
            value,
            expiration,
        })
    }
}

fn parse_expiration(amount: &str, unit_in_ms: u64) -> Result<Instant, CommandError> {
    let amount = amount
        .parse::<i64>()
        .map_err(|_| CommandError::NotAnInteger)?;

    u64::try_from(amount)
        .ok()
        .filter(|amount| *amount > 0)
        .and_then(|amount| amount.checked_mul(unit_in_ms))
        .and_then(|ms| Instant::now().checked_add(Duration::from_millis(ms)))
        .ok_or(CommandError::InvalidExpireTime)
}

/// Handles the SET command.
///
/// Stores a string under the key, replacing whatever the key held before along
/// with its expiration.
///
/// # Returns
///
/// * `Ok(RespValue::SimpleString)` - `OK` on success
/// * `Err(CommandError)` - If the arguments do not parse, see [`SetArguments::parse`]
pub async fn set(
    store: Arc<KeyValueStore>,
    arguments: Vec<String>,
) -> Result<RespValue, CommandError> {
    let set_arguments = SetArguments::parse(arguments)?;

    store
        .set(
            &set_arguments.key,
            set_arguments.value,
            set_arguments.expiration,
        )
        .await;

    Ok(RespValue::SimpleString("OK".to_string()))
}
