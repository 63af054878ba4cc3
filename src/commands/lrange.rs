use std::sync::Arc;

use crate::{commands::command_error::CommandError, key_value_store::KeyValueStore, resp::RespValue};

/// Represents the parsed arguments for the LRANGE command.
///
/// Holds the key and the start and end indices of the range, both inclusive.
/// Negative indices count from the end of the list.
pub struct LrangeArguments {
    /// The key name to retrieve from the store
    key: String,
    /// The starting index for the range (can be negative to count from the end)
    start_index: i64,
    /// The ending index for the range (can be negative to count from the end)
    end_index: i64,
}

impl LrangeArguments {
    /// Parses and validates the arguments for the LRANGE command.
    ///
    /// # Arguments
    ///
    /// * `arguments` - A vector of command arguments: [key, start_index, end_index]
    ///
    /// # Returns
    ///
    /// * `Ok(LrangeArguments)` - If the arguments are valid
    /// * `Err(CommandError::WrongNumberOfArguments)` - If the number of arguments is not exactly 3
    /// * `Err(CommandError::NotAnInteger)` - If start or end index is not a valid integer
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        let [key, start_index, end_index]: [String; 3] = arguments
            .try_into()
            .map_err(|_| CommandError::WrongNumberOfArguments("lrange"))?;

        let Ok(start_index) = start_index.parse::<i64>() else {
            return Err(CommandError::NotAnInteger);
        };

        let Ok(end_index) = end_index.parse::<i64>() else {
            return Err(CommandError::NotAnInteger);
        };

        Ok(Self {
            key,
            start_index,
            end_index,
        })
    }
}

/// Handles the LRANGE command.
///
/// Returns a range of elements from a list stored at the given key. Indices
/// out of bounds are clamped, and a missing key or a key holding something
/// other than a list yields an empty array.
///
/// # Examples
///
/// ```ignore
/// // List: ["a", "b", "c", "d", "e"]
/// // LRANGE mylist 1 3 -> ["b", "c", "d"]
/// // LRANGE mylist -2 -1 -> ["d", "e"]
/// // LRANGE mylist 3 1 -> []
/// ```
pub async fn lrange(
    store: Arc<KeyValueStore>,
    arguments: Vec<String>,
) -> Result<RespValue, CommandError> {
    let lrange_arguments = LrangeArguments::parse(arguments)?;

    let elements = store
        .lrange(
            &lrange_arguments.key,
            lrange_arguments.start_index,
            lrange_arguments.end_index,
        )
        .await;

    Ok(RespValue::bulk_string_array(elements))
}
