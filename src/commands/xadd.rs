use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    commands::{blocking::XREAD, command_error::CommandError},
    key_value_store::KeyValueStore,
    resp::RespValue,
    state::State,
};

/// Represents the parsed arguments for the XADD command
#[derive(Debug, PartialEq)]
pub struct XaddArguments {
    /// The stream key
    key: String,
    /// `*`, `<ms>-*` or `<ms>-<seq>`; validated by the store
    stream_id: String,
    /// Field/value pairs of the new record
    fields: Vec<(String, String)>,
}

impl XaddArguments {
    /// Parses `XADD key id field value [field value ...]`.
    ///
    /// # Returns
    ///
    /// * `Ok(XaddArguments)` - If there is at least one complete field/value pair
    /// * `Err(CommandError::WrongNumberOfArguments)` - If the pairs are missing or incomplete
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.len() < 4 || arguments.len() % 2 != 0 {
            return Err(CommandError::WrongNumberOfArguments("xadd"));
        }

        let mut arguments = arguments.into_iter();
        let key = arguments.next().unwrap_or_default();
        let stream_id = arguments.next().unwrap_or_default();

        let mut fields = Vec::with_capacity(arguments.len() / 2);
        while let (Some(field), Some(value)) = (arguments.next(), arguments.next()) {
            fields.push((field, value));
        }

        Ok(Self {
            key,
            stream_id,
            fields,
        })
    }
}

/// Handles the XADD command.
///
/// Appends a record to the stream, creating the stream when the key does not
/// exist, and wakes every connection blocked in XREAD on that stream.
///
/// # Returns
///
/// * `Ok(RespValue::BulkString)` - The id assigned to the record
/// * `Err(CommandError::Store(StoreError::InvalidStreamId))` - If the id is malformed
/// * `Err(CommandError::Store(StoreError::StreamIdNotIncreasing))` - If the id is not above the stream's last id
/// * `Err(CommandError::Store(StoreError::WrongType))` - If the key holds a string or a list
///
/// # Examples
///
/// ```ignore
/// // XADD fruits 1526919030474-0 mango apple
/// // Returns: "$15\r\n1526919030474-0\r\n"
///
/// // XADD fruits 1526919030474-* mango apple
/// // Returns: "$15\r\n1526919030474-1\r\n"
/// ```
pub async fn xadd(
    store: Arc<KeyValueStore>,
    state: Arc<Mutex<State>>,
    arguments: Vec<String>,
) -> Result<RespValue, CommandError> {
    let xadd_arguments = XaddArguments::parse(arguments)?;

    let stream_id = store
        .xadd(
            &xadd_arguments.key,
            &xadd_arguments.stream_id,
            xadd_arguments.fields,
        )
        .await?;

    let mut state_guard = state.lock().await;
    state_guard.notify_all_subscribers(XREAD, &xadd_arguments.key);

    Ok(RespValue::BulkString(stream_id.to_string()))
}
