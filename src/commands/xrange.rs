use std::sync::Arc;

use crate::{
    commands::{
        command_error::CommandError,
        stream_utils::{parse_count, parse_stream_entries_to_resp},
    },
    key_value_store::{KeyValueStore, StoreError},
    resp::RespValue,
    stream_id::StreamId,
};

/// Represents the parsed arguments for the XRANGE command
#[derive(Debug, PartialEq)]
pub struct XrangeArguments {
    key: String,
    /// Inclusive lower bound; `-` is the smallest possible id
    start: StreamId,
    /// Inclusive upper bound; `+` is the largest possible id
    end: StreamId,
    count: Option<usize>,
}

impl XrangeArguments {
    /// Parses `XRANGE key start end [COUNT n]`.
    ///
    /// Bounds may be written as full ids, as a bare millisecond timestamp, or as
    /// the `-` / `+` sentinels.
    ///
    /// # Returns
    ///
    /// * `Ok(XrangeArguments)` - If the arguments are valid
    /// * `Err(CommandError::WrongNumberOfArguments)` - If the key or a bound is missing
    /// * `Err(CommandError::Store(StoreError::InvalidStreamId))` - If a bound is not a valid id
    /// * `Err(CommandError::NotAnInteger)` - If the count is not an integer
    /// * `Err(CommandError::SyntaxError)` - If anything other than `COUNT n` follows the bounds
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.len() < 3 {
            return Err(CommandError::WrongNumberOfArguments("xrange"));
        }

        let start = StreamId::parse_range_start(&arguments[1])
            .map_err(|_| StoreError::InvalidStreamId)?;
        let end =
            StreamId::parse_range_end(&arguments[2]).map_err(|_| StoreError::InvalidStreamId)?;

        let count = match &arguments[3..] {
            [] => None,
            [option, count] if option.eq_ignore_ascii_case("count") => parse_count(count)?,
            _ => return Err(CommandError::SyntaxError),
        };

        Ok(Self {
            key: arguments[0].clone(),
            start,
            end,
            count,
        })
    }
}

/// Handles the XRANGE command.
///
/// Returns the records of a stream whose ids fall within the inclusive range,
/// in insertion order. A missing key yields an empty array.
///
/// # Examples
///
/// ```ignore
/// // XRANGE fruits - +
/// // XRANGE fruits 1526919030474-0 1526919030484 COUNT 2
/// ```
pub async fn xrange(
    store: Arc<KeyValueStore>,
    arguments: Vec<String>,
) -> Result<RespValue, CommandError> {
    let xrange_arguments = XrangeArguments::parse(arguments)?;

    let records = store
        .xrange(
            &xrange_arguments.key,
            xrange_arguments.start,
            xrange_arguments.end,
            xrange_arguments.count,
        )
        .await?;

    Ok(parse_stream_entries_to_resp(&records))
}
