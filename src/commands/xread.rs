use std::{sync::Arc, time::Duration};

use tokio::{sync::Mutex, time::Instant};
use tokio_util::sync::CancellationToken;

use crate::{
    commands::{
        blocking::{self, XREAD},
        command_error::CommandError,
        command_handler::ExecutionMode,
        stream_utils::{parse_count, parse_stream_entries_to_resp},
    },
    key_value_store::{KeyValueStore, StoreError, StreamRecord},
    resp::RespValue,
    state::State,
    stream_id::StreamId,
};

/// Represents the parsed arguments for the XREAD command.
///
/// Format: `XREAD [COUNT count] [BLOCK milliseconds] STREAMS key1 key2 ... id1 id2 ...`
#[derive(Debug, PartialEq)]
pub struct XreadArguments {
    /// Maximum number of records returned per stream
    count: Option<usize>,
    /// Optional blocking duration. `None` for a non-blocking read, and a zero
    /// duration blocks until data is available.
    blocking_duration: Option<Duration>,
    /// Vector of (key, stream_id) pairs where stream_id is still unresolved, so
    /// that `$` can be looked up against the store.
    key_stream_pairs: Vec<(String, String)>,
}

impl XreadArguments {
    /// Parses command arguments into structured XreadArguments.
    ///
    /// Option names are case-insensitive and may come in any order before
    /// `STREAMS`. Everything after `STREAMS` is split in half: keys first, then
    /// one id per key.
    ///
    /// # Arguments
    ///
    /// * `arguments` - Raw command arguments from the client
    ///
    /// # Returns
    ///
    /// * `Ok(XreadArguments)` - Successfully parsed arguments
    /// * `Err(CommandError::WrongNumberOfArguments)` - If less than 3 arguments were given
    /// * `Err(CommandError::SyntaxError)` - If an option is unknown, lacks its value, or `STREAMS` is missing
    /// * `Err(CommandError::NotAnInteger)` - If the count is not an integer
    /// * `Err(CommandError::InvalidBlockTimeout)` - If the block duration is not an integer
    /// * `Err(CommandError::NegativeTimeout)` - If the block duration is negative
    /// * `Err(CommandError::UnbalancedXreadStreams)` - If keys and ids do not pair up
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Non-blocking: XREAD STREAMS mystream 1234567890-0
    /// let args = XreadArguments::parse(vec![
    ///     "STREAMS".to_string(),
    ///     "mystream".to_string(),
    ///     "1234567890-0".to_string()
    /// ])?;
    ///
    /// // Blocking: XREAD BLOCK 1000 STREAMS mystream $
    /// let args = XreadArguments::parse(vec![
    ///     "BLOCK".to_string(),
    ///     "1000".to_string(),
    ///     "STREAMS".to_string(),
    ///     "mystream".to_string(),
    ///     "$".to_string()
    /// ])?;
    /// ```
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.len() < 3 {
            return Err(CommandError::WrongNumberOfArguments("xread"));
        }

        let mut count = None;
        let mut blocking_duration = None;
        let mut index = 0;

        let streams = loop {
            let Some(option) = arguments.get(index) else {
                return Err(CommandError::SyntaxError);
            };

            match option.to_uppercase().as_str() {
                "COUNT" => {
                    let value = arguments.get(index + 1).ok_or(CommandError::SyntaxError)?;
                    count = parse_count(value)?;
                }
                "BLOCK" => {
                    let value = arguments.get(index + 1).ok_or(CommandError::SyntaxError)?;
                    let milliseconds = value
                        .parse::<i64>()
                        .map_err(|_| CommandError::InvalidBlockTimeout)?;
                    let milliseconds =
                        u64::try_from(milliseconds).map_err(|_| CommandError::NegativeTimeout)?;

                    blocking_duration = Some(Duration::from_millis(milliseconds));
                }
                "STREAMS" => break &arguments[index + 1..],
                _ => return Err(CommandError::SyntaxError),
            }

            index += 2;
        };

        if streams.is_empty() || streams.len() % 2 != 0 {
            return Err(CommandError::UnbalancedXreadStreams);
        }

        let (keys, ids) = streams.split_at(streams.len() / 2);
        let key_stream_pairs = keys.iter().cloned().zip(ids.iter().cloned()).collect();

        Ok(Self {
            count,
            blocking_duration,
            key_stream_pairs,
        })
    }
}

/// Handles the XREAD command.
///
/// Reads every named stream from its starting id onwards, including a record
/// whose id equals the starting id. `$` stands for "after the last record
/// currently in the stream" and is resolved once, before any waiting.
///
/// With `BLOCK`, an empty read suspends the connection until XADD writes to one
/// of the streams or the duration elapses. Inside a transaction the command
/// never blocks.
///
/// # Arguments
///
/// * `client_address` - Address of the calling connection (used for subscriber management)
/// * `store` - The shared key-value store
/// * `state` - Registry of blocked connections
/// * `arguments` - Command arguments in the format: [COUNT n] [BLOCK ms] STREAMS key1 key2 ... id1 id2 ...
/// * `mode` - Whether the command may wait for data
/// * `closed` - Cancelled when the client hangs up, ending the wait
///
/// # Returns
///
/// * `Ok(RespValue::Array)` - `[[key, [record, ...]], ...]` for streams with data; empty without `BLOCK`
/// * `Ok(RespValue::NullArray)` - If the block duration elapsed without data, or the client went away
/// * `Err(CommandError::Store(StoreError::WrongType))` - If a key exists but is not a stream
/// * `Err(CommandError::Store(StoreError::InvalidStreamId))` - If a stream id is malformed
pub async fn xread(
    client_address: &str,
    store: Arc<KeyValueStore>,
    state: Arc<Mutex<State>>,
    arguments: Vec<String>,
    mode: ExecutionMode,
    closed: &CancellationToken,
) -> Result<RespValue, CommandError> {
    let xread_arguments = XreadArguments::parse(arguments)?;
    let count = xread_arguments.count;

    let streams = resolve_stream_ids(&store, xread_arguments.key_stream_pairs).await?;

    let result = store.xread(&streams, count).await?;

    if !result.is_empty() {
        return Ok(parse_streams_to_resp(result));
    }

    let Some(blocking_duration) = xread_arguments.blocking_duration else {
        return Ok(RespValue::Array(Vec::new()));
    };

    if mode == ExecutionMode::NonBlocking {
        return Ok(RespValue::NullArray);
    }

    let deadline = if blocking_duration.is_zero() {
        None
    } else {
        Instant::now().checked_add(blocking_duration)
    };

    let keys: Vec<String> = streams.iter().map(|(key, _)| key.clone()).collect();

    loop {
        let mut subscription = blocking::subscribe(&state, XREAD, &keys, client_address).await;

        let result = store.xread(&streams, count).await?;

        if !result.is_empty() {
            return Ok(parse_streams_to_resp(result));
        }

        if !subscription.wait(deadline, closed).await {
            return Ok(RespValue::NullArray);
        }
    }
}

/// Turns the raw id arguments into the ids reading starts from.
///
/// `$` becomes the successor of the stream's last id, or the smallest id for an
/// empty or missing stream. Any other id may be given in full or as a bare
/// millisecond timestamp.
async fn resolve_stream_ids(
    store: &KeyValueStore,
    key_stream_pairs: Vec<(String, String)>,
) -> Result<Vec<(String, StreamId)>, CommandError> {
    let mut streams = Vec::with_capacity(key_stream_pairs.len());

    for (key, stream_id) in key_stream_pairs {
        let from = if stream_id == "$" {
            match store.last_stream_id(&key).await? {
                Some(last) => last.successor().unwrap_or(StreamId::MAX),
                None => StreamId::MIN,
            }
        } else {
            StreamId::parse_range_start(&stream_id).map_err(|_| StoreError::InvalidStreamId)?
        };

        streams.push((key, from));
    }

    Ok(streams)
}

fn parse_streams_to_resp(streams: Vec<(String, Vec<StreamRecord>)>) -> RespValue {
    RespValue::Array(
        streams
            .into_iter()
            .map(|(key, records)| {
                RespValue::Array(vec![
                    RespValue::BulkString(key),
                    parse_stream_entries_to_resp(&records),
                ])
            })
            .collect(),
    )
}
