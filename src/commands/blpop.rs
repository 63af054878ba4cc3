use std::{sync::Arc, time::Duration};

use tokio::{sync::Mutex, time::Instant};
use tokio_util::sync::CancellationToken;

use crate::{
    commands::{
        blocking::{self, BLPOP},
        command_error::CommandError,
        command_handler::ExecutionMode,
    },
    key_value_store::KeyValueStore,
    resp::RespValue,
    state::State,
};

/// Represents the parsed arguments for the BLPOP command
#[derive(Debug, PartialEq)]
pub struct BlpopArguments {
    /// Keys to pop from, checked in this order
    keys: Vec<String>,
    /// How long to wait for data. `None` waits forever.
    timeout: Option<Duration>,
}

impl BlpopArguments {
    /// Parses `BLPOP key [key ...] timeout`.
    ///
    /// The timeout is in seconds and may be fractional. `0` blocks indefinitely.
    ///
    /// # Returns
    ///
    /// * `Ok(BlpopArguments)` - If the arguments are valid
    /// * `Err(CommandError::WrongNumberOfArguments)` - If fewer than 2 arguments were given
    /// * `Err(CommandError::InvalidTimeout)` - If the timeout is not a finite number
    /// * `Err(CommandError::NegativeTimeout)` - If the timeout is below zero
    pub fn parse(mut arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.len() < 2 {
            return Err(CommandError::WrongNumberOfArguments("blpop"));
        }

        let timeout = arguments
            .pop()
            .ok_or(CommandError::WrongNumberOfArguments("blpop"))?
            .parse::<f64>()
            .ok()
            .filter(|seconds| seconds.is_finite())
            .ok_or(CommandError::InvalidTimeout)?;

        if timeout < 0.0 {
            return Err(CommandError::NegativeTimeout);
        }

        let timeout = if timeout == 0.0 {
            None
        } else {
            Some(Duration::try_from_secs_f64(timeout).map_err(|_| CommandError::InvalidTimeout)?)
        };

        Ok(Self {
            keys: arguments,
            timeout,
        })
    }
}

/// Handles the BLPOP command.
///
/// Pops from the first non-empty list among the keys. When every list is empty
/// the connection blocks until another client pushes to one of the keys or the
/// timeout elapses. Inside a transaction the command never blocks.
///
/// # Arguments
///
/// * `client_address` - Address of the calling connection, used to tag its subscriptions
/// * `store` - The shared key-value store
/// * `state` - Registry of blocked connections
/// * `arguments` - `[key, ..., timeout]`
/// * `mode` - Whether the command may wait for data
/// * `closed` - Cancelled when the client hangs up, ending the wait
///
/// # Returns
///
/// * `Ok(RespValue::Array)` - `[key, value]` for the popped element
/// * `Ok(RespValue::NullArray)` - If the timeout elapsed, the client went away, or nothing was available in non-blocking mode
/// * `Err(CommandError)` - If the arguments do not parse, see [`BlpopArguments::parse`]
pub async fn blpop(
    client_address: &str,
    store: Arc<KeyValueStore>,
    state: Arc<Mutex<State>>,
    arguments: Vec<String>,
    mode: ExecutionMode,
    closed: &CancellationToken,
) -> Result<RespValue, CommandError> {
    let blpop_arguments = BlpopArguments::parse(arguments)?;
    let keys = blpop_arguments.keys;

    if let Some((key, value)) = store.blpop(&keys).await {
        return Ok(RespValue::bulk_string_array([key, value]));
    }

    if mode == ExecutionMode::NonBlocking {
        return Ok(RespValue::NullArray);
    }

    // A deadline too far out to represent is as good as none.
    let deadline = blpop_arguments
        .timeout
        .and_then(|timeout| Instant::now().checked_add(timeout));

    loop {
        let mut subscription = blocking::subscribe(&state, BLPOP, &keys, client_address).await;

        // Nothing may be awaited between popping and returning the element.
        if let Some((key, value)) = store.blpop(&keys).await {
            return Ok(RespValue::bulk_string_array([key, value]));
        }

        // Another client may have popped the pushed element first; wait again.
        if !subscription.wait(deadline, closed).await {
            return Ok(RespValue::NullArray);
        }
    }
}
