use crate::{commands::command_error::CommandError, resp::RespValue};

pub struct EchoArguments {
    message: String,
}

impl EchoArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        let [message]: [String; 1] = arguments
            .try_into()
            .map_err(|_| CommandError::WrongNumberOfArguments("echo"))?;

        Ok(Self { message })
    }
}

/// Handles the ECHO command.
///
/// Returns the exact string provided as an argument. This is commonly used for
/// testing connectivity.
///
/// # Arguments
///
/// * `arguments` - A vector containing exactly one string argument to echo back
///
/// # Returns
///
/// * `Ok(RespValue::BulkString)` - The echoed argument
/// * `Err(CommandError::WrongNumberOfArguments)` - If the number of arguments is not exactly 1
pub fn echo(arguments: Vec<String>) -> Result<RespValue, CommandError> {
    let echo_arguments = EchoArguments::parse(arguments)?;

    Ok(RespValue::BulkString(echo_arguments.message))
}
