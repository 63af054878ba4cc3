use crate::{
    commands::{command_error::CommandError, command_handler::CommandHandler},
    resp::RespValue,
};

pub struct MultiArguments;

impl MultiArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if !arguments.is_empty() {
            return Err(CommandError::WrongNumberOfArguments("multi"));
        }

        Ok(Self)
    }
}

/// Starts queuing commands on this connection.
///
/// A nested MULTI is rejected and leaves the open transaction untouched.
pub fn multi(
    transaction: &mut Option<Vec<CommandHandler>>,
    arguments: Vec<String>,
) -> Result<RespValue, CommandError> {
    MultiArguments::parse(arguments)?;

    if transaction.is_some() {
        return Err(CommandError::NestedMulti);
    }

    *transaction = Some(Vec::new());

    Ok(RespValue::SimpleString("OK".to_string()))
}
