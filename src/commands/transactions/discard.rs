use crate::{
    commands::{command_error::CommandError, command_handler::CommandHandler},
    resp::RespValue,
};

pub struct DiscardArguments;

impl DiscardArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if !arguments.is_empty() {
            return Err(CommandError::WrongNumberOfArguments("discard"));
        }

        Ok(Self)
    }
}

/// Drops every queued command without running any of them.
pub fn discard(
    transaction: &mut Option<Vec<CommandHandler>>,
    arguments: Vec<String>,
) -> Result<RespValue, CommandError> {
    DiscardArguments::parse(arguments)?;

    if transaction.take().is_none() {
        return Err(CommandError::DiscardWithoutMulti);
    }

    Ok(RespValue::SimpleString("OK".to_string()))
}
