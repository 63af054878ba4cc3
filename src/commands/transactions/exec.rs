use crate::commands::{command_error::CommandError, command_handler::CommandHandler};

pub struct ExecArguments;

impl ExecArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if !arguments.is_empty() {
            return Err(CommandError::WrongNumberOfArguments("exec"));
        }

        Ok(Self)
    }
}

/// Closes the transaction and hands back the queued commands, in the order they
/// were queued, for the dispatcher to replay.
///
/// # Returns
///
/// * `Ok(Vec<CommandHandler>)` - The queued commands, possibly none
/// * `Err(CommandError::ExecWithoutMulti)` - If no transaction is open
pub fn exec(
    transaction: &mut Option<Vec<CommandHandler>>,
    arguments: Vec<String>,
) -> Result<Vec<CommandHandler>, CommandError> {
    ExecArguments::parse(arguments)?;

    transaction.take().ok_or(CommandError::ExecWithoutMulti)
}
