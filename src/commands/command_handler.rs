use crate::{commands::command_error::CommandError, resp::RespValue};

/// Whether a blocking command is allowed to wait for data.
///
/// Commands replayed by EXEC run with [`ExecutionMode::NonBlocking`] so that a
/// transaction never stalls its connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Blocking,
    NonBlocking,
}

/// A command decoded from a client request.
#[derive(Debug, PartialEq, Clone)]
pub struct CommandHandler {
    /// Uppercased command name
    pub name: String,
    /// Everything after the name, verbatim
    pub arguments: Vec<String>,
}

impl CommandHandler {
    /// Builds a command from a decoded request.
    ///
    /// A request must be a non-empty array whose elements are all bulk strings,
    /// the first being the command name.
    ///
    /// # Returns
    ///
    /// * `Ok(CommandHandler)` - The command with its name uppercased
    /// * `Err(CommandError::InvalidCommand)` - If the request has any other shape
    ///
    /// # Examples
    ///
    /// ```
    /// use redis_kv::{commands::CommandHandler, resp::RespValue};
    ///
    /// let handler = CommandHandler::new(RespValue::bulk_string_array(["get", "fruit"])).unwrap();
    /// assert_eq!(handler.name, "GET");
    /// assert_eq!(handler.arguments, vec!["fruit".to_string()]);
    /// ```
    pub fn new(input: RespValue) -> Result<Self, CommandError> {
        let RespValue::Array(elements) = input else {
            return Err(CommandError::InvalidCommand);
        };

        let mut elements = elements.into_iter().map(|element| match element {
            RespValue::BulkString(s) => Ok(s),
            _ => Err(CommandError::InvalidCommand),
        });

        let name = elements
            .next()
            .ok_or(CommandError::InvalidCommand)??
            .to_uppercase();
        let arguments = elements.collect::<Result<Vec<String>, CommandError>>()?;

        Ok(Self { name, arguments })
    }
}
