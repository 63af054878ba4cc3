use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    commands::{
        blpop::blpop,
        command_error::CommandError,
        command_handler::{CommandHandler, ExecutionMode},
        echo::echo,
        get::get,
        incr::incr,
        info::info,
        llen::llen,
        lpop::lpop,
        lpush::lpush,
        lrange::lrange,
        ping::ping,
        set::set,
        transactions::{discard, exec, multi},
        type_command::type_command,
        xadd::xadd,
        xrange::xrange,
        xread::xread,
    },
    config::ServerConfig,
    key_value_store::KeyValueStore,
    resp::RespValue,
    state::State,
};

/// Routes the requests of one connection to their commands.
///
/// Each connection owns its dispatcher, and with it its transaction: between
/// MULTI and EXEC/DISCARD every other command is queued verbatim instead of
/// being run.
#[derive(Debug)]
pub struct CommandDispatcher {
    client_address: String,
    store: Arc<KeyValueStore>,
    state: Arc<Mutex<State>>,
    config: Arc<ServerConfig>,
    transaction: Option<Vec<CommandHandler>>,
    client_closed: CancellationToken,
}

impl CommandDispatcher {
    pub fn new(
        client_address: impl Into<String>,
        store: Arc<KeyValueStore>,
        state: Arc<Mutex<State>>,
        config: Arc<ServerConfig>,
    ) -> Self {
        CommandDispatcher {
            client_address: client_address.into(),
            store,
            state,
            config,
            transaction: None,
            client_closed: CancellationToken::new(),
        }
    }

    /// Token to cancel once the client has hung up.
    ///
    /// A blocked BLPOP or XREAD stops waiting as soon as it is cancelled and
    /// returns without taking anything from the store.
    pub fn client_closed(&self) -> CancellationToken {
        self.client_closed.clone()
    }

    /// Handles one decoded request and produces exactly one reply.
    ///
    /// Errors are turned into error replies here, so nothing a client sends
    /// through this method can end its connection.
    pub async fn dispatch(&mut self, input: RespValue) -> RespValue {
        let command = match CommandHandler::new(input) {
            Ok(command) => command,
            Err(e) => return e.as_resp(),
        };

        let result = match command.name.as_str() {
            "MULTI" => multi(&mut self.transaction, command.arguments),
            "EXEC" => match exec(&mut self.transaction, command.arguments) {
                Ok(commands) => Ok(self.run_transaction_commands(commands).await),
                Err(e) => Err(e),
            },
            "DISCARD" => discard(&mut self.transaction, command.arguments),
            _ => match self.transaction.as_mut() {
                Some(queue) => {
                    debug!(command = %command.name, "queued command");
                    queue.push(command);
                    Ok(RespValue::SimpleString("QUEUED".to_string()))
                }
                None => self.execute(&command, ExecutionMode::Blocking).await,
            },
        };

        result.unwrap_or_else(|e| e.as_resp())
    }

    /// Runs a single command against the store.
    ///
    /// This is the only path commands take, whether sent directly or replayed
    /// by EXEC. Transaction control (MULTI, EXEC, DISCARD) lives in
    /// [`CommandDispatcher::dispatch`] and is unknown here.
    pub async fn execute(
        &self,
        command: &CommandHandler,
        mode: ExecutionMode,
    ) -> Result<RespValue, CommandError> {
        debug!(command = %command.name, arguments = ?command.arguments, "executing command");

        let arguments = command.arguments.clone();

        match command.name.as_str() {
            "PING" => ping(arguments),
            "ECHO" => echo(arguments),
            "SET" => set(Arc::clone(&self.store), arguments).await,
            "GET" => get(Arc::clone(&self.store), arguments).await,
            "INCR" => incr(Arc::clone(&self.store), arguments).await,
            "LPUSH" => lpush(Arc::clone(&self.store), Arc::clone(&self.state), arguments).await,
            "LRANGE" => lrange(Arc::clone(&self.store), arguments).await,
            "LLEN" => llen(Arc::clone(&self.store), arguments).await,
            "LPOP" => lpop(Arc::clone(&self.store), arguments).await,
            "BLPOP" => {
                blpop(
                    &self.client_address,
                    Arc::clone(&self.store),
                    Arc::clone(&self.state),
                    arguments,
                    mode,
                    &self.client_closed,
                )
                .await
            }
            "TYPE" => type_command(Arc::clone(&self.store), arguments).await,
            "XADD" => xadd(Arc::clone(&self.store), Arc::clone(&self.state), arguments).await,
            "XRANGE" => xrange(Arc::clone(&self.store), arguments).await,
            "XREAD" => {
                xread(
                    &self.client_address,
                    Arc::clone(&self.store),
                    Arc::clone(&self.state),
                    arguments,
                    mode,
                    &self.client_closed,
                )
                .await
            }
            "INFO" => info(Arc::clone(&self.config), arguments).await,
            _ => Err(CommandError::UnknownCommand(command.name.clone())),
        }
    }

    /// Replays queued commands in order. A failing command fills its own slot
    /// with an error reply and the replay carries on.
    async fn run_transaction_commands(&self, commands: Vec<CommandHandler>) -> RespValue {
        let mut responses = Vec::with_capacity(commands.len());

        for command in commands {
            let response = self
                .execute(&command, ExecutionMode::NonBlocking)
                .await
                .unwrap_or_else(|e| e.as_resp());

            responses.push(response);
        }

        RespValue::Array(responses)
    }

    pub fn client_address(&self) -> &str {
        &self.client_address
    }

    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    /// Commands queued since MULTI, empty outside a transaction.
    pub fn queued_commands(&self) -> &[CommandHandler] {
        self.transaction.as_deref().unwrap_or_default()
    }
}
