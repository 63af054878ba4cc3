pub mod blocking;
mod blpop;
mod command_dispatcher;
mod command_error;
mod command_handler;
mod echo;
mod get;
mod incr;
mod info;
mod llen;
mod lpop;
mod lpush;
mod lrange;
mod ping;
mod set;
mod stream_utils;
mod transactions;
mod type_command;
mod xadd;
mod xrange;
mod xread;

pub use command_dispatcher::CommandDispatcher;
pub use command_error::CommandError;
pub use command_handler::{CommandHandler, ExecutionMode};
