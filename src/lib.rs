//! An in-memory key-value server speaking the Redis Serialization Protocol.
//!
//! Supported commands:
//!
//! - Strings: GET, SET (with EX/PX expiry), INCR
//! - Lists: LPUSH, LRANGE, LLEN, LPOP, BLPOP
//! - Streams: XADD, XRANGE, XREAD (optionally blocking)
//! - Server: PING, ECHO, TYPE, INFO
//! - Transactions: MULTI, EXEC, DISCARD
//!
//! Each client connection runs in its own tokio task and shares a single
//! [`key_value_store::KeyValueStore`] with every other connection.

pub mod codec;
pub mod commands;
pub mod config;
pub mod connection;
pub mod key_value_store;
pub mod resp;
pub mod server;
pub mod state;
pub mod stream_id;
