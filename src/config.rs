use std::net::IpAddr;

use clap::Parser;
use thiserror::Error;

use crate::{codec::DEFAULT_MAX_FRAME_SIZE, resp::DEFAULT_MAX_NESTING_DEPTH};

pub const DEFAULT_PORT: u16 = 6379;

#[derive(Error, Debug, PartialEq)]
pub enum CliError {
    #[error("invalid --replicaof value '{0}', expected \"<host> <port>\"")]
    InvalidReplicaOf(String),
    #[error("--max-frame-size must be greater than zero")]
    InvalidMaxFrameSize,
    #[error("--max-nesting-depth must be greater than zero")]
    InvalidMaxNestingDepth,
}

/// Command line flags of the server binary.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Cli {
    /// The port to listen on
    #[arg(short, long, env = "REDIS_KV_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// The address to bind to
    #[arg(short, long, env = "REDIS_KV_BIND", default_value = "127.0.0.1")]
    pub bind: IpAddr,

    /// Announce this server as a replica of "<host> <port>"
    #[arg(long, value_name = "HOST PORT")]
    pub replicaof: Option<String>,

    /// Largest request frame accepted from a client, in bytes
    #[arg(long, env = "REDIS_KV_MAX_FRAME_SIZE", default_value_t = DEFAULT_MAX_FRAME_SIZE)]
    pub max_frame_size: usize,

    /// How deeply arrays may nest inside a request frame
    #[arg(long, env = "REDIS_KV_MAX_NESTING_DEPTH", default_value_t = DEFAULT_MAX_NESTING_DEPTH)]
    pub max_nesting_depth: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Role {
    Master,
    Replica { host: String, port: u16 },
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Master => "master",
            Role::Replica { .. } => "slave",
        }
    }
}

/// Settings the server runs with, shared read-only by every connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind: IpAddr,
    pub port: u16,
    pub role: Role,
    pub max_frame_size: usize,
    pub max_nesting_depth: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: IpAddr::from([127, 0, 0, 1]),
            port: DEFAULT_PORT,
            role: Role::Master,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

impl TryFrom<Cli> for ServerConfig {
    type Error = CliError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        if cli.max_frame_size == 0 {
            return Err(CliError::InvalidMaxFrameSize);
        }

        if cli.max_nesting_depth == 0 {
            return Err(CliError::InvalidMaxNestingDepth);
        }

        let role = match cli.replicaof {
            Some(replicaof) => parse_replicaof(&replicaof)?,
            None => Role::Master,
        };

        Ok(ServerConfig {
            bind: cli.bind,
            port: cli.port,
            role,
            max_frame_size: cli.max_frame_size,
            max_nesting_depth: cli.max_nesting_depth,
        })
    }
}

fn parse_replicaof(value: &str) -> Result<Role, CliError> {
    let invalid = || CliError::InvalidReplicaOf(value.to_string());

    let mut parts = value.split_whitespace();
    let (Some(host), Some(port), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };

    let port = port.parse::<u16>().map_err(|_| invalid())?;
    if port == 0 {
        return Err(invalid());
    }

    Ok(Role::Replica {
        host: host.to_string(),
        port,
    })
}
