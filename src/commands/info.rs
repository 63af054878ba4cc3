use std::sync::Arc;

use crate::{
    commands::command_error::CommandError,
    config::{Role, ServerConfig},
    resp::RespValue,
};

#[derive(Debug, PartialEq)]
enum InfoSection {
    Default,
    Replication,
    Unknown,
}

pub struct InfoArguments {
    sections: Vec<InfoSection>,
}

impl InfoArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        let sections = arguments
            .iter()
            .map(|section| match section.to_lowercase().as_str() {
                "default" | "all" | "everything" => InfoSection::Default,
                "replication" => InfoSection::Replication,
                _ => InfoSection::Unknown,
            })
            .collect();

        Ok(InfoArguments { sections })
    }

    fn includes_replication(&self) -> bool {
        self.sections.is_empty()
            || self
                .sections
                .iter()
                .any(|section| *section != InfoSection::Unknown)
    }
}

/// Handles the INFO command.
///
/// Only the replication section exists. It reports the role the server was
/// started with; an unknown section yields an empty bulk string.
pub async fn info(
    config: Arc<ServerConfig>,
    arguments: Vec<String>,
) -> Result<RespValue, CommandError> {
    let info_arguments = InfoArguments::parse(arguments)?;

    if !info_arguments.includes_replication() {
        return Ok(RespValue::BulkString(String::new()));
    }

    let mut replication = vec![
        "# Replication".to_string(),
        format!("role:{}", config.role.as_str()),
    ];

    match &config.role {
        Role::Master => replication.push("connected_slaves:0".to_string()),
        Role::Replica { host, port } => {
            replication.push(format!("master_host:{}", host));
            replication.push(format!("master_port:{}", port));
        }
    }

    Ok(RespValue::BulkString(replication.join("\r\n")))
}
