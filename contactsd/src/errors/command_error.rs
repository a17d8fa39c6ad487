use contactsd_telepathy::RosterError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
    #[error("Command doesn't have enough arguments: {0}")]
    NotEnoughArguments(String),
    #[error("Invalid argument for {command}: {argument}")]
    InvalidArgument { command: String, argument: String },
    #[error("Contact {0} is not tracked")]
    UnknownContact(String),
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error("Could not serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}
