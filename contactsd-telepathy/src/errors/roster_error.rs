use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    #[error("Contact {0} is already in the roster")]
    DuplicateContact(String),
    #[error("Contact {0} is not in the roster")]
    UnknownContact(String),
}
