use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PluginError {
    #[error("Plugin {0} was already initialized")]
    AlreadyInitialized(String),
    #[error("Plugin {0} is not initialized")]
    NotInitialized(String),
    #[error("No account with path {0}")]
    UnknownAccount(String),
    #[error("An account with path {0} is already loaded")]
    DuplicateAccount(String),
}
