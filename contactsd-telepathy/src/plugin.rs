use crate::account::{Account, AccountSource};
use crate::errors::plugin_error::PluginError;
use log::{info, warn};
use std::collections::HashMap;
use std::rc::Rc;

pub const METADATA_KEY_VERSION: &str = "version";
pub const METADATA_KEY_NAME: &str = "name";
pub const METADATA_KEY_COMMENT: &str = "comment";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginMetadata {
    pub name: String,
    pub version: String,
    pub comment: String,
}

impl PluginMetadata {
    pub fn to_map(&self) -> HashMap<&'static str, String> {
        HashMap::from([
            (METADATA_KEY_NAME, self.name.clone()),
            (METADATA_KEY_VERSION, self.version.clone()),
            (METADATA_KEY_COMMENT, self.comment.clone()),
        ])
    }
}

pub trait Plugin {
    fn metadata(&self) -> PluginMetadata;
    fn init(&mut self) -> Result<(), PluginError>;
}

/// Loads accounts and keeps their rosters for as long as the daemon runs.
#[derive(Default)]
pub struct TelepathyPlugin {
    initialized: bool,
    accounts: Vec<Account>,
}

impl TelepathyPlugin {
    pub fn new() -> Self {
        TelepathyPlugin::default()
    }

    /// Wraps `source`. Must be called from inside a `LocalSet`.
    pub fn add_account(&mut self, source: Rc<dyn AccountSource>) -> Result<Account, PluginError> {
        if !self.initialized {
            return Err(PluginError::NotInitialized(self.metadata().name));
        }

        let path = source.path();
        if self.account(&path).is_some() {
            return Err(PluginError::DuplicateAccount(path.to_string()));
        }

        let account = Account::new(source);
        self.accounts.push(account.clone());
        info!("Loaded account {path}");

        Ok(account)
    }

    /// Unloads the account at `path`, marking every contact of its roster removed.
    pub fn remove_account(&mut self, path: &str) -> Result<Account, PluginError> {
        let Some(index) = self
            .accounts
            .iter()
            .position(|account| *account.path() == path)
        else {
            return Err(PluginError::UnknownAccount(path.to_string()));
        };

        let account = self.accounts.remove(index);
        for contact in account.contacts() {
            if let Err(error) = account.remove_contact(&contact.id()) {
                warn!("Could not remove contact while unloading {path}: {error}");
            }
        }

        info!("Unloaded account {path}");
        Ok(account)
    }

    pub fn account(&self, path: &str) -> Option<Account> {
        self.accounts
            .iter()
            .find(|account| *account.path() == path)
            .cloned()
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }
}

impl Plugin for TelepathyPlugin {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata {
            name: "telepathy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            comment: "Tracks instant messaging contacts".to_string(),
        }
    }

    fn init(&mut self) -> Result<(), PluginError> {
        if self.initialized {
            return Err(PluginError::AlreadyInitialized(self.metadata().name));
        }

        self.initialized = true;
        info!("Initialized plugin {}", self.metadata().name);
        Ok(())
    }
}
