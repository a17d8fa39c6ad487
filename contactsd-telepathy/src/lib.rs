//! Tracks the contacts of instant messaging accounts and reports their changes.
//!
//! Raw per-property notifications from a [`ContactSource`] are folded into one
//! [`Changes`] mask per scheduler turn by [`ContactWrapper`], which also keeps
//! the roster visibility of the contact up to date.

pub mod account;
pub mod changes;
pub mod contact;
pub mod errors;
mod handlers;
pub mod listener;
pub mod memory_account;
pub mod memory_contact;
pub mod plugin;
pub mod source;
pub mod visibility;

pub use account::{Account, AccountEvent, AccountSource};
pub use changes::{AccountChanges, Changes};
pub use contact::ContactWrapper;
pub use errors::{plugin_error::PluginError, roster_error::RosterError};
pub use handlers::HandlerId;
pub use memory_account::MemoryAccount;
pub use memory_contact::MemoryContact;
pub use plugin::{Plugin, PluginMetadata, TelepathyPlugin};
pub use source::{
    AvatarData, Capabilities, ContactEvent, ContactSource, InfoField, Presence, PresenceState,
};
pub use visibility::is_visible;
