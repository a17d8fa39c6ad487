use chrono::Utc;
use contactsd_telepathy::{Account, Capabilities, Changes, ContactWrapper, Presence, PresenceState};
use serde::Serialize;
use std::collections::BTreeMap;

/// One coalesced contact change, written to stdout as a JSON line.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeReport {
    pub contact: String,
    pub changes: Vec<String>,
    pub visible: bool,
    pub at: String,
}

impl ChangeReport {
    pub fn new(contact: &ContactWrapper, changes: Changes) -> Self {
        ChangeReport {
            contact: contact.id().to_string(),
            changes: changes.names(),
            visible: contact.is_visible(),
            at: Utc::now().to_rfc3339(),
        }
    }
}

/// Current state of one roster contact, as printed by `LST`.
#[derive(Debug, Clone, Serialize)]
pub struct ContactSnapshot {
    pub contact: String,
    pub alias: String,
    pub presence: Presence,
    pub capabilities: Capabilities,
    pub blocked: bool,
    pub publish: PresenceState,
    pub subscription: PresenceState,
    pub visible: bool,
    pub avatar_known: bool,
    pub information_known: bool,
}

impl ContactSnapshot {
    pub fn new(contact: &ContactWrapper) -> Self {
        let source = contact.contact();

        ContactSnapshot {
            contact: contact.id().to_string(),
            alias: source.alias().to_string(),
            presence: source.presence(),
            capabilities: source.capabilities(),
            blocked: source.is_blocked(),
            publish: source.publish_state(),
            subscription: source.subscription_state(),
            visible: contact.is_visible(),
            avatar_known: contact.is_avatar_known(),
            information_known: contact.is_information_known(),
        }
    }
}

/// State of the account, as printed by `ACC`.
#[derive(Debug, Clone, Serialize)]
pub struct AccountSnapshot {
    pub account: String,
    pub display_name: String,
    pub nickname: String,
    pub icon_name: String,
    pub avatar_size: usize,
    pub presence: Presence,
    pub parameters: BTreeMap<String, String>,
    pub contacts: usize,
}

impl AccountSnapshot {
    pub fn new(account: &Account) -> Self {
        let source = account.source();

        AccountSnapshot {
            account: account.path().to_string(),
            display_name: source.display_name().to_string(),
            nickname: source.nickname().to_string(),
            icon_name: source.icon_name().to_string(),
            avatar_size: source.avatar().len(),
            presence: source.current_presence(),
            parameters: source.parameters().into_iter().collect(),
            contacts: account.contacts().len(),
        }
    }
}
