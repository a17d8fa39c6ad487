use crate::source::{
    AvatarData, Capabilities, ContactEvent, ContactSource, InfoField, Presence, PresenceState,
};
use log::trace;
use std::cell::{Cell, RefCell};
use std::sync::Arc;
use tokio::sync::broadcast;

/// In-process [`ContactSource`] driven through its setters.
///
/// Every setter stores the new value first and then broadcasts the matching
/// [`ContactEvent`], so subscribers always read the updated value back.
pub struct MemoryContact {
    id: Arc<String>,
    alias: RefCell<Arc<String>>,
    presence: RefCell<Presence>,
    capabilities: Cell<Capabilities>,
    blocked: Cell<bool>,
    publish_state: Cell<PresenceState>,
    subscription_state: Cell<PresenceState>,
    avatar_token: RefCell<Option<Arc<String>>>,
    avatar_data: RefCell<AvatarData>,
    info_fields: RefCell<Option<Vec<InfoField>>>,
    tx: broadcast::Sender<ContactEvent>,
}

impl MemoryContact {
    pub fn new(id: &str) -> Self {
        let (tx, _) = broadcast::channel::<ContactEvent>(64);
        let id = Arc::new(id.to_string());

        MemoryContact {
            alias: RefCell::new(id.clone()),
            id,
            presence: RefCell::new(Presence::default()),
            capabilities: Cell::new(Capabilities::default()),
            blocked: Cell::new(false),
            publish_state: Cell::new(PresenceState::No),
            subscription_state: Cell::new(PresenceState::No),
            avatar_token: RefCell::new(None),
            avatar_data: RefCell::new(AvatarData::default()),
            info_fields: RefCell::new(None),
            tx,
        }
    }

    pub fn set_alias(&self, alias: &str) {
        let alias = Arc::new(alias.to_string());
        *self.alias.borrow_mut() = alias.clone();
        self.emit(ContactEvent::AliasChanged(alias));
    }

    pub fn set_presence(&self, status: &str, message: &str) {
        let presence = Presence {
            status: Arc::new(status.to_string()),
            message: Arc::new(message.to_string()),
        };

        *self.presence.borrow_mut() = presence.clone();
        self.emit(ContactEvent::PresenceChanged(presence));
    }

    pub fn set_capabilities(&self, capabilities: Capabilities) {
        self.capabilities.set(capabilities);
        self.emit(ContactEvent::CapabilitiesChanged(capabilities));
    }

    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.set(blocked);
        self.emit(ContactEvent::BlockStatusChanged(blocked));
    }

    pub fn set_publish_state(&self, state: PresenceState, message: &str) {
        self.publish_state.set(state);
        self.emit(ContactEvent::PublishStateChanged {
            state,
            message: Arc::new(message.to_string()),
        });
    }

    pub fn set_subscription_state(&self, state: PresenceState) {
        self.subscription_state.set(state);
        self.emit(ContactEvent::SubscriptionStateChanged(state));
    }

    /// Makes the avatar token known. An empty token means the contact has no avatar.
    pub fn set_avatar(&self, token: &str, file_name: Option<&str>) {
        let data = AvatarData {
            file_name: file_name.map(|name| Arc::new(name.to_string())),
            mime_type: None,
        };

        *self.avatar_token.borrow_mut() = Some(Arc::new(token.to_string()));
        *self.avatar_data.borrow_mut() = data.clone();
        self.emit(ContactEvent::AvatarDataChanged(data));
    }

    pub fn set_info_fields(&self, fields: Vec<InfoField>) {
        *self.info_fields.borrow_mut() = Some(fields.clone());
        self.emit(ContactEvent::InfoFieldsChanged(fields));
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    fn emit(&self, event: ContactEvent) {
        // No subscriber yet is fine, the snapshot is read at construction
        if self.tx.send(event).is_err() {
            trace!("No listener for {}", self.id);
        }
    }
}

impl ContactSource for MemoryContact {
    fn id(&self) -> Arc<String> {
        self.id.clone()
    }

    fn alias(&self) -> Arc<String> {
        self.alias.borrow().clone()
    }

    fn presence(&self) -> Presence {
        self.presence.borrow().clone()
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities.get()
    }

    fn is_blocked(&self) -> bool {
        self.blocked.get()
    }

    fn publish_state(&self) -> PresenceState {
        self.publish_state.get()
    }

    fn subscription_state(&self) -> PresenceState {
        self.subscription_state.get()
    }

    fn is_avatar_token_known(&self) -> bool {
        self.avatar_token.borrow().is_some()
    }

    fn avatar_token(&self) -> Arc<String> {
        self.avatar_token
            .borrow()
            .clone()
            .unwrap_or_else(|| Arc::new(String::new()))
    }

    fn avatar_data(&self) -> AvatarData {
        self.avatar_data.borrow().clone()
    }

    fn is_contact_info_known(&self) -> bool {
        self.info_fields.borrow().is_some()
    }

    fn info_fields(&self) -> Vec<InfoField> {
        self.info_fields.borrow().clone().unwrap_or_default()
    }

    fn subscribe(&self) -> broadcast::Receiver<ContactEvent> {
        self.tx.subscribe()
    }
}
