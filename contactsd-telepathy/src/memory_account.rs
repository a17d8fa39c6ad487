use crate::account::{AccountEvent, AccountSource};
use crate::source::Presence;
use log::trace;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

/// In-process [`AccountSource`]; setters store the value then broadcast the event.
pub struct MemoryAccount {
    path: Arc<String>,
    display_name: RefCell<Arc<String>>,
    nickname: RefCell<Arc<String>>,
    icon_name: RefCell<Arc<String>>,
    avatar: RefCell<Arc<Vec<u8>>>,
    presence: RefCell<Presence>,
    parameters: RefCell<HashMap<String, String>>,
    tx: broadcast::Sender<AccountEvent>,
}

impl MemoryAccount {
    pub fn new(path: &str) -> Self {
        let (tx, _) = broadcast::channel::<AccountEvent>(16);
        let path = Arc::new(path.to_string());

        MemoryAccount {
            display_name: RefCell::new(path.clone()),
            nickname: RefCell::new(Arc::new(String::new())),
            icon_name: RefCell::new(Arc::new("im".to_string())),
            avatar: RefCell::new(Arc::new(Vec::new())),
            presence: RefCell::new(Presence::default()),
            parameters: RefCell::new(HashMap::new()),
            path,
            tx,
        }
    }

    pub fn set_display_name(&self, display_name: &str) {
        let display_name = Arc::new(display_name.to_string());
        *self.display_name.borrow_mut() = display_name.clone();
        self.emit(AccountEvent::DisplayNameChanged(display_name));
    }

    pub fn set_nickname(&self, nickname: &str) {
        let nickname = Arc::new(nickname.to_string());
        *self.nickname.borrow_mut() = nickname.clone();
        self.emit(AccountEvent::NicknameChanged(nickname));
    }

    pub fn set_icon_name(&self, icon_name: &str) {
        let icon_name = Arc::new(icon_name.to_string());
        *self.icon_name.borrow_mut() = icon_name.clone();
        self.emit(AccountEvent::IconChanged(icon_name));
    }

    pub fn set_avatar(&self, avatar: Vec<u8>) {
        let avatar = Arc::new(avatar);
        *self.avatar.borrow_mut() = avatar.clone();
        self.emit(AccountEvent::AvatarChanged(avatar));
    }

    pub fn set_current_presence(&self, status: &str, message: &str) {
        let presence = Presence {
            status: Arc::new(status.to_string()),
            message: Arc::new(message.to_string()),
        };

        *self.presence.borrow_mut() = presence.clone();
        self.emit(AccountEvent::CurrentPresenceChanged(presence));
    }

    pub fn set_parameter(&self, key: &str, value: &str) {
        self.parameters
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.emit(AccountEvent::ParametersChanged);
    }

    fn emit(&self, event: AccountEvent) {
        if self.tx.send(event).is_err() {
            trace!("No listener for {}", self.path);
        }
    }
}

impl AccountSource for MemoryAccount {
    fn path(&self) -> Arc<String> {
        self.path.clone()
    }

    fn display_name(&self) -> Arc<String> {
        self.display_name.borrow().clone()
    }

    fn nickname(&self) -> Arc<String> {
        self.nickname.borrow().clone()
    }

    fn icon_name(&self) -> Arc<String> {
        self.icon_name.borrow().clone()
    }

    fn avatar(&self) -> Arc<Vec<u8>> {
        self.avatar.borrow().clone()
    }

    fn current_presence(&self) -> Presence {
        self.presence.borrow().clone()
    }

    fn parameters(&self) -> HashMap<String, String> {
        self.parameters.borrow().clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<AccountEvent> {
        self.tx.subscribe()
    }
}
