use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

/// State of one side of a roster subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceState {
    #[default]
    No,
    Ask,
    Yes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Presence {
    pub status: Arc<String>,
    pub message: Arc<String>,
}

impl Default for Presence {
    fn default() -> Self {
        Presence {
            status: Arc::new("offline".to_string()),
            message: Arc::new(String::new()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Capabilities {
    pub text_chat: bool,
    pub audio_calls: bool,
    pub video_calls: bool,
    pub file_transfer: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AvatarData {
    pub file_name: Option<Arc<String>>,
    pub mime_type: Option<Arc<String>>,
}

/// One vCard-like field of a contact's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfoField {
    pub name: Arc<String>,
    pub parameters: Vec<Arc<String>>,
    pub values: Vec<Arc<String>>,
}

/// Raw property notifications emitted by a [`ContactSource`], one per changed property.
#[derive(Debug, Clone, PartialEq)]
pub enum ContactEvent {
    AliasChanged(Arc<String>),
    PresenceChanged(Presence),
    CapabilitiesChanged(Capabilities),
    AvatarDataChanged(AvatarData),
    SubscriptionStateChanged(PresenceState),
    PublishStateChanged {
        state: PresenceState,
        message: Arc<String>,
    },
    InfoFieldsChanged(Vec<InfoField>),
    BlockStatusChanged(bool),
}

/// Live view of one remote contact as kept by the communications provider.
///
/// Values are always read back through these getters; the payload carried by a
/// [`ContactEvent`] only tells which property moved.
pub trait ContactSource {
    fn id(&self) -> Arc<String>;
    fn alias(&self) -> Arc<String>;
    fn presence(&self) -> Presence;
    fn capabilities(&self) -> Capabilities;
    fn is_blocked(&self) -> bool;
    fn publish_state(&self) -> PresenceState;
    fn subscription_state(&self) -> PresenceState;
    fn is_avatar_token_known(&self) -> bool;
    fn avatar_token(&self) -> Arc<String>;
    fn avatar_data(&self) -> AvatarData;
    fn is_contact_info_known(&self) -> bool;
    fn info_fields(&self) -> Vec<InfoField>;
    fn subscribe(&self) -> broadcast::Receiver<ContactEvent>;
}
