use crate::changes::AccountChanges;
use crate::contact::ContactWrapper;
use crate::errors::roster_error::RosterError;
use crate::handlers::{HandlerId, Handlers};
use crate::source::{ContactSource, Presence};
use log::{debug, trace, warn};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq)]
pub enum AccountEvent {
    DisplayNameChanged(Arc<String>),
    NicknameChanged(Arc<String>),
    IconChanged(Arc<String>),
    AvatarChanged(Arc<Vec<u8>>),
    CurrentPresenceChanged(Presence),
    ParametersChanged,
}

/// The provider-side account owning a roster of contacts.
pub trait AccountSource {
    fn path(&self) -> Arc<String>;
    fn display_name(&self) -> Arc<String>;
    fn nickname(&self) -> Arc<String>;
    fn icon_name(&self) -> Arc<String>;
    fn avatar(&self) -> Arc<Vec<u8>>;
    fn current_presence(&self) -> Presence;
    fn parameters(&self) -> HashMap<String, String>;
    fn subscribe(&self) -> broadcast::Receiver<AccountEvent>;
}

pub type AccountChangedHandler = dyn Fn(&Account, AccountChanges);

struct AccountInner {
    source: Rc<dyn AccountSource>,
    presence: RefCell<Presence>,
    contacts: RefCell<HashMap<String, ContactWrapper>>,
    handlers: Handlers<AccountChangedHandler>,
    listener: RefCell<Option<JoinHandle<()>>>,
}

impl Drop for AccountInner {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.get_mut().take() {
            listener.abort();
        }
    }
}

/// Wraps an [`AccountSource`], reporting its own property changes and keeping
/// the [`ContactWrapper`] of every contact in its roster.
#[derive(Clone)]
pub struct Account {
    inner: Rc<AccountInner>,
}

/// Non-owning reference held by contacts, so the roster does not keep itself alive.
#[derive(Clone)]
pub(crate) struct WeakAccount(Weak<AccountInner>);

impl WeakAccount {
    pub(crate) fn upgrade(&self) -> Option<Account> {
        self.0.upgrade().map(|inner| Account { inner })
    }
}

impl Account {
    pub fn new(source: Rc<dyn AccountSource>) -> Self {
        let mut rx = source.subscribe();
        let path = source.path();

        let account = Account {
            inner: Rc::new(AccountInner {
                presence: RefCell::new(source.current_presence()),
                source,
                contacts: RefCell::new(HashMap::new()),
                handlers: Handlers::new(),
                listener: RefCell::new(None),
            }),
        };

        let weak = Rc::downgrade(&account.inner);
        let handle = tokio::task::spawn_local(async move {
            loop {
                let event = match rx.recv().await {
                    Ok(event) => Some(event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Account {path} listener skipped {skipped} notifications");
                        None
                    }
                    Err(RecvError::Closed) => {
                        debug!("Account {path} source closed");
                        break;
                    }
                };

                let Some(inner) = weak.upgrade() else {
                    break;
                };

                let account = Account { inner };
                let changes = match event {
                    Some(event) => account.changes_for(&event),
                    None => AccountChanges::all(),
                };

                account.emit_changed(changes);
            }
        });

        *account.inner.listener.borrow_mut() = Some(handle);
        account
    }

    pub fn path(&self) -> Arc<String> {
        self.inner.source.path()
    }

    pub fn source(&self) -> Rc<dyn AccountSource> {
        self.inner.source.clone()
    }

    pub fn connect_account_changed<F>(&self, handler: F) -> HandlerId
    where
        F: Fn(&Account, AccountChanges) + 'static,
    {
        self.inner.handlers.connect(Rc::new(handler))
    }

    pub fn disconnect(&self, id: HandlerId) -> bool {
        self.inner.handlers.disconnect(id)
    }

    /// Starts tracking `contact`. Must be called from inside a `LocalSet`.
    pub fn add_contact(
        &self,
        contact: Rc<dyn ContactSource>,
    ) -> Result<ContactWrapper, RosterError> {
        let id = contact.id().to_string();
        if self.inner.contacts.borrow().contains_key(&id) {
            return Err(RosterError::DuplicateContact(id));
        }

        let wrapper = ContactWrapper::new(contact, self);
        self.inner.contacts.borrow_mut().insert(id, wrapper.clone());

        Ok(wrapper)
    }

    /// Drops `id` from the roster, marking it removed first so holders of the
    /// returned wrapper see it hidden.
    pub fn remove_contact(&self, id: &str) -> Result<ContactWrapper, RosterError> {
        let Some(wrapper) = self.inner.contacts.borrow_mut().remove(id) else {
            return Err(RosterError::UnknownContact(id.to_string()));
        };

        wrapper.set_removed(true);
        debug!("Removed {id} from {}", self.path());
        Ok(wrapper)
    }

    pub fn contact(&self, id: &str) -> Option<ContactWrapper> {
        self.inner.contacts.borrow().get(id).cloned()
    }

    /// Roster contacts ordered by id.
    pub fn contacts(&self) -> Vec<ContactWrapper> {
        let mut contacts: Vec<ContactWrapper> =
            self.inner.contacts.borrow().values().cloned().collect();
        contacts.sort_by_key(|contact| contact.id());
        contacts
    }

    pub fn visible_contacts(&self) -> Vec<ContactWrapper> {
        self.contacts()
            .into_iter()
            .filter(|contact| contact.is_visible())
            .collect()
    }

    pub fn ptr_eq(&self, other: &Account) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn downgrade(&self) -> WeakAccount {
        WeakAccount(Rc::downgrade(&self.inner))
    }

    fn changes_for(&self, event: &AccountEvent) -> AccountChanges {
        match event {
            AccountEvent::DisplayNameChanged(_) => AccountChanges::ALIAS,
            AccountEvent::NicknameChanged(_) => AccountChanges::NICKNAME,
            AccountEvent::IconChanged(_) => AccountChanges::ICON,
            AccountEvent::AvatarChanged(_) => AccountChanges::AVATAR,
            AccountEvent::ParametersChanged => AccountChanges::PARAMETER,
            AccountEvent::CurrentPresenceChanged(presence) => {
                let previous = self.inner.presence.replace(presence.clone());
                let mut changes = AccountChanges::empty();

                if previous.status != presence.status {
                    changes |= AccountChanges::PRESENCE;
                }

                if previous.message != presence.message {
                    changes |= AccountChanges::STATUS;
                }

                changes
            }
        }
    }

    fn emit_changed(&self, changes: AccountChanges) {
        if changes.is_empty() {
            return;
        }

        trace!("Account {} changed: {changes:?}", self.path());
        for handler in self.inner.handlers.snapshot() {
            handler(self, changes);
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("path", &self.path())
            .field("contacts", &self.inner.contacts.borrow().len())
            .finish()
    }
}
