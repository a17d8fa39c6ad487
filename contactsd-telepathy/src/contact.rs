use crate::account::{Account, WeakAccount};
use crate::changes::Changes;
use crate::handlers::{HandlerId, Handlers};
use crate::listener;
use crate::source::ContactSource;
use crate::visibility::is_visible;
use log::{debug, trace};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub type ChangedHandler = dyn Fn(&ContactWrapper, Changes);

struct ContactInner {
    contact: Rc<dyn ContactSource>,
    account: WeakAccount,
    removed: Cell<bool>,
    visible: Cell<bool>,
    queued_changes: Cell<Changes>,
    handlers: Handlers<ChangedHandler>,
    listener: RefCell<Option<JoinHandle<()>>>,
}

impl Drop for ContactInner {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.get_mut().take() {
            listener.abort();
        }
    }
}

/// Tracks one roster contact and turns its raw property notifications into
/// coalesced `changed` notifications.
///
/// Notifications arriving while a flush is queued only grow the queued mask, so
/// a burst delivered in one scheduler turn reaches the handlers as a single
/// call. The flush runs as a `spawn_local` task, which means the wrapper has
/// to be created and fed from inside a `LocalSet`.
#[derive(Clone)]
pub struct ContactWrapper {
    inner: Rc<ContactInner>,
}

impl ContactWrapper {
    pub fn new(contact: Rc<dyn ContactSource>, account: &Account) -> Self {
        let rx = contact.subscribe();
        let id = contact.id();

        let wrapper = ContactWrapper {
            inner: Rc::new(ContactInner {
                contact,
                account: account.downgrade(),
                removed: Cell::new(false),
                visible: Cell::new(false),
                queued_changes: Cell::new(Changes::empty()),
                handlers: Handlers::new(),
                listener: RefCell::new(None),
            }),
        };

        wrapper.update_visibility();

        let weak = Rc::downgrade(&wrapper.inner);
        let handle = listener::spawn(id.clone(), rx, move |changes| match weak.upgrade() {
            Some(inner) => {
                ContactWrapper { inner }.contribute(changes);
                true
            }
            None => false,
        });

        *wrapper.inner.listener.borrow_mut() = Some(handle);

        debug!(
            "Tracking contact {id}, visible: {}",
            wrapper.inner.visible.get()
        );
        wrapper
    }

    pub fn id(&self) -> Arc<String> {
        self.inner.contact.id()
    }

    pub fn contact(&self) -> Rc<dyn ContactSource> {
        self.inner.contact.clone()
    }

    pub fn account_wrapper(&self) -> Option<Account> {
        self.inner.account.upgrade()
    }

    pub fn is_visible(&self) -> bool {
        self.inner.visible.get()
    }

    pub fn is_removed(&self) -> bool {
        self.inner.removed.get()
    }

    /// Changes waiting for the next flush. Empty exactly when no flush is queued.
    pub fn pending_changes(&self) -> Changes {
        self.inner.queued_changes.get()
    }

    /// False while the avatar token is unknown, or while a non-empty token has
    /// no avatar file yet (the data is probably being fetched).
    pub fn is_avatar_known(&self) -> bool {
        let contact = &self.inner.contact;

        if !contact.is_avatar_token_known() {
            return false;
        }

        if !contact.avatar_token().is_empty()
            && contact
                .avatar_data()
                .file_name
                .as_ref()
                .is_none_or(|file_name| file_name.is_empty())
        {
            return false;
        }

        true
    }

    pub fn is_information_known(&self) -> bool {
        self.inner.contact.is_contact_info_known()
    }

    pub fn connect_changed<F>(&self, handler: F) -> HandlerId
    where
        F: Fn(&ContactWrapper, Changes) + 'static,
    {
        self.inner.handlers.connect(Rc::new(handler))
    }

    pub fn disconnect(&self, id: HandlerId) -> bool {
        self.inner.handlers.disconnect(id)
    }

    pub fn handler_count(&self) -> usize {
        self.inner.handlers.len()
    }

    /// Queues `changes` for the next flush, scheduling one if none is pending.
    pub fn contribute(&self, changes: Changes) {
        if changes.is_empty() {
            return;
        }

        let queued = self.inner.queued_changes.get();
        self.inner.queued_changes.set(queued | changes);

        if !queued.is_empty() {
            return;
        }

        let weak = Rc::downgrade(&self.inner);
        tokio::task::spawn_local(async move {
            match weak.upgrade() {
                Some(inner) => ContactWrapper { inner }.flush(),
                None => trace!("Contact dropped with queued changes"),
            }
        });
    }

    /// Marks the contact as removed from the roster and recomputes visibility
    /// right away. No `changed` notification is queued by this.
    pub fn set_removed(&self, value: bool) {
        self.inner.removed.set(value);
        self.update_visibility();

        debug!(
            "Contact {} removed: {value}, visible: {}",
            self.id(),
            self.inner.visible.get()
        );
    }

    pub fn ptr_eq(&self, other: &ContactWrapper) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn flush(&self) {
        // Taken before dispatch so handlers contributing again schedule a new flush
        let mut changes = self.inner.queued_changes.replace(Changes::empty());

        let was_visible = self.inner.visible.get();
        self.update_visibility();
        if self.inner.visible.get() != was_visible {
            changes |= Changes::VISIBILITY;
        }

        if changes.is_empty() {
            trace!("Contact {} flushed without changes", self.id());
            return;
        }

        trace!("Contact {} changed: {changes:?}", self.id());
        for handler in self.inner.handlers.snapshot() {
            handler(self, changes);
        }
    }

    fn update_visibility(&self) {
        let contact = &self.inner.contact;
        self.inner.visible.set(is_visible(
            self.inner.removed.get(),
            contact.is_blocked(),
            contact.publish_state(),
            contact.subscription_state(),
        ));
    }
}

impl fmt::Debug for ContactWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContactWrapper")
            .field("id", &self.id())
            .field("removed", &self.is_removed())
            .field("visible", &self.is_visible())
            .field("queued_changes", &self.pending_changes())
            .finish()
    }
}
