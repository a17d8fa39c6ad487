use contactsd_telepathy::{
    Account, Changes, ContactWrapper, InfoField, MemoryAccount, MemoryContact, PresenceState,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use tokio::task::LocalSet;

async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

fn record(contact: &ContactWrapper) -> Rc<RefCell<Vec<Changes>>> {
    let received = Rc::new(RefCell::new(Vec::new()));
    let sink = received.clone();
    contact.connect_changed(move |_, changes| sink.borrow_mut().push(changes));
    received
}

fn account() -> Account {
    Account::new(Rc::new(MemoryAccount::new("gabble/jabber/alice")))
}

#[tokio::test]
async fn same_turn_notifications_coalesce() {
    LocalSet::new()
        .run_until(async {
            let account = account();
            let source = Rc::new(MemoryContact::new("bob@example.com"));
            let contact = account.add_contact(source.clone()).unwrap();
            assert!(contact.is_visible());

            let received = record(&contact);
            source.set_alias("Bob");
            source.set_presence("available", "");
            settle().await;

            assert_eq!(*received.borrow(), vec![Changes::ALIAS | Changes::PRESENCE]);
            assert!(contact.pending_changes().is_empty());
            assert!(contact.is_visible());
        })
        .await;
}

#[tokio::test]
async fn separate_turns_emit_separately() {
    LocalSet::new()
        .run_until(async {
            let account = account();
            let source = Rc::new(MemoryContact::new("bob@example.com"));
            let contact = account.add_contact(source.clone()).unwrap();
            let received = record(&contact);

            source.set_alias("Bob");
            settle().await;
            source.set_presence("away", "lunch");
            settle().await;

            assert_eq!(*received.borrow(), vec![Changes::ALIAS, Changes::PRESENCE]);
        })
        .await;
}

#[tokio::test]
async fn repeated_aspect_is_reported_once() {
    LocalSet::new()
        .run_until(async {
            let account = account();
            let source = Rc::new(MemoryContact::new("bob@example.com"));
            let contact = account.add_contact(source.clone()).unwrap();
            let received = record(&contact);

            contact.contribute(Changes::AVATAR);
            contact.contribute(Changes::AVATAR);
            contact.contribute(Changes::AVATAR);
            settle().await;

            assert_eq!(*received.borrow(), vec![Changes::AVATAR]);
        })
        .await;
}

#[tokio::test]
async fn contribute_never_flushes_synchronously() {
    LocalSet::new()
        .run_until(async {
            let account = account();
            let source = Rc::new(MemoryContact::new("bob@example.com"));
            let contact = account.add_contact(source.clone()).unwrap();
            let received = record(&contact);

            contact.contribute(Changes::CAPABILITIES);
            assert!(received.borrow().is_empty());
            assert_eq!(contact.pending_changes(), Changes::CAPABILITIES);

            settle().await;
            assert_eq!(*received.borrow(), vec![Changes::CAPABILITIES]);
        })
        .await;
}

#[tokio::test]
async fn blocking_hides_contact() {
    LocalSet::new()
        .run_until(async {
            let account = account();
            let source = Rc::new(MemoryContact::new("bob@example.com"));
            let contact = account.add_contact(source.clone()).unwrap();
            let received = record(&contact);

            source.set_blocked(true);
            settle().await;

            assert_eq!(*received.borrow(), vec![Changes::BLOCKED | Changes::VISIBILITY]);
            assert!(!contact.is_visible());
        })
        .await;
}

#[tokio::test]
async fn authorization_flow_toggles_visibility() {
    LocalSet::new()
        .run_until(async {
            let account = account();
            let source = Rc::new(MemoryContact::new("carol@example.com"));
            let contact = account.add_contact(source.clone()).unwrap();
            let received = record(&contact);

            source.set_publish_state(PresenceState::Ask, "please add me");
            settle().await;
            assert!(!contact.is_visible());

            source.set_subscription_state(PresenceState::Yes);
            settle().await;
            assert!(contact.is_visible());

            assert_eq!(
                *received.borrow(),
                vec![
                    Changes::AUTHORIZATION | Changes::VISIBILITY,
                    Changes::AUTHORIZATION | Changes::VISIBILITY,
                ]
            );
        })
        .await;
}

#[tokio::test]
async fn initial_visibility_comes_from_snapshot() {
    LocalSet::new()
        .run_until(async {
            let account = account();
            let source = Rc::new(MemoryContact::new("dave@example.com"));
            source.set_publish_state(PresenceState::Ask, "");

            let contact = account.add_contact(source.clone()).unwrap();
            assert!(!contact.is_visible());
        })
        .await;
}

#[tokio::test]
async fn set_removed_updates_visibility_immediately() {
    LocalSet::new()
        .run_until(async {
            let account = account();
            let source = Rc::new(MemoryContact::new("bob@example.com"));
            let contact = account.add_contact(source.clone()).unwrap();
            let received = record(&contact);
            assert!(contact.is_visible());

            contact.set_removed(true);
            assert!(contact.is_removed());
            assert!(!contact.is_visible());
            assert!(contact.pending_changes().is_empty());

            settle().await;
            assert!(received.borrow().is_empty());
        })
        .await;
}

#[tokio::test]
async fn removal_is_not_reported_by_later_flush() {
    LocalSet::new()
        .run_until(async {
            let account = account();
            let source = Rc::new(MemoryContact::new("bob@example.com"));
            let contact = account.add_contact(source.clone()).unwrap();
            let received = record(&contact);

            contact.set_removed(true);
            source.set_alias("Bob");
            settle().await;

            assert_eq!(*received.borrow(), vec![Changes::ALIAS]);
        })
        .await;
}

#[tokio::test]
async fn avatar_known_states() {
    LocalSet::new()
        .run_until(async {
            let account = account();
            let source = Rc::new(MemoryContact::new("bob@example.com"));
            let contact = account.add_contact(source.clone()).unwrap();

            assert!(!contact.is_avatar_known());

            source.set_avatar("abc", None);
            assert!(!contact.is_avatar_known());

            source.set_avatar("abc", Some(""));
            assert!(!contact.is_avatar_known());

            source.set_avatar("abc", Some("/var/cache/avatars/abc.png"));
            assert!(contact.is_avatar_known());

            source.set_avatar("", None);
            assert!(contact.is_avatar_known());
        })
        .await;
}

#[tokio::test]
async fn information_known_follows_source() {
    LocalSet::new()
        .run_until(async {
            let account = account();
            let source = Rc::new(MemoryContact::new("bob@example.com"));
            let contact = account.add_contact(source.clone()).unwrap();
            let received = record(&contact);

            assert!(!contact.is_information_known());

            source.set_info_fields(vec![InfoField {
                name: Arc::new("fn".to_string()),
                parameters: vec![],
                values: vec![Arc::new("Bob Builder".to_string())],
            }]);
            assert!(contact.is_information_known());

            settle().await;
            assert_eq!(*received.borrow(), vec![Changes::INFORMATION]);
        })
        .await;
}

#[tokio::test]
async fn lagged_listener_reports_every_raw_aspect() {
    LocalSet::new()
        .run_until(async {
            let account = account();
            let source = Rc::new(MemoryContact::new("bob@example.com"));
            let contact = account.add_contact(source.clone()).unwrap();
            let received = record(&contact);

            for i in 0..100 {
                source.set_alias(&format!("Bob {i}"));
            }
            settle().await;

            assert_eq!(*received.borrow(), vec![Changes::raw()]);
        })
        .await;
}

#[tokio::test]
async fn handler_receives_the_contact() {
    LocalSet::new()
        .run_until(async {
            let account = account();
            let source = Rc::new(MemoryContact::new("bob@example.com"));
            let contact = account.add_contact(source.clone()).unwrap();

            let seen = Rc::new(RefCell::new(Vec::new()));
            let sink = seen.clone();
            contact.connect_changed(move |contact, _| sink.borrow_mut().push(contact.clone()));

            source.set_alias("Bob");
            settle().await;

            let seen = seen.borrow();
            assert_eq!(seen.len(), 1);
            assert!(seen[0].ptr_eq(&contact));
        })
        .await;
}

#[tokio::test]
async fn disconnected_handler_is_not_called() {
    LocalSet::new()
        .run_until(async {
            let account = account();
            let source = Rc::new(MemoryContact::new("bob@example.com"));
            let contact = account.add_contact(source.clone()).unwrap();

            let received = Rc::new(RefCell::new(Vec::new()));
            let sink = received.clone();
            let id = contact.connect_changed(move |_, changes| sink.borrow_mut().push(changes));
            assert_eq!(contact.handler_count(), 1);

            assert!(contact.disconnect(id));
            assert!(!contact.disconnect(id));
            assert_eq!(contact.handler_count(), 0);

            source.set_alias("Bob");
            settle().await;
            assert!(received.borrow().is_empty());
        })
        .await;
}

#[tokio::test]
async fn contribution_from_handler_schedules_next_flush() {
    LocalSet::new()
        .run_until(async {
            let account = account();
            let source = Rc::new(MemoryContact::new("bob@example.com"));
            let contact = account.add_contact(source.clone()).unwrap();

            let received = Rc::new(RefCell::new(Vec::new()));
            let sink = received.clone();
            contact.connect_changed(move |contact, changes| {
                sink.borrow_mut().push(changes);
                if changes.contains(Changes::ALIAS) {
                    contact.contribute(Changes::AVATAR);
                }
            });

            source.set_alias("Bob");
            settle().await;

            assert_eq!(*received.borrow(), vec![Changes::ALIAS, Changes::AVATAR]);
        })
        .await;
}

#[tokio::test]
async fn dropped_contact_skips_queued_flush() {
    LocalSet::new()
        .run_until(async {
            let account = account();
            let source = Rc::new(MemoryContact::new("bob@example.com"));
            let contact = ContactWrapper::new(source.clone(), &account);
            let received = record(&contact);

            contact.contribute(Changes::ALIAS);
            drop(contact);
            settle().await;

            assert!(received.borrow().is_empty());
            assert_eq!(source.subscriber_count(), 0);
        })
        .await;
}

#[tokio::test]
async fn account_wrapper_is_the_owning_account() {
    LocalSet::new()
        .run_until(async {
            let account = account();
            let source = Rc::new(MemoryContact::new("bob@example.com"));
            let contact = account.add_contact(source.clone()).unwrap();

            let owner = contact.account_wrapper().unwrap();
            assert!(owner.ptr_eq(&account));
            assert_eq!(*owner.path(), "gabble/jabber/alice");
        })
        .await;
}
