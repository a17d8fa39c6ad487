use crate::changes::Changes;
use crate::source::ContactEvent;
use log::{debug, trace, warn};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

/// Maps a raw notification to the aspect it touches. Never yields `VISIBILITY`.
pub fn aspect_for(event: &ContactEvent) -> Changes {
    match event {
        ContactEvent::AliasChanged(_) => Changes::ALIAS,
        ContactEvent::PresenceChanged(_) => Changes::PRESENCE,
        ContactEvent::CapabilitiesChanged(_) => Changes::CAPABILITIES,
        ContactEvent::AvatarDataChanged(_) => Changes::AVATAR,
        ContactEvent::SubscriptionStateChanged(_) => Changes::AUTHORIZATION,
        ContactEvent::PublishStateChanged { .. } => Changes::AUTHORIZATION,
        ContactEvent::InfoFieldsChanged(_) => Changes::INFORMATION,
        ContactEvent::BlockStatusChanged(_) => Changes::BLOCKED,
    }
}

/// Forwards every notification on `rx` to `contribute` until the channel closes
/// or `contribute` reports that its contact is gone.
///
/// Must be called from inside a `LocalSet`.
pub(crate) fn spawn<F>(
    id: Arc<String>,
    mut rx: broadcast::Receiver<ContactEvent>,
    contribute: F,
) -> JoinHandle<()>
where
    F: Fn(Changes) -> bool + 'static,
{
    tokio::task::spawn_local(async move {
        loop {
            let changes = match rx.recv().await {
                Ok(event) => {
                    trace!("Contact {id}: {event:?}");
                    aspect_for(&event)
                }

                Err(RecvError::Lagged(skipped)) => {
                    warn!("Contact {id} listener skipped {skipped} notifications");
                    Changes::raw()
                }

                Err(RecvError::Closed) => {
                    debug!("Contact {id} source closed");
                    break;
                }
            };

            if !contribute(changes) {
                debug!("Contact {id} dropped, stopping listener");
                break;
            }
        }
    })
}
