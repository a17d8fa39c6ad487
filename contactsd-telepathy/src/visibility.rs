use crate::source::PresenceState;

/// Decides whether a contact belongs in the roster shown to the user.
///
/// Blocked and removed contacts are hidden, and so are incoming authorization
/// requests the user never asked for (`publish == Ask` while we have no
/// subscription). A contact with both states at `No` stays visible: that is a
/// request we sent which got rejected.
pub fn is_visible(
    removed: bool,
    blocked: bool,
    publish: PresenceState,
    subscription: PresenceState,
) -> bool {
    !removed
        && !blocked
        && (publish != PresenceState::Ask || subscription != PresenceState::No)
}
