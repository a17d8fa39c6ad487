use bitflags::bitflags;

bitflags! {
    /// Aspects of a contact reported by one coalesced change notification.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Changes: u32 {
        const ALIAS = 1 << 0;
        const PRESENCE = 1 << 1;
        const CAPABILITIES = 1 << 2;
        const AVATAR = 1 << 3;
        const AUTHORIZATION = 1 << 4;
        const INFORMATION = 1 << 5;
        const BLOCKED = 1 << 6;
        /// Only ever set when a flush finds that the derived visibility flipped.
        const VISIBILITY = 1 << 7;
    }
}

bitflags! {
    /// Aspects of an account reported by `account_changed`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AccountChanges: u32 {
        const ALIAS = 1 << 0;
        const NICKNAME = 1 << 1;
        const PRESENCE = 1 << 2;
        const STATUS = 1 << 3;
        const ICON = 1 << 4;
        const AVATAR = 1 << 5;
        const PARAMETER = 1 << 6;
    }
}

impl Changes {
    /// Every aspect a raw notification can produce.
    pub fn raw() -> Self {
        Changes::all().difference(Changes::VISIBILITY)
    }

    pub fn names(&self) -> Vec<String> {
        self.iter_names()
            .map(|(name, _)| name.to_lowercase())
            .collect()
    }
}

impl AccountChanges {
    pub fn names(&self) -> Vec<String> {
        self.iter_names()
            .map(|(name, _)| name.to_lowercase())
            .collect()
    }
}
