use bitflags::bitflags;

bitflags! {
    /// Derived artifacts that are stale relative to their inputs.
    ///
    /// Setters return the flags they invalidate; the engine accumulates them
    /// and clears each one as its reconcile stage runs.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DirtyFlags: u8 {
        /// Active action set, capability mask and compact slots.
        const POSSIBLE_ACTIONS = 1 << 0;
        /// Session playback state (capabilities, position, rate, transport).
        const PLAYBACK_STATE = 1 << 1;
        /// Session metadata (title, artist, album, artwork, duration).
        const METADATA = 1 << 2;
        /// Notification actions and content.
        const NOTIFICATION = 1 << 3;
    }
}

impl Default for DirtyFlags {
    fn default() -> Self {
        Self::empty()
    }
}

impl DirtyFlags {
    /// Flags invalidated by a transport state change.
    pub const TRANSPORT: Self = Self::POSSIBLE_ACTIONS.union(Self::PLAYBACK_STATE);

    /// Flags invalidated by a track metadata change.
    pub const TRACK: Self = Self::METADATA.union(Self::NOTIFICATION);

    /// Remove `flag` and report whether it was set.
    pub fn take(&mut self, flag: DirtyFlags) -> bool {
        let was_set = self.contains(flag);
        self.remove(flag);
        was_set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_clears_only_the_requested_flag() {
        let mut flags = DirtyFlags::POSSIBLE_ACTIONS | DirtyFlags::METADATA;

        assert!(flags.take(DirtyFlags::METADATA));
        assert!(!flags.take(DirtyFlags::METADATA));
        assert_eq!(flags, DirtyFlags::POSSIBLE_ACTIONS);
    }
}
