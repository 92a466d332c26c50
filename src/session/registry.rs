use std::collections::HashMap;

use tracing::trace;

use super::{DirtyFlags, MediaAction};

/// Registration status of one action handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandlerStatus {
    /// No handler was registered
    #[default]
    Absent,

    /// A live handler is registered
    Registered,

    /// A handler was registered but its channel back to the application is gone
    Dangling,
}

/// Tracks which actions the application currently handles.
///
/// A dangling handler is indistinguishable from an absent one for every
/// engine computation.
#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    entries: HashMap<MediaAction, HandlerStatus>,
}

impl HandlerRegistry {
    /// Mark `action` as handled, reviving a dangling registration.
    pub fn register(&mut self, action: MediaAction) -> DirtyFlags {
        trace!(%action, "handler registered");
        self.entries.insert(action, HandlerStatus::Registered);
        DirtyFlags::POSSIBLE_ACTIONS
    }

    /// Forget the handler for `action`.
    pub fn unregister(&mut self, action: MediaAction) -> DirtyFlags {
        trace!(%action, "handler unregistered");
        self.entries.remove(&action);
        DirtyFlags::POSSIBLE_ACTIONS
    }

    /// Mark a registered handler as dangling. Absent handlers stay absent.
    pub fn invalidate(&mut self, action: MediaAction) -> DirtyFlags {
        if let Some(status) = self.entries.get_mut(&action) {
            trace!(%action, "handler invalidated");
            *status = HandlerStatus::Dangling;
        }
        DirtyFlags::POSSIBLE_ACTIONS
    }

    /// Registration status for `action`.
    pub fn status(&self, action: MediaAction) -> HandlerStatus {
        self.entries.get(&action).copied().unwrap_or_default()
    }

    /// True only for a registered, non-dangling handler.
    pub fn is_active(&self, action: MediaAction) -> bool {
        self.status(action) == HandlerStatus::Registered
    }

    /// Drop every registration.
    pub fn clear(&mut self) -> DirtyFlags {
        self.entries.clear();
        DirtyFlags::POSSIBLE_ACTIONS
    }
}
