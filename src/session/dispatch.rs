use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{HandlerRegistry, MediaAction};

/// Key carrying the absolute seek target, in seconds.
pub const SEEK_TIME_KEY: &str = "seekTime";

/// A transport action delivered back to the application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionEvent {
    /// Triggered action
    pub action: MediaAction,

    /// Action details, e.g. `seekTime`
    pub extras: BTreeMap<String, Value>,
}

/// Transport command raised by the platform (media buttons, lock screen).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlatformCommand {
    /// Play button
    Play,

    /// Pause button
    Pause,

    /// Rewind button
    Rewind,

    /// Fast-forward button
    FastForward,

    /// Previous-track button
    SkipToPrevious,

    /// Next-track button
    SkipToNext,

    /// Scrubber moved to an absolute position
    SeekTo(Duration),

    /// Stop button
    Stop,
}

impl PlatformCommand {
    /// Action and details the command maps to.
    pub fn into_event(self) -> ActionEvent {
        let mut extras = BTreeMap::new();
        let action = match self {
            Self::Play => MediaAction::Play,
            Self::Pause => MediaAction::Pause,
            Self::Rewind => MediaAction::SeekBackward,
            Self::FastForward => MediaAction::SeekForward,
            Self::SkipToPrevious => MediaAction::PreviousTrack,
            Self::SkipToNext => MediaAction::NextTrack,
            Self::SeekTo(position) => {
                extras.insert(SEEK_TIME_KEY.to_string(), Value::from(position.as_secs_f64()));
                MediaAction::SeekTo
            }
            Self::Stop => MediaAction::Stop,
        };
        ActionEvent { action, extras }
    }
}

/// Delivers triggered actions to the application without waiting on it.
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    sender: mpsc::UnboundedSender<ActionEvent>,
}

impl ActionDispatcher {
    /// Create a dispatcher and the receiver the application listens on.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ActionEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Deliver `event` if a live handler exists for its action.
    ///
    /// Events without a live handler are dropped, never queued. Returns
    /// whether the event was handed to the channel.
    pub fn action_occurred(&self, registry: &HandlerRegistry, event: ActionEvent) -> bool {
        if !registry.is_active(event.action) {
            debug!(action = %event.action, "no handler for action, dropping");
            return false;
        }

        let action = event.action;
        if self.sender.send(event).is_err() {
            warn!(%action, "action receiver closed, dropping");
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seek_command_carries_seek_time_in_seconds() {
        let event = PlatformCommand::SeekTo(Duration::from_millis(12_500)).into_event();

        assert_eq!(event.action, MediaAction::SeekTo);
        assert_eq!(event.extras.get(SEEK_TIME_KEY), Some(&Value::from(12.5)));
    }

    #[test]
    fn rewind_maps_to_seek_backward() {
        let event = PlatformCommand::Rewind.into_event();

        assert_eq!(event.action, MediaAction::SeekBackward);
        assert!(event.extras.is_empty());
    }

    #[test]
    fn delivers_only_to_live_handlers() {
        let (dispatcher, mut receiver) = ActionDispatcher::channel();
        let mut registry = HandlerRegistry::default();
        registry.register(MediaAction::NextTrack);
        registry.register(MediaAction::Stop);
        registry.invalidate(MediaAction::Stop);

        assert!(dispatcher.action_occurred(&registry, PlatformCommand::SkipToNext.into_event()));
        assert!(!dispatcher.action_occurred(&registry, PlatformCommand::Stop.into_event()));
        assert!(!dispatcher.action_occurred(&registry, PlatformCommand::Play.into_event()));

        assert_eq!(receiver.try_recv().unwrap().action, MediaAction::NextTrack);
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn closed_receiver_drops_event() {
        let (dispatcher, receiver) = ActionDispatcher::channel();
        drop(receiver);
        let mut registry = HandlerRegistry::default();
        registry.register(MediaAction::Play);

        assert!(!dispatcher.action_occurred(&registry, PlatformCommand::Play.into_event()));
    }
}
