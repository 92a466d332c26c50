use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::{CatalogError, TransportState};

/// Maximum number of actions the compact notification view can show.
pub const COMPACT_VIEW_CAPACITY: usize = 3;

bitflags! {
    /// Transport capabilities advertised on the platform session.
    ///
    /// Bit values follow the Android `PlaybackStateCompat` action constants
    /// so a session sink can forward the mask without translation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SessionCapabilities: u64 {
        /// Stop playback.
        const STOP = 1 << 0;
        /// Pause playback.
        const PAUSE = 1 << 1;
        /// Start or resume playback.
        const PLAY = 1 << 2;
        /// Seek backwards by a platform-defined step.
        const REWIND = 1 << 3;
        /// Skip to the previous track.
        const SKIP_TO_PREVIOUS = 1 << 4;
        /// Skip to the next track.
        const SKIP_TO_NEXT = 1 << 5;
        /// Seek forwards by a platform-defined step.
        const FAST_FORWARD = 1 << 6;
        /// Seek to an absolute position.
        const SEEK_TO = 1 << 8;
        /// Toggle between play and pause (media button).
        const PLAY_PAUSE = 1 << 9;
    }
}

impl Default for SessionCapabilities {
    fn default() -> Self {
        Self::empty()
    }
}

/// A transport action an application can handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaAction {
    /// Skip to the previous track
    PreviousTrack,

    /// Seek backwards
    SeekBackward,

    /// Start playback
    Play,

    /// Pause playback
    Pause,

    /// Seek forwards
    SeekForward,

    /// Skip to the next track
    NextTrack,

    /// Seek to an absolute position
    SeekTo,

    /// Stop playback
    Stop,
}

impl MediaAction {
    /// Every known action, in catalog declaration order.
    pub const ALL: [MediaAction; 8] = [
        MediaAction::PreviousTrack,
        MediaAction::SeekBackward,
        MediaAction::Play,
        MediaAction::Pause,
        MediaAction::SeekForward,
        MediaAction::NextTrack,
        MediaAction::SeekTo,
        MediaAction::Stop,
    ];

    /// Wire name used by the application bridge.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PreviousTrack => "previoustrack",
            Self::SeekBackward => "seekbackward",
            Self::Play => "play",
            Self::Pause => "pause",
            Self::SeekForward => "seekforward",
            Self::NextTrack => "nexttrack",
            Self::SeekTo => "seekto",
            Self::Stop => "stop",
        }
    }
}

impl fmt::Display for MediaAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaAction {
    type Err = CatalogError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == name)
            .ok_or_else(|| CatalogError::UnknownAction(name.to_string()))
    }
}

/// How an action is rendered as a notification button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionDisplay {
    /// Button label
    pub label: &'static str,

    /// Platform drawable/icon name
    pub icon: &'static str,
}

/// Static description of one transport action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDescriptor {
    /// Action this entry describes
    pub action: MediaAction,

    /// Bits contributed to the session capability mask
    pub capability: SessionCapabilities,

    /// Whether the action may occupy a compact-view slot
    pub compact_eligible: bool,

    /// Transport state the action is restricted to, if any
    pub state_gate: Option<TransportState>,

    /// Notification button; actions without one only reach the session
    pub display: Option<ActionDisplay>,
}

impl ActionDescriptor {
    /// Whether the gate admits the action under `state`.
    pub fn admits(&self, state: TransportState) -> bool {
        self.state_gate.is_none_or(|gate| gate == state)
    }
}

/// Ordered, immutable set of action descriptors.
///
/// Iteration order is the order in which actions appear in the notification
/// and the order used to fill compact-view slots.
#[derive(Debug, Clone)]
pub struct ActionCatalog {
    descriptors: Vec<ActionDescriptor>,
}

impl ActionCatalog {
    /// Build a catalog from descriptors in the given order.
    ///
    /// # Errors
    /// Returns `CatalogError::Empty` for an empty list and
    /// `CatalogError::DuplicateAction` when an action is described twice.
    pub fn new(descriptors: Vec<ActionDescriptor>) -> Result<Self, CatalogError> {
        if descriptors.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::with_capacity(descriptors.len());
        for descriptor in &descriptors {
            if !seen.insert(descriptor.action) {
                return Err(CatalogError::DuplicateAction(descriptor.action));
            }
        }

        Ok(Self { descriptors })
    }

    /// The platform's default transport catalog.
    ///
    /// `play` is offered only while paused and `pause` only while playing;
    /// `seekto` has no notification button.
    pub fn standard() -> Self {
        let entry = |action,
                     capability,
                     compact_eligible,
                     state_gate,
                     display: Option<(&'static str, &'static str)>| {
            ActionDescriptor {
                action,
                capability,
                compact_eligible,
                state_gate,
                display: display.map(|(label, icon)| ActionDisplay { label, icon }),
            }
        };

        Self {
            descriptors: vec![
                entry(
                    MediaAction::PreviousTrack,
                    SessionCapabilities::SKIP_TO_PREVIOUS,
                    true,
                    None,
                    Some(("Previous track", "ic_baseline_skip_previous_24")),
                ),
                entry(
                    MediaAction::SeekBackward,
                    SessionCapabilities::REWIND,
                    false,
                    None,
                    Some(("Seek backward", "ic_baseline_replay_30_24")),
                ),
                entry(
                    MediaAction::Play,
                    SessionCapabilities::PLAY | SessionCapabilities::PLAY_PAUSE,
                    true,
                    Some(TransportState::Paused),
                    Some(("Play", "ic_baseline_play_arrow_24")),
                ),
                entry(
                    MediaAction::Pause,
                    SessionCapabilities::PAUSE | SessionCapabilities::PLAY_PAUSE,
                    true,
                    Some(TransportState::Playing),
                    Some(("Pause", "ic_baseline_pause_24")),
                ),
                entry(
                    MediaAction::SeekForward,
                    SessionCapabilities::FAST_FORWARD,
                    false,
                    None,
                    Some(("Seek forward", "ic_baseline_forward_30_24")),
                ),
                entry(
                    MediaAction::NextTrack,
                    SessionCapabilities::SKIP_TO_NEXT,
                    true,
                    None,
                    Some(("Next track", "ic_baseline_skip_next_24")),
                ),
                entry(
                    MediaAction::SeekTo,
                    SessionCapabilities::SEEK_TO,
                    false,
                    None,
                    None,
                ),
                entry(
                    MediaAction::Stop,
                    SessionCapabilities::STOP,
                    true,
                    None,
                    Some(("Stop", "ic_baseline_stop_24")),
                ),
            ],
        }
    }

    /// Look up the descriptor for an action.
    pub fn get(&self, action: MediaAction) -> Option<&ActionDescriptor> {
        self.descriptors.iter().find(|d| d.action == action)
    }

    /// Descriptors in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ActionDescriptor> {
        self.descriptors.iter()
    }

    /// Number of described actions.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Always false for a constructed catalog.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for ActionCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_follows_declaration_order() {
        let catalog = ActionCatalog::standard();
        let order: Vec<_> = catalog.iter().map(|d| d.action).collect();

        assert_eq!(order, MediaAction::ALL.to_vec());
    }

    #[test]
    fn only_play_and_pause_are_gated() {
        let catalog = ActionCatalog::standard();

        for descriptor in catalog.iter() {
            match descriptor.action {
                MediaAction::Play => {
                    assert_eq!(descriptor.state_gate, Some(TransportState::Paused))
                }
                MediaAction::Pause => {
                    assert_eq!(descriptor.state_gate, Some(TransportState::Playing))
                }
                _ => assert!(descriptor.state_gate.is_none()),
            }
        }
    }

    #[test]
    fn gate_admits_only_matching_state() {
        let catalog = ActionCatalog::standard();
        let play = catalog.get(MediaAction::Play).unwrap();
        let stop = catalog.get(MediaAction::Stop).unwrap();

        assert!(play.admits(TransportState::Paused));
        assert!(!play.admits(TransportState::Playing));
        assert!(!play.admits(TransportState::None));
        assert!(stop.admits(TransportState::None));
    }

    #[test]
    fn parses_wire_names() {
        assert_eq!("seekto".parse::<MediaAction>().unwrap(), MediaAction::SeekTo);
        assert_eq!(
            "previoustrack".parse::<MediaAction>().unwrap(),
            MediaAction::PreviousTrack
        );
        assert!(matches!(
            "rewind".parse::<MediaAction>(),
            Err(CatalogError::UnknownAction(name)) if name == "rewind"
        ));
    }

    #[test]
    fn rejects_duplicate_descriptors() {
        let stop = ActionCatalog::standard().get(MediaAction::Stop).unwrap().clone();

        let result = ActionCatalog::new(vec![stop.clone(), stop]);

        assert!(matches!(
            result,
            Err(CatalogError::DuplicateAction(MediaAction::Stop))
        ));
        assert!(matches!(ActionCatalog::new(Vec::new()), Err(CatalogError::Empty)));
    }
}
