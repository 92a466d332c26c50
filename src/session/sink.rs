use std::time::Duration;

use serde::Serialize;

use super::{
    ActionDisplay, Artwork, MediaAction, SessionCapabilities, SinkError, TransportState,
};

/// Playback state pushed to the platform session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackStateUpdate {
    /// Enabled transport capabilities
    #[serde(serialize_with = "serialize_capabilities")]
    pub capabilities: SessionCapabilities,

    /// Current transport state
    pub transport_state: TransportState,

    /// Playback position
    pub position: Duration,

    /// Playback rate
    pub playback_rate: f64,
}

/// Track metadata pushed to the platform session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataUpdate {
    /// Track title
    pub title: String,

    /// Track artist
    pub artist: String,

    /// Album name
    pub album: String,

    /// Album artwork
    #[serde(skip)]
    pub artwork: Option<Artwork>,

    /// Track duration
    pub duration: Duration,
}

/// One button of the rendered notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationAction {
    /// Action triggered by the button
    pub action: MediaAction,

    /// Label and icon
    pub display: ActionDisplay,
}

/// Notification content pushed after the compact view is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationUpdate {
    /// Buttons, in catalog order
    pub actions: Vec<NotificationAction>,

    /// Content title
    pub title: String,

    /// Content text, "artist - album"
    pub subtitle: String,

    /// Large icon
    #[serde(skip)]
    pub artwork: Option<Artwork>,
}

/// Platform media session (lock screen, hardware media keys).
pub trait SessionSink {
    /// Replace the session playback state.
    ///
    /// # Errors
    /// Returns `SinkError` if the platform object cannot accept the update.
    fn set_playback_state(&mut self, update: &PlaybackStateUpdate) -> Result<(), SinkError>;

    /// Replace the session metadata.
    ///
    /// # Errors
    /// Returns `SinkError` if the platform object cannot accept the update.
    fn set_metadata(&mut self, update: &MetadataUpdate) -> Result<(), SinkError>;
}

/// Platform media notification.
pub trait NotificationSink {
    /// Select which notification buttons appear in the compact view.
    ///
    /// An empty slice is an explicit request to show none.
    ///
    /// # Errors
    /// Returns `SinkError` if the platform object cannot accept the update.
    fn set_compact_view(&mut self, slots: &[usize]) -> Result<(), SinkError>;

    /// Rebuild and post the notification.
    ///
    /// # Errors
    /// Returns `SinkError` if the platform object cannot accept the update.
    fn publish(&mut self, update: &NotificationUpdate) -> Result<(), SinkError>;
}

fn serialize_capabilities<S: serde::Serializer>(
    capabilities: &SessionCapabilities,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(capabilities.bits())
}
