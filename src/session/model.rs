use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::DirtyFlags;

/// Transport state reported by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportState {
    /// Nothing loaded, or state unknown
    #[default]
    None,

    /// Media is playing
    Playing,

    /// Media is paused
    Paused,
}

impl From<&str> for TransportState {
    fn from(state: &str) -> Self {
        match state {
            "playing" => Self::Playing,
            "paused" => Self::Paused,
            _ => Self::None,
        }
    }
}

impl From<TransportState> for &'static str {
    fn from(state: TransportState) -> Self {
        match state {
            TransportState::None => "none",
            TransportState::Playing => "playing",
            TransportState::Paused => "paused",
        }
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str((*self).into())
    }
}

/// Encoded artwork image handed to the platform.
///
/// Cloning shares the underlying buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Artwork {
    bytes: Arc<[u8]>,
    mime_type: Option<String>,
}

impl Artwork {
    /// Wrap encoded image bytes.
    pub fn new(bytes: impl Into<Arc<[u8]>>, mime_type: Option<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type,
        }
    }

    /// Encoded image data.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// MIME type, when the source declared one.
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }
}

impl fmt::Debug for Artwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artwork")
            .field("len", &self.bytes.len())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

/// Playback rate reported when the application gives zero.
pub const DEFAULT_PLAYBACK_RATE: f64 = 1.0;

/// Application-owned playback state read by the reconciliation engine.
///
/// Every setter compares against the stored value and returns the dirty
/// flags to raise; an unchanged value returns `DirtyFlags::empty()`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackModel {
    transport_state: TransportState,
    title: String,
    artist: String,
    album: String,
    artwork: Option<Artwork>,
    duration: Duration,
    position: Duration,
    playback_rate: f64,
}

impl Default for PlaybackModel {
    fn default() -> Self {
        Self {
            transport_state: TransportState::None,
            title: String::new(),
            artist: String::new(),
            album: String::new(),
            artwork: None,
            duration: Duration::ZERO,
            position: Duration::ZERO,
            playback_rate: DEFAULT_PLAYBACK_RATE,
        }
    }
}

impl PlaybackModel {
    /// Current transport state.
    pub fn transport_state(&self) -> TransportState {
        self.transport_state
    }

    /// Track title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Track artist.
    pub fn artist(&self) -> &str {
        &self.artist
    }

    /// Album name.
    pub fn album(&self) -> &str {
        &self.album
    }

    /// Current artwork, if any.
    pub fn artwork(&self) -> Option<&Artwork> {
        self.artwork.as_ref()
    }

    /// Track duration.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Playback position.
    pub fn position(&self) -> Duration {
        self.position
    }

    /// Playback rate; never zero.
    pub fn playback_rate(&self) -> f64 {
        self.playback_rate
    }

    /// True while something is loaded, playing or paused.
    pub fn is_playback_active(&self) -> bool {
        matches!(
            self.transport_state,
            TransportState::Playing | TransportState::Paused
        )
    }

    /// Set the transport state.
    pub fn set_transport_state(&mut self, state: TransportState) -> DirtyFlags {
        replace_if_changed(&mut self.transport_state, state, DirtyFlags::TRANSPORT)
    }

    /// Set the track title.
    pub fn set_title(&mut self, title: impl Into<String>) -> DirtyFlags {
        replace_if_changed(&mut self.title, title.into(), DirtyFlags::TRACK)
    }

    /// Set the track artist.
    pub fn set_artist(&mut self, artist: impl Into<String>) -> DirtyFlags {
        replace_if_changed(&mut self.artist, artist.into(), DirtyFlags::TRACK)
    }

    /// Set the album name.
    pub fn set_album(&mut self, album: impl Into<String>) -> DirtyFlags {
        replace_if_changed(&mut self.album, album.into(), DirtyFlags::TRACK)
    }

    /// Replace or clear the artwork.
    pub fn set_artwork(&mut self, artwork: Option<Artwork>) -> DirtyFlags {
        replace_if_changed(&mut self.artwork, artwork, DirtyFlags::TRACK)
    }

    /// Set the track duration.
    pub fn set_duration(&mut self, duration: Duration) -> DirtyFlags {
        replace_if_changed(&mut self.duration, duration, DirtyFlags::TRACK)
    }

    /// Set the playback position.
    pub fn set_position(&mut self, position: Duration) -> DirtyFlags {
        replace_if_changed(&mut self.position, position, DirtyFlags::PLAYBACK_STATE)
    }

    /// Set the playback rate. Zero and non-finite rates mean "default".
    pub fn set_playback_rate(&mut self, rate: f64) -> DirtyFlags {
        let rate = if rate == 0.0 || !rate.is_finite() {
            DEFAULT_PLAYBACK_RATE
        } else {
            rate
        };
        replace_if_changed(&mut self.playback_rate, rate, DirtyFlags::PLAYBACK_STATE)
    }
}

fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T, flags: DirtyFlags) -> DirtyFlags {
    if *slot == value {
        return DirtyFlags::empty();
    }
    *slot = value;
    flags
}
