use std::time::Duration;

use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

use super::{
    ActionCatalog, ActionDispatcher, ActionEvent, ArtworkOutcome, ArtworkRequest, ArtworkSource,
    LifecycleDirective, MediaAction, NotificationSink, PlatformCommand, ReconcileReport,
    ReconciliationEngine, SessionError, SessionLifecycle, SessionSink, TransportState,
};
use crate::config::SessionConfig;

/// Version reported to the application bridge.
pub const PLUGIN_VERSION: &str = env!("CARGO_PKG_VERSION");

/// One artwork candidate supplied with metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MediaImage {
    /// Image reference (URL or data URI)
    #[serde(default)]
    pub src: String,

    /// Size hint, e.g. "512x512"
    #[serde(default)]
    pub sizes: Option<String>,

    /// MIME type hint
    #[serde(default, rename = "type")]
    pub mime_type: Option<String>,
}

/// Metadata update from the application; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MetadataOptions {
    /// Track title
    pub title: Option<String>,

    /// Track artist
    pub artist: Option<String>,

    /// Album name
    pub album: Option<String>,

    /// Artwork candidates; the first with a non-empty `src` is used
    pub artwork: Vec<MediaImage>,
}

/// Position update from the application, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PositionStateOptions {
    /// Track duration
    pub duration: Option<f64>,

    /// Playback position
    pub position: Option<f64>,

    /// Playback rate; zero means the default rate
    pub playback_rate: Option<f64>,
}

/// Application-facing media session.
///
/// Every mutating call updates the engine and reconciles immediately.
pub struct MediaSession {
    engine: ReconciliationEngine,
    dispatcher: ActionDispatcher,
    lifecycle: SessionLifecycle,
    artwork_generation: u64,
    pending_artwork: Option<ArtworkRequest>,
}

impl MediaSession {
    /// Create a session with the standard action catalog.
    ///
    /// The receiver yields actions the user triggers from platform controls.
    pub fn new(config: &SessionConfig) -> (Self, mpsc::UnboundedReceiver<ActionEvent>) {
        Self::with_catalog(config, ActionCatalog::standard())
    }

    /// Create a session with a custom action catalog.
    pub fn with_catalog(
        config: &SessionConfig,
        catalog: ActionCatalog,
    ) -> (Self, mpsc::UnboundedReceiver<ActionEvent>) {
        let (dispatcher, receiver) = ActionDispatcher::channel();
        let session = Self {
            engine: ReconciliationEngine::new(catalog),
            dispatcher,
            lifecycle: SessionLifecycle::new(config.foreground_service),
            artwork_generation: 0,
            pending_artwork: None,
        };
        (session, receiver)
    }

    /// Underlying reconciliation engine.
    pub fn engine(&self) -> &ReconciliationEngine {
        &self.engine
    }

    /// Version reported to the application, as `{ "version": ... }` on the wire.
    pub fn plugin_version(&self) -> &'static str {
        PLUGIN_VERSION
    }

    /// Service lifecycle policy.
    pub fn lifecycle(&self) -> SessionLifecycle {
        self.lifecycle
    }

    /// True while transport state is playing or paused.
    pub fn is_playback_active(&self) -> bool {
        self.engine.is_playback_active()
    }

    /// Apply a metadata update.
    ///
    /// An artwork reference is not resolved here; it is queued for
    /// [`take_artwork_request`](Self::take_artwork_request).
    ///
    /// # Errors
    /// Returns `SessionError::Sink` if a platform push fails.
    #[instrument(skip(self))]
    pub fn set_metadata(&mut self, options: MetadataOptions) -> Result<ReconcileReport, SessionError> {
        if let Some(title) = options.title {
            self.engine.set_title(title);
        }
        if let Some(artist) = options.artist {
            self.engine.set_artist(artist);
        }
        if let Some(album) = options.album {
            self.engine.set_album(album);
        }

        if let Some(source) = options
            .artwork
            .iter()
            .find_map(|image| ArtworkSource::parse(&image.src))
        {
            self.artwork_generation += 1;
            debug!(generation = self.artwork_generation, ?source, "artwork requested");
            self.pending_artwork = Some(ArtworkRequest {
                generation: self.artwork_generation,
                source,
            });
        }

        self.engine.reconcile()
    }

    /// Take the artwork reference queued by the last metadata update.
    pub fn take_artwork_request(&mut self) -> Option<ArtworkRequest> {
        self.pending_artwork.take()
    }

    /// Apply a finished artwork resolution.
    ///
    /// Outcomes from superseded requests and failed resolutions leave the
    /// current artwork untouched.
    ///
    /// # Errors
    /// Returns `SessionError::Sink` if a platform push fails.
    #[instrument(skip(self, outcome), fields(generation = outcome.generation))]
    pub fn complete_artwork(&mut self, outcome: ArtworkOutcome) -> Result<ReconcileReport, SessionError> {
        if outcome.generation != self.artwork_generation {
            debug!(latest = self.artwork_generation, "discarding superseded artwork");
            return Ok(ReconcileReport::default());
        }

        match outcome.result {
            Ok(artwork) => {
                self.engine.set_artwork(Some(artwork));
                self.engine.reconcile()
            }
            Err(e) => {
                debug!(error = %e, "keeping previous artwork");
                Ok(ReconcileReport::default())
            }
        }
    }

    /// Apply a transport state reported as "playing", "paused" or anything else.
    ///
    /// Returns what the host shell should do with the platform service.
    ///
    /// # Errors
    /// Returns `SessionError::Sink` if a platform push fails.
    #[instrument(skip(self))]
    pub fn set_playback_state(&mut self, state: &str) -> Result<LifecycleDirective, SessionError> {
        let state = TransportState::from(state);
        self.engine.set_transport_state(state);

        let directive = self
            .lifecycle
            .on_playback_state(self.engine.has_session_sink(), self.is_playback_active());
        if directive != LifecycleDirective::Update {
            info!(%state, ?directive, "playback state changes service lifecycle");
        }

        self.engine.reconcile()?;
        Ok(directive)
    }

    /// Apply a position update; absent fields are left unchanged.
    ///
    /// # Errors
    /// Returns `SessionError::Sink` if a platform push fails.
    #[instrument(skip(self))]
    pub fn set_position_state(
        &mut self,
        options: PositionStateOptions,
    ) -> Result<ReconcileReport, SessionError> {
        if let Some(duration) = options.duration {
            self.engine.set_duration(seconds_to_duration(duration));
        }
        if let Some(position) = options.position {
            self.engine.set_position(seconds_to_duration(position));
        }
        if let Some(rate) = options.playback_rate {
            self.engine.set_playback_rate(rate);
        }
        self.engine.reconcile()
    }

    /// Register a handler for the named action.
    ///
    /// # Errors
    /// Returns `SessionError::Catalog` for an unknown action name and
    /// `SessionError::Sink` if a platform push fails.
    #[instrument(skip(self))]
    pub fn set_action_handler(&mut self, action: &str) -> Result<ReconcileReport, SessionError> {
        let action: MediaAction = action.parse()?;
        self.engine.register(action);
        self.engine.reconcile()
    }

    /// Remove the handler for the named action.
    ///
    /// # Errors
    /// Returns `SessionError::Catalog` for an unknown action name and
    /// `SessionError::Sink` if a platform push fails.
    #[instrument(skip(self))]
    pub fn clear_action_handler(&mut self, action: &str) -> Result<ReconcileReport, SessionError> {
        let action: MediaAction = action.parse()?;
        self.engine.unregister(action);
        self.engine.reconcile()
    }

    /// Mark the named handler's channel to the application as closed.
    ///
    /// # Errors
    /// Returns `SessionError::Catalog` for an unknown action name and
    /// `SessionError::Sink` if a platform push fails.
    #[instrument(skip(self))]
    pub fn invalidate_action_handler(&mut self, action: &str) -> Result<ReconcileReport, SessionError> {
        let action: MediaAction = action.parse()?;
        self.engine.invalidate(action);
        self.engine.reconcile()
    }

    /// Forward a platform transport command to the application.
    ///
    /// Returns whether a live handler received it.
    pub fn handle_platform_command(&self, command: PlatformCommand) -> bool {
        self.action_occurred(command.into_event())
    }

    /// Deliver an action event if a live handler exists; otherwise drop it.
    pub fn action_occurred(&self, event: ActionEvent) -> bool {
        self.dispatcher.action_occurred(self.engine.registry(), event)
    }

    /// Attach a freshly constructed platform session.
    pub fn attach_session_sink(&mut self, sink: Box<dyn SessionSink>) {
        self.engine.attach_session_sink(sink);
    }

    /// Attach a freshly constructed platform notification.
    pub fn attach_notification_sink(&mut self, sink: Box<dyn NotificationSink>) {
        self.engine.attach_notification_sink(sink);
    }

    /// Drop platform sinks after the service stopped.
    pub fn detach_sinks(&mut self) {
        self.engine.detach_sinks();
    }

    /// Whether the service should be stopped now that the host is in the background.
    pub fn on_host_stopped(&self) -> bool {
        self.lifecycle
            .stop_on_host_stopped(self.engine.has_session_sink(), self.is_playback_active())
    }

    /// Push any stale state, e.g. right after attaching sinks.
    ///
    /// # Errors
    /// Returns `SessionError::Sink` if a platform push fails.
    pub fn reconcile(&mut self) -> Result<ReconcileReport, SessionError> {
        self.engine.reconcile()
    }

    /// Forget all playback state and handlers for a new session.
    pub fn reset(&mut self) {
        self.engine.reset();
        self.pending_artwork = None;
        self.artwork_generation += 1;
    }
}

fn seconds_to_duration(seconds: f64) -> Duration {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_millis((seconds * 1000.0).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::{Recorder, SinkEvent};
    use crate::session::{Artwork, ArtworkError, CatalogError, SEEK_TIME_KEY};

    fn attached_session() -> (MediaSession, mpsc::UnboundedReceiver<ActionEvent>, Recorder) {
        let (mut session, receiver) = MediaSession::new(&SessionConfig::default());
        let recorder = Recorder::default();
        session.attach_session_sink(Box::new(recorder.clone()));
        session.attach_notification_sink(Box::new(recorder.clone()));
        session.reconcile().unwrap();
        recorder.take();
        (session, receiver, recorder)
    }

    #[test]
    fn reports_crate_version() {
        let (session, _actions) = MediaSession::new(&SessionConfig::default());

        assert_eq!(session.plugin_version(), env!("CARGO_PKG_VERSION"));
        assert!(!session.plugin_version().is_empty());
    }

    #[test]
    fn converts_seconds_with_rounding() {
        assert_eq!(seconds_to_duration(1.2345), Duration::from_millis(1235));
        assert_eq!(seconds_to_duration(-4.0), Duration::ZERO);
        assert_eq!(seconds_to_duration(f64::NAN), Duration::ZERO);
    }

    #[test]
    fn metadata_keeps_absent_fields() {
        let (mut session, _rx, _recorder) = attached_session();
        session
            .set_metadata(MetadataOptions {
                title: Some("Title".to_string()),
                artist: Some("Artist".to_string()),
                ..MetadataOptions::default()
            })
            .unwrap();

        session
            .set_metadata(MetadataOptions {
                title: Some("Other".to_string()),
                ..MetadataOptions::default()
            })
            .unwrap();

        let model = session.engine().model();
        assert_eq!(model.title(), "Other");
        assert_eq!(model.artist(), "Artist");
        assert!(session.take_artwork_request().is_none());
    }

    #[test]
    fn unknown_transport_state_becomes_none() {
        let (mut session, _rx, _recorder) = attached_session();
        session.set_playback_state("playing").unwrap();

        session.set_playback_state("buffering").unwrap();

        assert_eq!(session.engine().model().transport_state(), TransportState::None);
        assert!(!session.is_playback_active());
    }

    #[test]
    fn lazy_session_requests_service_start_and_stop() {
        let (mut session, _rx) = MediaSession::new(&SessionConfig::default());

        assert_eq!(session.set_playback_state("paused").unwrap(), LifecycleDirective::Start);

        session.attach_session_sink(Box::new(Recorder::default()));
        assert_eq!(session.set_playback_state("playing").unwrap(), LifecycleDirective::Update);
        assert_eq!(session.set_playback_state("none").unwrap(), LifecycleDirective::Stop);
        assert!(session.on_host_stopped());
    }

    #[test]
    fn unknown_action_name_is_rejected() {
        let (mut session, _rx, _recorder) = attached_session();

        let result = session.set_action_handler("shuffle");

        assert!(matches!(
            result,
            Err(SessionError::Catalog(CatalogError::UnknownAction(name))) if name == "shuffle"
        ));
    }

    #[test]
    fn position_state_normalizes_zero_rate() {
        let (mut session, _rx, recorder) = attached_session();

        session
            .set_position_state(PositionStateOptions {
                duration: Some(180.0),
                position: Some(12.5),
                playback_rate: Some(0.0),
            })
            .unwrap();

        let model = session.engine().model();
        assert_eq!(model.duration(), Duration::from_secs(180));
        assert_eq!(model.position(), Duration::from_millis(12_500));
        assert_eq!(model.playback_rate(), 1.0);
        let events = recorder.take();
        assert!(events.iter().any(|e| matches!(
            e,
            SinkEvent::PlaybackState(state) if state.position == Duration::from_millis(12_500)
        )));
    }

    #[test]
    fn platform_seek_reaches_live_handler() {
        let (mut session, mut rx, _recorder) = attached_session();
        session.set_action_handler("seekto").unwrap();

        assert!(session.handle_platform_command(PlatformCommand::SeekTo(Duration::from_secs(42))));
        assert!(!session.handle_platform_command(PlatformCommand::Stop));

        let event = rx.try_recv().unwrap();
        assert_eq!(event.action, MediaAction::SeekTo);
        assert_eq!(event.extras[SEEK_TIME_KEY], 42.0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn invalidated_handler_drops_platform_events() {
        let (mut session, mut rx, _recorder) = attached_session();
        session.set_action_handler("nexttrack").unwrap();
        session.invalidate_action_handler("nexttrack").unwrap();

        assert!(!session.handle_platform_command(PlatformCommand::SkipToNext));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn artwork_last_writer_wins() {
        let (mut session, _rx, recorder) = attached_session();
        let image = |src: &str| MediaImage {
            src: src.to_string(),
            ..MediaImage::default()
        };
        session
            .set_metadata(MetadataOptions {
                artwork: vec![image("https://example.com/a.jpg")],
                ..MetadataOptions::default()
            })
            .unwrap();
        let first = session.take_artwork_request().unwrap();
        session
            .set_metadata(MetadataOptions {
                artwork: vec![image(""), image("https://example.com/b.jpg")],
                ..MetadataOptions::default()
            })
            .unwrap();
        let second = session.take_artwork_request().unwrap();
        recorder.take();

        let stale = session
            .complete_artwork(ArtworkOutcome {
                generation: first.generation,
                result: Ok(Artwork::new(vec![1u8], None)),
            })
            .unwrap();
        assert_eq!(stale.push_count(), 0);
        assert!(session.engine().model().artwork().is_none());

        session
            .complete_artwork(ArtworkOutcome {
                generation: second.generation,
                result: Ok(Artwork::new(vec![2u8], None)),
            })
            .unwrap();
        assert_eq!(session.engine().model().artwork().unwrap().bytes(), &[2]);
        assert!(recorder.take().iter().any(|e| matches!(e, SinkEvent::Metadata(_))));
    }

    #[test]
    fn failed_artwork_keeps_previous_image() {
        let (mut session, _rx, _recorder) = attached_session();
        let request = |session: &mut MediaSession, src: &str| {
            session
                .set_metadata(MetadataOptions {
                    artwork: vec![MediaImage {
                        src: src.to_string(),
                        ..MediaImage::default()
                    }],
                    ..MetadataOptions::default()
                })
                .unwrap();
            session.take_artwork_request().unwrap()
        };

        let ok = request(&mut session, "data:image/png;base64,AQ==");
        session
            .complete_artwork(ArtworkOutcome {
                generation: ok.generation,
                result: Ok(Artwork::new(vec![1u8], None)),
            })
            .unwrap();
        let failing = request(&mut session, "blob:xyz");
        session
            .complete_artwork(ArtworkOutcome {
                generation: failing.generation,
                result: Err(ArtworkError::UnsupportedScheme("blob:xyz".to_string())),
            })
            .unwrap();

        assert_eq!(session.engine().model().artwork().unwrap().bytes(), &[1]);
    }
}
