use std::time::Duration;

use tracing::{debug, instrument, trace, warn};

use super::{
    ActionCatalog, Artwork, COMPACT_VIEW_CAPACITY, DirtyFlags, HandlerRegistry, HandlerStatus,
    MediaAction, MetadataUpdate, NotificationAction, NotificationSink, NotificationUpdate,
    PlaybackModel, PlaybackStateUpdate, SessionCapabilities, SessionError, SessionSink, SinkStage,
    TransportState,
};

/// Output of the action-set stage. Recomputed from scratch every time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedState {
    /// Active actions in catalog order
    pub active_actions: Vec<MediaAction>,

    /// OR of the capabilities of every active action
    pub capabilities: SessionCapabilities,

    /// Active actions that have a notification button, in catalog order
    pub notification_actions: Vec<MediaAction>,

    /// Indices into `notification_actions` shown in the compact view
    pub compact_view_slots: Vec<usize>,
}

impl DerivedState {
    fn compute(
        catalog: &ActionCatalog,
        registry: &HandlerRegistry,
        state: TransportState,
    ) -> Self {
        let mut derived = Self::default();

        for descriptor in catalog.iter() {
            if !registry.is_active(descriptor.action) || !descriptor.admits(state) {
                continue;
            }

            derived.active_actions.push(descriptor.action);
            derived.capabilities |= descriptor.capability;

            if descriptor.display.is_some() {
                let index = derived.notification_actions.len();
                derived.notification_actions.push(descriptor.action);
                if descriptor.compact_eligible
                    && derived.compact_view_slots.len() < COMPACT_VIEW_CAPACITY
                {
                    derived.compact_view_slots.push(index);
                }
            }
        }

        derived
    }
}

/// What a single `reconcile()` call pushed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Stages that reached a sink
    pub pushed: DirtyFlags,

    /// Stages held back because no sink is attached
    pub deferred: DirtyFlags,
}

impl ReconcileReport {
    /// Number of sink pushes performed.
    pub fn push_count(&self) -> u32 {
        self.pushed.bits().count_ones()
    }
}

/// Reconciles playback state and handler registrations into platform updates.
///
/// All mutation goes through the engine so it can accumulate dirty flags;
/// `reconcile()` then pushes only what changed, in a fixed order.
pub struct ReconciliationEngine {
    catalog: ActionCatalog,
    registry: HandlerRegistry,
    model: PlaybackModel,
    dirty: DirtyFlags,
    derived: DerivedState,
    session_sink: Option<Box<dyn SessionSink>>,
    notification_sink: Option<Box<dyn NotificationSink>>,
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self::new(ActionCatalog::standard())
    }
}

impl ReconciliationEngine {
    /// Create an engine with no handlers and default playback state.
    pub fn new(catalog: ActionCatalog) -> Self {
        Self {
            catalog,
            registry: HandlerRegistry::default(),
            model: PlaybackModel::default(),
            dirty: DirtyFlags::POSSIBLE_ACTIONS,
            derived: DerivedState::default(),
            session_sink: None,
            notification_sink: None,
        }
    }

    /// Action catalog in use.
    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    /// Current playback model.
    pub fn model(&self) -> &PlaybackModel {
        &self.model
    }

    /// Handler registrations, read-only.
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Result of the most recent action-set computation.
    pub fn derived(&self) -> &DerivedState {
        &self.derived
    }

    /// Outstanding dirty flags.
    pub fn dirty(&self) -> DirtyFlags {
        self.dirty
    }

    /// Whether a handler for `action` is live.
    pub fn is_active(&self, action: MediaAction) -> bool {
        self.registry.is_active(action)
    }

    /// Registration status of `action`.
    pub fn handler_status(&self, action: MediaAction) -> HandlerStatus {
        self.registry.status(action)
    }

    /// True while transport state is playing or paused.
    pub fn is_playback_active(&self) -> bool {
        self.model.is_playback_active()
    }

    /// Register a handler for `action`.
    pub fn register(&mut self, action: MediaAction) {
        self.dirty |= self.registry.register(action);
    }

    /// Remove the handler for `action`.
    pub fn unregister(&mut self, action: MediaAction) {
        self.dirty |= self.registry.unregister(action);
    }

    /// Mark the handler for `action` as dangling.
    pub fn invalidate(&mut self, action: MediaAction) {
        self.dirty |= self.registry.invalidate(action);
    }

    /// Set the transport state.
    pub fn set_transport_state(&mut self, state: TransportState) {
        self.dirty |= self.model.set_transport_state(state);
    }

    /// Set the track title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.dirty |= self.model.set_title(title);
    }

    /// Set the track artist.
    pub fn set_artist(&mut self, artist: impl Into<String>) {
        self.dirty |= self.model.set_artist(artist);
    }

    /// Set the album name.
    pub fn set_album(&mut self, album: impl Into<String>) {
        self.dirty |= self.model.set_album(album);
    }

    /// Replace or clear the artwork.
    pub fn set_artwork(&mut self, artwork: Option<Artwork>) {
        self.dirty |= self.model.set_artwork(artwork);
    }

    /// Set the track duration.
    pub fn set_duration(&mut self, duration: Duration) {
        self.dirty |= self.model.set_duration(duration);
    }

    /// Set the playback position.
    pub fn set_position(&mut self, position: Duration) {
        self.dirty |= self.model.set_position(position);
    }

    /// Set the playback rate; zero means the default rate.
    pub fn set_playback_rate(&mut self, rate: f64) {
        self.dirty |= self.model.set_playback_rate(rate);
    }

    /// Attach the platform session. Everything is re-pushed on next reconcile.
    pub fn attach_session_sink(&mut self, sink: Box<dyn SessionSink>) {
        self.session_sink = Some(sink);
        self.dirty |= DirtyFlags::all();
    }

    /// Attach the platform notification. Everything is re-pushed on next reconcile.
    pub fn attach_notification_sink(&mut self, sink: Box<dyn NotificationSink>) {
        self.notification_sink = Some(sink);
        self.dirty |= DirtyFlags::all();
    }

    /// Drop both platform sinks.
    pub fn detach_sinks(&mut self) {
        self.session_sink = None;
        self.notification_sink = None;
    }

    /// Whether a session sink is attached.
    pub fn has_session_sink(&self) -> bool {
        self.session_sink.is_some()
    }

    /// Reset playback state and handlers for a new session; sinks stay attached.
    pub fn reset(&mut self) {
        self.model = PlaybackModel::default();
        self.registry = HandlerRegistry::default();
        self.derived = DerivedState::default();
        self.dirty = DirtyFlags::all();
    }

    /// Push every stale artifact to the attached sinks.
    ///
    /// Stages run in a fixed order: action set, playback state, metadata,
    /// notification. A stage's flag is cleared before its push, so a failing
    /// sink loses that update instead of receiving it twice. A failure does
    /// not stop later stages. Stages whose sink is detached keep their flag.
    ///
    /// # Errors
    /// Returns the first `SessionError::Sink` once every stage has run.
    #[instrument(skip(self), fields(dirty = ?self.dirty))]
    pub fn reconcile(&mut self) -> Result<ReconcileReport, SessionError> {
        let mut report = ReconcileReport::default();

        if self.dirty.take(DirtyFlags::POSSIBLE_ACTIONS) {
            self.derived = DerivedState::compute(
                &self.catalog,
                &self.registry,
                self.model.transport_state(),
            );
            debug!(
                actions = ?self.derived.active_actions,
                capabilities = self.derived.capabilities.bits(),
                compact = ?self.derived.compact_view_slots,
                "recomputed possible actions"
            );
            self.dirty |= DirtyFlags::PLAYBACK_STATE | DirtyFlags::NOTIFICATION;
        }

        let results = [
            self.push_playback_state(&mut report),
            self.push_metadata(&mut report),
            self.push_notification(&mut report),
        ];

        let mut first_error = None;
        for result in results {
            if let Err(error) = result {
                warn!(%error, "sink push failed");
                first_error.get_or_insert(error);
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(report),
        }
    }

    fn push_playback_state(&mut self, report: &mut ReconcileReport) -> Result<(), SessionError> {
        if !self.dirty.contains(DirtyFlags::PLAYBACK_STATE) {
            return Ok(());
        }
        let Some(sink) = self.session_sink.as_mut() else {
            report.deferred |= DirtyFlags::PLAYBACK_STATE;
            return Ok(());
        };
        self.dirty.remove(DirtyFlags::PLAYBACK_STATE);

        let update = PlaybackStateUpdate {
            capabilities: self.derived.capabilities,
            transport_state: self.model.transport_state(),
            position: self.model.position(),
            playback_rate: self.model.playback_rate(),
        };
        trace!(?update, "pushing playback state");
        sink.set_playback_state(&update)
            .map_err(|source| SessionError::Sink {
                stage: SinkStage::PlaybackState,
                source,
            })?;
        report.pushed |= DirtyFlags::PLAYBACK_STATE;
        Ok(())
    }

    fn push_metadata(&mut self, report: &mut ReconcileReport) -> Result<(), SessionError> {
        if !self.dirty.contains(DirtyFlags::METADATA) {
            return Ok(());
        }
        let Some(sink) = self.session_sink.as_mut() else {
            report.deferred |= DirtyFlags::METADATA;
            return Ok(());
        };
        self.dirty.remove(DirtyFlags::METADATA);

        let update = MetadataUpdate {
            title: self.model.title().to_string(),
            artist: self.model.artist().to_string(),
            album: self.model.album().to_string(),
            artwork: self.model.artwork().cloned(),
            duration: self.model.duration(),
        };
        trace!(?update, "pushing metadata");
        sink.set_metadata(&update).map_err(|source| SessionError::Sink {
            stage: SinkStage::Metadata,
            source,
        })?;
        report.pushed |= DirtyFlags::METADATA;
        Ok(())
    }

    fn push_notification(&mut self, report: &mut ReconcileReport) -> Result<(), SessionError> {
        if !self.dirty.contains(DirtyFlags::NOTIFICATION) {
            return Ok(());
        }
        let Some(sink) = self.notification_sink.as_mut() else {
            report.deferred |= DirtyFlags::NOTIFICATION;
            return Ok(());
        };
        self.dirty.remove(DirtyFlags::NOTIFICATION);

        let actions = self
            .derived
            .notification_actions
            .iter()
            .filter_map(|&action| {
                let display = self.catalog.get(action)?.display.clone()?;
                Some(NotificationAction { action, display })
            })
            .collect();
        let update = NotificationUpdate {
            actions,
            title: self.model.title().to_string(),
            subtitle: format!("{} - {}", self.model.artist(), self.model.album()),
            artwork: self.model.artwork().cloned(),
        };
        let map_err = |source| SessionError::Sink {
            stage: SinkStage::Notification,
            source,
        };

        trace!(slots = ?self.derived.compact_view_slots, "setting compact view");
        sink.set_compact_view(&self.derived.compact_view_slots)
            .map_err(map_err)?;
        trace!(?update, "publishing notification");
        sink.publish(&update).map_err(map_err)?;
        report.pushed |= DirtyFlags::NOTIFICATION;
        Ok(())
    }
}
