//! Recording sinks shared by the session unit tests.

use std::sync::{Arc, Mutex};

use super::{
    MetadataUpdate, NotificationSink, NotificationUpdate, PlaybackStateUpdate, SessionSink,
    SinkError,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SinkEvent {
    PlaybackState(PlaybackStateUpdate),
    Metadata(MetadataUpdate),
    CompactView(Vec<usize>),
    Notification(NotificationUpdate),
}

#[derive(Clone, Default)]
pub(crate) struct Recorder {
    events: Arc<Mutex<Vec<SinkEvent>>>,
    failing: Arc<Mutex<bool>>,
}

impl Recorder {
    pub(crate) fn take(&self) -> Vec<SinkEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    pub(crate) fn fail_pushes(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    fn record(&self, event: SinkEvent) -> Result<(), SinkError> {
        if *self.failing.lock().unwrap() {
            return Err(SinkError::Unavailable("recorder offline".to_string()));
        }
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

impl SessionSink for Recorder {
    fn set_playback_state(&mut self, update: &PlaybackStateUpdate) -> Result<(), SinkError> {
        self.record(SinkEvent::PlaybackState(update.clone()))
    }

    fn set_metadata(&mut self, update: &MetadataUpdate) -> Result<(), SinkError> {
        self.record(SinkEvent::Metadata(update.clone()))
    }
}

impl NotificationSink for Recorder {
    fn set_compact_view(&mut self, slots: &[usize]) -> Result<(), SinkError> {
        self.record(SinkEvent::CompactView(slots.to_vec()))
    }

    fn publish(&mut self, update: &NotificationUpdate) -> Result<(), SinkError> {
        self.record(SinkEvent::Notification(update.clone()))
    }
}
