use std::{
    fs,
    path::Path,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tracing::{error, info, instrument, warn};

use crate::{
    MediaSessionError, Result,
    config::Config,
    session::{
        ActionEvent, ArtworkResolver, LifecycleDirective, MediaSession, MetadataOptions,
        MetadataUpdate, NotificationSink, NotificationUpdate, PlatformCommand,
        PlaybackStateUpdate, PositionStateOptions, SessionError, SessionSink, SinkError,
        resolve_request,
    },
};

/// Platform command named in a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandName {
    /// Play button
    Play,
    /// Pause button
    Pause,
    /// Rewind button
    Rewind,
    /// Fast-forward button
    FastForward,
    /// Previous-track button
    Previous,
    /// Next-track button
    Next,
    /// Seek to `seek_time`
    SeekTo,
    /// Stop button
    Stop,
}

/// One scripted bridge call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum Step {
    /// `set_metadata`
    SetMetadata(MetadataOptions),
    /// `set_playback_state`
    SetPlaybackState {
        /// "playing", "paused" or anything else
        state: String,
    },
    /// `set_position_state`
    SetPositionState(PositionStateOptions),
    /// `set_action_handler`
    SetActionHandler {
        /// Action name
        action: String,
    },
    /// `clear_action_handler`
    ClearActionHandler {
        /// Action name
        action: String,
    },
    /// `invalidate_action_handler`
    InvalidateActionHandler {
        /// Action name
        action: String,
    },
    /// A platform transport command
    PlatformCommand {
        /// Which control was used
        command: CommandName,
        /// Seek target in seconds, for `seekto`
        #[serde(default)]
        seek_time: f64,
    },
    /// Host application moved to the background
    HostStopped,
}

/// Scripted sequence of bridge calls.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Scenario {
    /// Steps in execution order
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Read a scenario from a TOML file.
    ///
    /// # Errors
    /// Returns `MediaSessionError::Scenario` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| MediaSessionError::Scenario {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| MediaSessionError::Scenario {
            path: path.to_path_buf(),
            details: e.to_string(),
        })
    }
}

type PushLog = Arc<Mutex<Vec<Value>>>;

fn record(log: &PushLog, entry: Value) {
    log.lock().unwrap_or_else(PoisonError::into_inner).push(entry);
}

/// Sink that records every push as a JSON value.
#[derive(Clone)]
struct JsonSink {
    log: PushLog,
}

impl JsonSink {
    fn push(&self, kind: &str, payload: Value) -> std::result::Result<(), SinkError> {
        record(&self.log, json!({ "push": kind, "payload": payload }));
        Ok(())
    }
}

fn to_value<T: serde::Serialize>(update: &T) -> std::result::Result<Value, SinkError> {
    serde_json::to_value(update).map_err(|e| SinkError::Rejected(e.to_string()))
}

impl SessionSink for JsonSink {
    fn set_playback_state(
        &mut self,
        update: &PlaybackStateUpdate,
    ) -> std::result::Result<(), SinkError> {
        self.push("playback_state", to_value(update)?)
    }

    fn set_metadata(&mut self, update: &MetadataUpdate) -> std::result::Result<(), SinkError> {
        let mut payload = to_value(update)?;
        payload["has_artwork"] = Value::Bool(update.artwork.is_some());
        self.push("metadata", payload)
    }
}

impl NotificationSink for JsonSink {
    fn set_compact_view(&mut self, slots: &[usize]) -> std::result::Result<(), SinkError> {
        self.push("compact_view", json!(slots))
    }

    fn publish(&mut self, update: &NotificationUpdate) -> std::result::Result<(), SinkError> {
        self.push("notification", to_value(update)?)
    }
}

struct Replay<'a> {
    session: MediaSession,
    actions: mpsc::UnboundedReceiver<ActionEvent>,
    resolver: &'a dyn ArtworkResolver,
    log: PushLog,
}

impl Replay<'_> {
    fn attach(&mut self) {
        let sink = JsonSink {
            log: Arc::clone(&self.log),
        };
        self.session.attach_session_sink(Box::new(sink.clone()));
        self.session.attach_notification_sink(Box::new(sink));
        record(&self.log, json!({ "lifecycle": "start" }));
    }

    fn detach(&mut self) {
        self.session.detach_sinks();
        record(&self.log, json!({ "lifecycle": "stop" }));
    }

    async fn run(&mut self, step: Step) -> std::result::Result<(), SessionError> {
        match step {
            Step::SetMetadata(options) => {
                self.session.set_metadata(options)?;
                if let Some(request) = self.session.take_artwork_request() {
                    let outcome = resolve_request(self.resolver, request).await;
                    self.session.complete_artwork(outcome)?;
                }
            }
            Step::SetPlaybackState { state } => {
                match self.session.set_playback_state(&state)? {
                    LifecycleDirective::Start => {
                        self.attach();
                        self.session.reconcile()?;
                    }
                    LifecycleDirective::Stop => self.detach(),
                    LifecycleDirective::Update => {}
                }
            }
            Step::SetPositionState(options) => {
                self.session.set_position_state(options)?;
            }
            Step::SetActionHandler { action } => {
                self.session.set_action_handler(&action)?;
            }
            Step::ClearActionHandler { action } => {
                self.session.clear_action_handler(&action)?;
            }
            Step::InvalidateActionHandler { action } => {
                self.session.invalidate_action_handler(&action)?;
            }
            Step::PlatformCommand { command, seek_time } => {
                let command = match command {
                    CommandName::Play => PlatformCommand::Play,
                    CommandName::Pause => PlatformCommand::Pause,
                    CommandName::Rewind => PlatformCommand::Rewind,
                    CommandName::FastForward => PlatformCommand::FastForward,
                    CommandName::Previous => PlatformCommand::SkipToPrevious,
                    CommandName::Next => PlatformCommand::SkipToNext,
                    CommandName::SeekTo => {
                        match Duration::try_from_secs_f64(seek_time.max(0.0)) {
                            Ok(position) => PlatformCommand::SeekTo(position),
                            Err(e) => {
                                error!(seek_time, error = %e, "invalid seek time, skipping step");
                                record(
                                    &self.log,
                                    json!({ "skipped": "seekto", "error": e.to_string() }),
                                );
                                return Ok(());
                            }
                        }
                    }
                    CommandName::Stop => PlatformCommand::Stop,
                };
                if !self.session.handle_platform_command(command) {
                    record(&self.log, json!({ "dropped": format!("{command:?}") }));
                }
            }
            Step::HostStopped => {
                if self.session.on_host_stopped() {
                    self.detach();
                }
            }
        }

        while let Ok(event) = self.actions.try_recv() {
            record(&self.log, json!({ "action": event }));
        }
        Ok(())
    }
}

/// Run `scenario` against recording sinks and return the push log.
///
/// Sinks are attached and detached following the configured service
/// lifecycle, the way a host shell would. Recoverable step errors are logged
/// into the output and the replay continues.
#[instrument(skip_all, fields(steps = scenario.steps.len()))]
pub async fn replay(
    scenario: Scenario,
    config: &Config,
    resolver: &dyn ArtworkResolver,
) -> Vec<Value> {
    let (session, actions) = MediaSession::new(&config.session);
    let mut replay = Replay {
        session,
        actions,
        resolver,
        log: PushLog::default(),
    };

    if replay.session.lifecycle().start_on_load() {
        replay.attach();
    }

    for (index, step) in scenario.steps.into_iter().enumerate() {
        if let Err(e) = replay.run(step).await {
            warn!(step = index, error = %e, "step failed");
            record(&replay.log, json!({ "step": index, "error": e.to_string() }));
        }
    }

    info!("scenario finished");
    let log = replay.log.lock().unwrap_or_else(PoisonError::into_inner);
    log.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArtworkConfig;
    use crate::session::DefaultArtworkResolver;

    const SCENARIO: &str = r#"
        [[step]]
        call = "set_action_handler"
        action = "play"

        [[step]]
        call = "set_action_handler"
        action = "pause"

        [[step]]
        call = "set_metadata"
        title = "Song"
        artist = "Band"
        artwork = [{ src = "data:image/png;base64,AQID" }]

        [[step]]
        call = "set_playback_state"
        state = "paused"

        [[step]]
        call = "platform_command"
        command = "play"

        [[step]]
        call = "platform_command"
        command = "stop"

        [[step]]
        call = "set_action_handler"
        action = "shuffle"
    "#;

    #[test]
    fn parses_tagged_steps() {
        let scenario: Scenario = toml::from_str(SCENARIO).unwrap();

        assert_eq!(scenario.steps.len(), 7);
        assert_eq!(
            scenario.steps[3],
            Step::SetPlaybackState {
                state: "paused".to_string()
            }
        );
        assert!(matches!(
            &scenario.steps[2],
            Step::SetMetadata(options) if options.artwork.len() == 1
        ));
    }

    #[tokio::test]
    async fn replay_attaches_sinks_when_playback_starts() {
        let scenario: Scenario = toml::from_str(SCENARIO).unwrap();
        let config = Config::default();
        let resolver = DefaultArtworkResolver::new(&ArtworkConfig::default()).unwrap();

        let log = replay(scenario, &config, &resolver).await;

        let start = log
            .iter()
            .position(|entry| entry["lifecycle"] == "start")
            .unwrap();
        assert!(log[..start].iter().all(|entry| entry.get("push").is_none()));

        let playback = log
            .iter()
            .find(|entry| entry["push"] == "playback_state")
            .unwrap();
        assert_eq!(playback["payload"]["transport_state"], "paused");

        let metadata = log.iter().find(|entry| entry["push"] == "metadata").unwrap();
        assert_eq!(metadata["payload"]["title"], "Song");
        assert_eq!(metadata["payload"]["has_artwork"], true);

        assert!(log.iter().any(|entry| entry["action"]["action"] == "play"));
        assert!(log.iter().any(|entry| entry.get("dropped").is_some()));
        assert!(log.iter().any(|entry| entry["step"] == 6));
    }

    #[tokio::test]
    async fn infinite_seek_time_skips_the_step() {
        let scenario: Scenario = toml::from_str(
            r#"
            [[step]]
            call = "set_action_handler"
            action = "seekto"

            [[step]]
            call = "platform_command"
            command = "seekto"
            seek_time = inf

            [[step]]
            call = "platform_command"
            command = "seekto"
            seek_time = 4.5
        "#,
        )
        .unwrap();
        let resolver = DefaultArtworkResolver::new(&ArtworkConfig::default()).unwrap();

        let log = replay(scenario, &Config::default(), &resolver).await;

        let skipped: Vec<_> = log.iter().filter(|entry| entry["skipped"] == "seekto").collect();
        assert_eq!(skipped.len(), 1);
        let delivered: Vec<_> = log
            .iter()
            .filter(|entry| entry["action"]["action"] == "seekto")
            .collect();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0]["action"]["extras"]["seekTime"], 4.5);
    }
}
