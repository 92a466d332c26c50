use crate::config::ForegroundServiceMode;

/// What the host shell should do with the platform service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleDirective {
    /// Start the service and attach its sinks
    Start,

    /// Detach sinks and stop the service
    Stop,

    /// Keep the current service and reconcile
    Update,
}

/// Decides when the platform service should run.
///
/// In lazy mode the service only lives while playback is active; in always
/// mode it is started once with the host and never stopped here.
#[derive(Debug, Clone, Copy)]
pub struct SessionLifecycle {
    mode: ForegroundServiceMode,
}

impl SessionLifecycle {
    /// Policy for `mode`.
    pub fn new(mode: ForegroundServiceMode) -> Self {
        Self { mode }
    }

    /// Whether the service should be started when the host loads.
    pub fn start_on_load(&self) -> bool {
        self.mode == ForegroundServiceMode::Always
    }

    /// Directive after the transport state changed.
    pub fn on_playback_state(&self, service_running: bool, playback_active: bool) -> LifecycleDirective {
        match (self.mode, service_running, playback_active) {
            (ForegroundServiceMode::Lazy, false, true) => LifecycleDirective::Start,
            (ForegroundServiceMode::Lazy, true, false) => LifecycleDirective::Stop,
            _ => LifecycleDirective::Update,
        }
    }

    /// Whether to stop the service when the host moves to the background.
    pub fn stop_on_host_stopped(&self, service_running: bool, playback_active: bool) -> bool {
        self.mode == ForegroundServiceMode::Lazy && service_running && !playback_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lazy_mode_follows_playback() {
        let lifecycle = SessionLifecycle::new(ForegroundServiceMode::Lazy);

        assert!(!lifecycle.start_on_load());
        assert_eq!(lifecycle.on_playback_state(false, true), LifecycleDirective::Start);
        assert_eq!(lifecycle.on_playback_state(true, false), LifecycleDirective::Stop);
        assert_eq!(lifecycle.on_playback_state(true, true), LifecycleDirective::Update);
        assert_eq!(lifecycle.on_playback_state(false, false), LifecycleDirective::Update);
        assert!(lifecycle.stop_on_host_stopped(true, false));
        assert!(!lifecycle.stop_on_host_stopped(true, true));
    }

    #[test]
    fn always_mode_never_stops() {
        let lifecycle = SessionLifecycle::new(ForegroundServiceMode::Always);

        assert!(lifecycle.start_on_load());
        assert_eq!(lifecycle.on_playback_state(true, false), LifecycleDirective::Update);
        assert!(!lifecycle.stop_on_host_stopped(true, false));
    }
}
