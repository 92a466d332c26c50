//! mediasession - expose application playback state to platform media controls.
//!
//! The crate keeps the platform's transport controls (lock screen,
//! notification, hardware media keys) consistent with what the application
//! is playing and which actions it handles, and routes user interaction back
//! to the application. The main pieces are:
//!
//! - An action catalog with per-state gating and a bounded compact view
//! - A handler registry that treats dangling handlers as absent
//! - A reconciliation engine that pushes only changed state, in a fixed order
//! - An application bridge with off-path artwork resolution
//!
//! # Quick Start
//!
//! ```rust
//! use mediasession::config::SessionConfig;
//! use mediasession::session::{MediaAction, MediaSession};
//!
//! let (mut session, _actions) = MediaSession::new(&SessionConfig::default());
//! session.set_action_handler("play").unwrap();
//! session.set_playback_state("paused").unwrap();
//!
//! assert_eq!(session.engine().derived().active_actions, vec![MediaAction::Play]);
//! ```

/// Configuration schema and loading.
pub mod config;

/// Crate-level error type and result alias.
pub mod error;

/// Command-line formatting and scenario replay.
pub mod cli;

/// Media session state reconciliation.
pub mod session;

/// Tracing subscriber setup.
pub mod tracing_config;

pub use error::{MediaSessionError, Result};
