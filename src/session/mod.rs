//! Media session state reconciliation.
//!
//! The application reports playback state and registers action handlers;
//! the [`ReconciliationEngine`] derives which transport controls are enabled
//! and pushes only what changed to the platform session and notification.

/// Artwork reference resolution
pub mod artwork;
/// Application-facing session bridge
pub mod bridge;
/// Transport action catalog
pub mod catalog;
/// Dirty flag set
pub mod dirty;
/// Delivery of triggered actions to the application
pub mod dispatch;
/// The reconciliation engine
pub mod engine;
/// Session error types
pub mod error;
/// Platform service lifecycle policy
pub mod lifecycle;
/// Playback model
pub mod model;
/// Action handler registry
pub mod registry;
/// Platform sink interfaces
pub mod sink;

#[cfg(test)]
pub(crate) mod testing;

pub use artwork::*;
pub use bridge::*;
pub use catalog::*;
pub use dirty::*;
pub use dispatch::*;
pub use engine::*;
pub use error::*;
pub use lifecycle::*;
pub use model::*;
pub use registry::*;
pub use sink::*;
