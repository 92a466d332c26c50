//! Command-line support: output formatting and scenario replay.

pub mod formatting;
mod scenario;

pub use scenario::{CommandName, Scenario, Step, replay};
