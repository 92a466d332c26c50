//! Formatting utilities for CLI output.

use crate::session::{ActionCatalog, SessionCapabilities};

/// ANSI color codes for terminal output
pub struct Colors;

impl Colors {
    /// Reset all formatting
    pub const RESET: &'static str = "\x1b[0m";
    /// Bold text
    pub const BOLD: &'static str = "\x1b[1m";
    /// Dim text
    pub const DIM: &'static str = "\x1b[2m";
    /// Red color
    pub const RED: &'static str = "\x1b[31m";
    /// Cyan color
    pub const CYAN: &'static str = "\x1b[36m";
}

/// Formats section headers with styling
pub fn format_header(text: &str) -> String {
    format!("{}{}{}{}", Colors::BOLD, Colors::CYAN, text, Colors::RESET)
}

/// Formats error messages with red styling
pub fn format_error(text: &str) -> String {
    format!("{}{}{}{}", Colors::BOLD, Colors::RED, text, Colors::RESET)
}

/// Formats a capability mask as `NAME|NAME (0xBITS)`.
///
/// ```
/// use mediasession::cli::formatting::format_capabilities;
/// use mediasession::session::SessionCapabilities;
///
/// let caps = SessionCapabilities::PLAY | SessionCapabilities::PLAY_PAUSE;
/// assert_eq!(format_capabilities(caps), "PLAY|PLAY_PAUSE (0x204)");
/// assert_eq!(format_capabilities(SessionCapabilities::empty()), "none (0x0)");
/// ```
pub fn format_capabilities(capabilities: SessionCapabilities) -> String {
    let names: Vec<&str> = capabilities.iter_names().map(|(name, _)| name).collect();
    let names = if names.is_empty() {
        "none".to_string()
    } else {
        names.join("|")
    };
    format!("{names} (0x{:x})", capabilities.bits())
}

/// Renders the action catalog as an aligned table.
pub fn format_catalog(catalog: &ActionCatalog) -> String {
    let mut output = format_header("Transport actions");
    output.push('\n');

    for descriptor in catalog.iter() {
        let gate = descriptor
            .state_gate
            .map_or_else(|| "any".to_string(), |state| state.to_string());
        let label = descriptor.display.as_ref().map_or("-", |display| display.label);
        output.push_str(&format!(
            "  {:<14} {:<16} compact={:<5} state={:<7} {}{}{}\n",
            descriptor.action.as_str(),
            label,
            descriptor.compact_eligible,
            gate,
            Colors::DIM,
            format_capabilities(descriptor.capability),
            Colors::RESET,
        ));
    }

    output
}
