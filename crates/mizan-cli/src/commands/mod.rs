//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (rule loading, history loading, --now and --utc-offset)
//! - `classify` - Single-merchant classification and rule listing
//! - `import` - CSV classification and JSON export
//! - `reports` - Window summaries and insight reports

pub mod classify;
pub mod core;
pub mod import;
pub mod reports;

// Re-export command functions for main.rs
pub use classify::*;
pub use self::core::*;
pub use import::*;
pub use reports::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
