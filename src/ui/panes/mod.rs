//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`outline`]: Flattened AST with fold markers and the selected row
//! - [`source`]: Template source with syntax highlighting and the selected span
//! - [`status`]: Status bar with keybindings and parse state
//!
//! Each pane module exports a primary `render_*` function plus any state
//! type it scrolls with.

pub mod outline;
pub mod source;
pub mod status;

// Re-export render functions for convenience
pub use outline::render_outline_pane;
pub use source::{render_source_pane, SourceHighlight, SourceScrollState};
pub use status::render_status_bar;
