//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into four layers:
//!
//! - **[`outline`]**: the parsed document flattened into collapsible rows
//! - **[`app`]**: application state, keyboard handling and selection
//! - **[`panes`]**: stateless render functions for each visible pane (outline,
//!   source, status bar)
//! - **[`theme`]**: centralized color palette used by all panes
//!
//! The entry point for consumers is [`App`]: construct it with the source and
//! its parse result and call [`App::run`] to start the event loop.
//!
//! [`App::run`]: app::App::run

pub mod app;
pub mod outline;
pub mod panes;
pub mod theme;

pub use app::App;
