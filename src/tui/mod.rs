//! Interactive workspace: an editor pane above a run-output panel, using Ratatui.

pub mod app;
pub mod events;
pub mod handler;
pub mod keys;
pub mod ui;

pub use handler::run_workspace;
