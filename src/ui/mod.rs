//! Terminal UI
//!
//! `views` and `modal` turn the published state into plain view models,
//! `render` draws them with ratatui and `app` runs the event loop.

pub mod app;
pub mod format;
pub mod modal;
pub mod render;
pub mod views;

pub use app::{App, Tab};
