//! User Interface module
//!
//! Terminal UI using ratatui.

pub mod app;
pub mod input;

pub use app::{App, MessageCategory};
pub use input::{map_key, InputAction};
