//! Rendering support
//!
//! Supports two glyph sets:
//! - ASCII: bracket blocks for any terminal
//! - Unicode: framed square blocks

pub mod mode;

pub use mode::{detect_render_mode, RenderMode, CELL_HEIGHT, CELL_WIDTH};
