//! World module
//!
//! Grid geometry and the arena the tanks fight in.

pub mod arena;
pub mod geometry;

pub use arena::Arena;
pub use geometry::{GridPos, Slab};
