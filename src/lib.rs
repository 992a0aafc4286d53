//! Gridtank - a real-time grid tank arcade game for the terminal
//!
//! Drive a tank around a block grid, shoot the enemy tanks that keep
//! rolling in, and stay out of their line of fire.

pub mod game;
pub mod ecs;
pub mod world;
pub mod entities;
pub mod ui;
pub mod render;
pub mod data;
pub mod error;

// Re-export commonly used types
pub use game::{Game, GameEvent, GameState, PlayerCommand};
pub use ecs::components::*;
pub use world::{Arena, GridPos, Slab};
pub use data::GameConfig;
pub use error::{GridtankError, Result};
