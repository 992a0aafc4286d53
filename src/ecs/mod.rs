//! Entity Component System module
//!
//! Components attached to tanks and bullets, and the systems that move them
//! and resolve their collisions.

pub mod components;
pub mod systems;

pub use components::*;
pub use systems::{
    advance_bullets, execute_ai_actions, is_blocked, resolve_collisions, run_enemy_ai,
    try_step_tank, AIAction, CollisionReport,
};
