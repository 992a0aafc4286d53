//! Game tuning values
//!
//! Every rate and limit the simulation uses. Defaults match the classic feel:
//! the player moves 30 cells per second, fires 5 shots per second, and
//! bullets fly 45 cells per second.

use serde::{Deserialize, Serialize};

use crate::error::{GridtankError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Render frames per second
    pub fps: u32,
    /// Simulation ticks per second
    pub sim_hz: u32,
    /// Most ticks run in one frame before backlog is dropped
    pub max_substeps: u32,

    /// Player moves or turns per second
    pub player_speed: f32,
    /// Player shots per second
    pub fire_rate: f32,
    /// Cells a bullet travels per second
    pub bullet_speed: f32,
    /// Hits the player can take
    pub lives: u32,

    /// Seconds between enemy spawns
    pub enemy_spawn_interval: f32,
    /// Enemies alive at once
    pub max_enemies: usize,
    /// Enemy decisions per second
    pub enemy_think_rate: f32,
    /// Enemy shots per second
    pub enemy_fire_rate: f32,
    /// Chance an enemy picks a random heading instead of chasing
    pub enemy_wander_chance: f64,
    /// Cells kept free around the player when spawning
    pub spawn_clearance: i32,
    /// Random placements tried per spawn
    pub spawn_attempts: u32,

    pub score_per_kill: u64,
    /// Fixed RNG seed; random when unset
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fps: 60,
            sim_hz: 120,
            max_substeps: 8,
            player_speed: 30.0,
            fire_rate: 5.0,
            bullet_speed: 45.0,
            lives: 3,
            enemy_spawn_interval: 4.0,
            max_enemies: 4,
            enemy_think_rate: 4.0,
            enemy_fire_rate: 1.0,
            enemy_wander_chance: 0.2,
            spawn_clearance: 6,
            spawn_attempts: 32,
            score_per_kill: 100,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        let rates = [
            ("player_speed", self.player_speed),
            ("fire_rate", self.fire_rate),
            ("bullet_speed", self.bullet_speed),
            ("enemy_spawn_interval", self.enemy_spawn_interval),
            ("enemy_think_rate", self.enemy_think_rate),
            ("enemy_fire_rate", self.enemy_fire_rate),
        ];
        for (name, value) in rates {
            if !(value.is_finite() && value > 0.0) {
                return Err(GridtankError::InvalidConfig(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }

        if self.fps == 0 || self.sim_hz == 0 || self.max_substeps == 0 {
            return Err(GridtankError::InvalidConfig(
                "fps, sim_hz and max_substeps must be non-zero".to_string(),
            ));
        }
        if self.lives == 0 {
            return Err(GridtankError::InvalidConfig("lives must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.enemy_wander_chance) {
            return Err(GridtankError::InvalidConfig(format!(
                "enemy_wander_chance must be within 0..=1, got {}",
                self.enemy_wander_chance
            )));
        }
        if self.spawn_clearance < 0 {
            return Err(GridtankError::InvalidConfig(
                "spawn_clearance cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}
