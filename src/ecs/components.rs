//! ECS Components
//!
//! Components attached to tank and bullet entities. The tank and bullet
//! bodies themselves live in `crate::entities`.

use serde::{Deserialize, Serialize};

use crate::game::Throttle;

// ============================================================================
// Heading
// ============================================================================

/// One of the four grid directions.
///
/// Declared in clockwise order starting from `Left`, so the distance between
/// two headings modulo 4 tells how far a tank has to turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    Left,
    Up,
    Right,
    Down,
}

/// How a tank turns from one heading to another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    None,
    Clockwise,
    CounterClockwise,
    Reverse,
}

impl Heading {
    pub const ALL: [Heading; 4] = [Heading::Left, Heading::Up, Heading::Right, Heading::Down];

    fn index(self) -> i32 {
        match self {
            Heading::Left => 0,
            Heading::Up => 1,
            Heading::Right => 2,
            Heading::Down => 3,
        }
    }

    /// Unit step in grid coordinates
    pub fn delta(self) -> (i32, i32) {
        match self {
            Heading::Left => (-1, 0),
            Heading::Up => (0, -1),
            Heading::Right => (1, 0),
            Heading::Down => (0, 1),
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Heading::Left | Heading::Right)
    }

    /// The turn needed to face `target` from `self`
    pub fn turn_to(self, target: Heading) -> Turn {
        match (target.index() - self.index()).rem_euclid(4) {
            0 => Turn::None,
            1 => Turn::Clockwise,
            2 => Turn::Reverse,
            _ => Turn::CounterClockwise,
        }
    }
}

// ============================================================================
// Identity
// ============================================================================

/// Side an entity fights for. Bullets never hurt their own faction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Enemy,
}

impl Faction {
    pub fn is_hostile_to(self, other: Faction) -> bool {
        self != other
    }
}

/// Marks the player's tank
#[derive(Debug, Clone, Copy, Default)]
pub struct Player;

/// Marks an enemy tank and tracks its own fire cooldown
#[derive(Debug, Clone)]
pub struct Enemy {
    pub fire: Throttle,
}

impl Enemy {
    pub fn new(fire_rate: f32) -> Self {
        Self { fire: Throttle::per_second(fire_rate) }
    }
}

// ============================================================================
// AI
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct AI {
    pub state: AIState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AIState {
    /// No player on the field
    Idle,
    /// Closing the distance to the player
    Chase,
    /// Lined up with the player, turning or firing
    Aim,
    /// Picked a random heading this step
    Wander,
}

impl Default for AI {
    fn default() -> Self {
        Self { state: AIState::Idle }
    }
}
