//! Player entity creation

use hecs::World;

use crate::ecs::{Faction, Player};
use crate::world::GridPos;

use super::Tank;

/// Spawn the player tank, facing right
pub fn spawn_player(world: &mut World, pos: GridPos) -> hecs::Entity {
    world.spawn((Player, Tank::new(pos.x, pos.y, Faction::Player)))
}
