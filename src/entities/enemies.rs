//! Enemy entity creation
//!
//! Enemy tanks appear at random free spots in the arena, away from the player.

use hecs::{Entity, World};
use rand::Rng;

use crate::ecs::{Enemy, Faction, Heading, AI};
use crate::world::{Arena, GridPos, Slab};

use super::tank::{Tank, TANK_SIZE};

/// Rules for picking an enemy spawn point
#[derive(Debug, Clone, Copy)]
pub struct SpawnRules {
    /// Cells of empty ground kept around the player
    pub clearance: i32,
    /// Random placements tried before giving up
    pub attempts: u32,
    /// Shots per second for the new enemy
    pub fire_rate: f32,
}

/// Spawn an enemy tank at `pos`
pub fn spawn_enemy(world: &mut World, pos: GridPos, heading: Heading, fire_rate: f32) -> Entity {
    world.spawn((
        Tank::facing(pos.x, pos.y, Faction::Enemy, heading),
        Enemy::new(fire_rate),
        AI::default(),
    ))
}

/// Pick a random top-left cell for a new tank.
///
/// A candidate is rejected if it overlaps any existing tank or comes within
/// `clearance` cells of the player.
pub fn find_spawn_point(
    world: &World,
    arena: &Arena,
    player: Option<Slab>,
    rules: &SpawnRules,
    rng: &mut impl Rng,
) -> Option<GridPos> {
    let size = GridPos::new(TANK_SIZE, TANK_SIZE);
    let (cols, rows) = arena.placements(size);
    if cols == 0 || rows == 0 {
        return None;
    }

    let occupied: Vec<Slab> = world
        .query::<&Tank>()
        .iter()
        .map(|(_, tank)| tank.slab)
        .collect();
    let exclusion = player.map(|slab| slab.inflate(rules.clearance));

    for _ in 0..rules.attempts {
        let candidate = Slab {
            pos: GridPos::new(rng.gen_range(0..cols), rng.gen_range(0..rows)),
            size,
        };
        if occupied.iter().any(|slab| slab.overlaps(&candidate)) {
            continue;
        }
        if exclusion.is_some_and(|zone| zone.overlaps(&candidate)) {
            continue;
        }
        return Some(candidate.pos);
    }

    None
}

/// Spawn an enemy at a random free spot with a random heading
pub fn spawn_enemy_random(
    world: &mut World,
    arena: &Arena,
    player: Option<Slab>,
    rules: &SpawnRules,
    rng: &mut impl Rng,
) -> Option<Entity> {
    let pos = find_spawn_point(world, arena, player, rules, rng)?;
    let heading = Heading::ALL[rng.gen_range(0..Heading::ALL.len())];
    let entity = spawn_enemy(world, pos, heading, rules.fire_rate);
    log::debug!("Enemy spawned at ({}, {}) facing {:?}", pos.x, pos.y, heading);
    Some(entity)
}
