//! ECS Systems
//!
//! Per-tick logic over the tank and bullet entities: bullet flight, collision
//! resolution and enemy decisions. Collision checks are brute force over all
//! pairs; the arena never holds more than a few dozen entities.

use std::collections::HashSet;

use hecs::{Entity, World};
use rand::Rng;

use crate::ecs::{AIState, Enemy, Faction, Heading, AI};
use crate::entities::{spawn_bullet, Bullet, Tank};
use crate::world::{Arena, Slab};

// ============================================================================
// Movement
// ============================================================================

/// Advance every bullet one cell
pub fn advance_bullets(world: &mut World) {
    for (_, bullet) in world.query_mut::<&mut Bullet>() {
        bullet.advance();
    }
}

/// Whether `slab` would overlap any tank other than `mover`
pub fn is_blocked(world: &World, mover: Entity, slab: &Slab) -> bool {
    world
        .query::<&Tank>()
        .iter()
        .any(|(entity, tank)| entity != mover && tank.slab.overlaps(slab))
}

/// Step a tank toward `heading` if neither the arena edge nor another tank
/// is in the way. Returns whether it moved.
pub fn try_step_tank(world: &mut World, entity: Entity, heading: Heading, arena: &Arena) -> bool {
    let next = match world.get::<&Tank>(entity) {
        Ok(tank) => tank.next_slab(heading, arena),
        Err(_) => return false,
    };
    let Some(next) = next else {
        return false;
    };
    if is_blocked(world, entity, &next) {
        return false;
    }
    match world.get::<&mut Tank>(entity) {
        Ok(mut tank) => {
            tank.slab = next;
            true
        }
        Err(_) => false,
    }
}

// ============================================================================
// Collisions
// ============================================================================

/// Outcome of one collision pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionReport {
    /// Enemy tanks destroyed by player bullets
    pub enemies_destroyed: Vec<Entity>,
    /// Enemy bullets that struck the player
    pub player_hits: u32,
    /// Bullets that left the arena
    pub bullets_expired: u32,
    /// Bullets that met a hostile bullet
    pub bullets_cancelled: u32,
}

impl CollisionReport {
    pub fn is_empty(&self) -> bool {
        self.enemies_destroyed.is_empty()
            && self.player_hits == 0
            && self.bullets_expired == 0
            && self.bullets_cancelled == 0
    }
}

/// Resolve bullet collisions and despawn whatever was consumed.
///
/// In order: bullets outside the arena expire; a bullet overlapping a hostile
/// tank is spent (an enemy tank is destroyed, the player only takes a hit);
/// two hostile bullets on one cell, or that swapped cells head-on, cancel
/// each other.
pub fn resolve_collisions(world: &mut World, arena: &Arena) -> CollisionReport {
    let bullets: Vec<(Entity, Bullet)> = world
        .query::<&Bullet>()
        .iter()
        .map(|(entity, bullet)| (entity, bullet.clone()))
        .collect();
    let tanks: Vec<(Entity, Slab, Faction)> = world
        .query::<&Tank>()
        .iter()
        .map(|(entity, tank)| (entity, tank.slab, tank.faction))
        .collect();

    let mut report = CollisionReport::default();
    let mut spent: HashSet<Entity> = HashSet::new();
    let mut destroyed: HashSet<Entity> = HashSet::new();

    for (entity, bullet) in &bullets {
        if bullet.out_of_bounds(arena) {
            spent.insert(*entity);
            report.bullets_expired += 1;
        }
    }

    for (entity, bullet) in &bullets {
        if spent.contains(entity) {
            continue;
        }
        let hit = tanks.iter().find(|(tank, slab, faction)| {
            !destroyed.contains(tank)
                && bullet.owner.is_hostile_to(*faction)
                && slab.overlaps(&bullet.slab)
        });
        if let Some((tank, _, faction)) = hit {
            spent.insert(*entity);
            match faction {
                Faction::Enemy => {
                    destroyed.insert(*tank);
                    report.enemies_destroyed.push(*tank);
                }
                Faction::Player => report.player_hits += 1,
            }
        }
    }

    for (i, (a, bullet_a)) in bullets.iter().enumerate() {
        if spent.contains(a) {
            continue;
        }
        for (b, bullet_b) in bullets.iter().skip(i + 1) {
            if spent.contains(b) || !bullet_a.owner.is_hostile_to(bullet_b.owner) {
                continue;
            }
            if bullet_a.meets(bullet_b) {
                spent.insert(*a);
                spent.insert(*b);
                report.bullets_cancelled += 2;
                break;
            }
        }
    }

    for entity in spent.into_iter().chain(destroyed) {
        let _ = world.despawn(entity);
    }

    report
}

// ============================================================================
// Enemy AI
// ============================================================================

/// AI actions that need to be executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AIAction {
    Turn { entity: Entity, heading: Heading },
    Move { entity: Entity, heading: Heading },
    Fire { entity: Entity },
}

/// Heading that closes the larger of the two gaps to `target`. Ties go to
/// the horizontal axis.
fn chase_heading(from: &Slab, target: &Slab) -> Heading {
    let from = from.center();
    let to = target.center();
    let dx = to.x - from.x;
    let dy = to.y - from.y;

    if dx.abs() >= dy.abs() {
        if dx >= 0 { Heading::Right } else { Heading::Left }
    } else if dy > 0 {
        Heading::Down
    } else {
        Heading::Up
    }
}

/// Decide what every enemy does this step.
///
/// Decisions are made against the state at the start of the step and applied
/// afterwards by [`execute_ai_actions`].
pub fn run_enemy_ai(
    world: &mut World,
    player: Option<Slab>,
    wander_chance: f64,
    rng: &mut impl Rng,
) -> Vec<AIAction> {
    let mut actions = Vec::new();

    let enemies: Vec<(Entity, Tank)> = world
        .query::<(&Tank, &Enemy)>()
        .iter()
        .map(|(entity, (tank, _))| (entity, tank.clone()))
        .collect();

    for (entity, tank) in enemies {
        let (state, action) = match player {
            None => (AIState::Idle, None),
            Some(target) => match tank.line_of_fire(&target) {
                Some(heading) if heading == tank.heading => {
                    (AIState::Aim, Some(AIAction::Fire { entity }))
                }
                Some(heading) => (AIState::Aim, Some(AIAction::Turn { entity, heading })),
                None => {
                    let (state, heading) = if rng.gen_bool(wander_chance) {
                        (AIState::Wander, Heading::ALL[rng.gen_range(0..Heading::ALL.len())])
                    } else {
                        (AIState::Chase, chase_heading(&tank.slab, &target))
                    };
                    let action = if heading == tank.heading {
                        AIAction::Move { entity, heading }
                    } else {
                        AIAction::Turn { entity, heading }
                    };
                    (state, Some(action))
                }
            },
        };

        if let Ok(mut ai) = world.get::<&mut AI>(entity) {
            ai.state = state;
        }
        actions.extend(action);
    }

    actions
}

/// Apply collected AI actions. Returns the number of shots fired.
///
/// `now` is the simulation time, used for each enemy's fire cooldown.
pub fn execute_ai_actions(world: &mut World, arena: &Arena, actions: Vec<AIAction>, now: f64) -> usize {
    let mut fired = 0;

    for action in actions {
        match action {
            AIAction::Turn { entity, heading } => {
                if let Ok(mut tank) = world.get::<&mut Tank>(entity) {
                    tank.rotate(heading);
                }
            }
            AIAction::Move { entity, heading } => {
                try_step_tank(world, entity, heading, arena);
            }
            AIAction::Fire { entity } => {
                let bullet = {
                    let Ok(mut enemy) = world.get::<&mut Enemy>(entity) else {
                        continue;
                    };
                    let Ok(tank) = world.get::<&Tank>(entity) else {
                        continue;
                    };
                    if !enemy.fire.try_acquire(now) {
                        continue;
                    }
                    tank.fire()
                };
                spawn_bullet(world, bullet);
                fired += 1;
            }
        }
    }

    fired
}
