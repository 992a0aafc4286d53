//! Entity bodies and creation

pub mod bullet;
pub mod enemies;
pub mod player;
pub mod tank;

pub use bullet::{spawn_bullet, Bullet};
pub use enemies::{find_spawn_point, spawn_enemy, spawn_enemy_random, SpawnRules};
pub use player::spawn_player;
pub use tank::{Shape, Tank, SHAPE_FACING_RIGHT, TANK_SIZE};
