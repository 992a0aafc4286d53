//! Game state machine
//!
//! Owns the entity world and advances the simulation on a fixed timestep.

use std::time::Duration;

use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::time::{Interval, SimClock, Throttle};
use crate::data::GameConfig;
use crate::ecs::{advance_bullets, execute_ai_actions, is_blocked, resolve_collisions, run_enemy_ai};
use crate::ecs::{AIState, Enemy, Heading, AI};
use crate::entities::{
    find_spawn_point, spawn_bullet, spawn_enemy, spawn_enemy_random, spawn_player, Bullet, SpawnRules, Tank,
    TANK_SIZE,
};
use crate::error::Result;
use crate::world::{Arena, GridPos, Slab};

/// The main game struct that holds all game data
pub struct Game {
    /// Current game state
    state: GameState,
    /// ECS world containing all tanks and bullets
    world: World,
    arena: Arena,
    config: GameConfig,
    /// Random number generator (seeded when the config asks for it)
    rng: StdRng,
    clock: SimClock,
    /// The player entity
    player_entity: Option<Entity>,
    score: u64,
    lives: u32,
    kills: u32,
    bullet_timer: Interval,
    ai_timer: Interval,
    spawn_timer: Interval,
    move_throttle: Throttle,
    fire_throttle: Throttle,
    /// Events since the last drain
    events: Vec<GameEvent>,
}

/// All possible game states
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameState {
    Playing,
    Paused,
    GameOver { score: u64 },
    /// Exit the game
    Quit,
}

/// Something the player asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    /// Drive toward a heading, turning first if needed
    Turn(Heading),
    Fire,
    /// Toggle pause
    Pause,
    Restart,
    Quit,
}

/// Notable things that happened during simulation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    EnemySpawned { pos: GridPos },
    EnemyDestroyed { score: u64 },
    PlayerHit { lives_left: u32 },
    GameOver { score: u64 },
}

impl Game {
    /// Create a new game on `arena` with the player in the top-left corner
    pub fn new(config: GameConfig, arena: Arena) -> Result<Self> {
        config.validate()?;
        arena.ensure_fits(GridPos::new(TANK_SIZE, TANK_SIZE))?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut game = Self {
            state: GameState::Playing,
            world: World::new(),
            arena,
            rng,
            clock: SimClock::new(config.sim_hz, config.max_substeps),
            player_entity: None,
            score: 0,
            lives: config.lives,
            kills: 0,
            bullet_timer: Interval::per_second(config.bullet_speed),
            ai_timer: Interval::per_second(config.enemy_think_rate),
            spawn_timer: Interval::new(config.enemy_spawn_interval),
            move_throttle: Throttle::per_second(config.player_speed),
            fire_throttle: Throttle::per_second(config.fire_rate),
            events: Vec::new(),
            config,
        };
        game.player_entity = Some(spawn_player(&mut game.world, GridPos::new(0, 0)));

        log::info!(
            "New game on a {}x{} arena with {} lives",
            arena.width,
            arena.height,
            game.lives
        );
        Ok(game)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn arena(&self) -> Arena {
        self.arena
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn kills(&self) -> u32 {
        self.kills
    }

    /// Seconds of simulated play
    pub fn elapsed(&self) -> f64 {
        self.clock.elapsed()
    }

    /// Copy of the player's tank
    pub fn player_tank(&self) -> Option<Tank> {
        self.player_entity
            .and_then(|e| self.world.get::<&Tank>(e).ok().map(|t| (*t).clone()))
    }

    fn player_slab(&self) -> Option<Slab> {
        self.player_entity
            .and_then(|e| self.world.get::<&Tank>(e).ok().map(|t| t.slab))
    }

    pub fn enemy_count(&self) -> usize {
        self.world.query::<(&Tank, &Enemy)>().iter().count()
    }

    /// Enemies currently lined up on the player
    pub fn enemies_aiming(&self) -> usize {
        self.world
            .query::<(&Enemy, &AI)>()
            .iter()
            .filter(|(_, (_, ai))| ai.state == AIState::Aim)
            .count()
    }

    pub fn bullet_count(&self) -> usize {
        self.world.query::<&Bullet>().iter().count()
    }

    /// Take the events raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn is_running(&self) -> bool {
        self.state == GameState::Playing
    }

    /// Handle a player command. Moves and shots inside their throttle window
    /// are dropped.
    pub fn command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::Quit => self.state = GameState::Quit,
            PlayerCommand::Restart => self.restart(),
            PlayerCommand::Pause => self.toggle_pause(),
            PlayerCommand::Turn(heading) if self.is_running() => {
                if self.move_throttle.try_acquire(self.clock.elapsed()) {
                    self.drive_player(heading);
                }
            }
            PlayerCommand::Fire if self.is_running() => {
                if self.fire_throttle.try_acquire(self.clock.elapsed()) {
                    self.player_fire();
                }
            }
            _ => {}
        }
    }

    fn toggle_pause(&mut self) {
        self.state = match self.state {
            GameState::Playing => GameState::Paused,
            GameState::Paused => GameState::Playing,
            _ => return,
        };
        log::debug!("Pause toggled, now {:?}", self.state);
    }

    /// Turn the player, or move when already facing `heading`
    fn drive_player(&mut self, heading: Heading) {
        let Some(player) = self.player_entity else {
            return;
        };
        let blocked = match self.world.get::<&Tank>(player) {
            Ok(tank) => {
                tank.heading == heading
                    && tank
                        .next_slab(heading, &self.arena)
                        .is_some_and(|next| is_blocked(&self.world, player, &next))
            }
            Err(_) => return,
        };
        if blocked {
            return;
        }
        if let Ok(mut tank) = self.world.get::<&mut Tank>(player) {
            tank.move_or_rotate(heading, &self.arena);
        }
        self.resolve();
    }

    fn player_fire(&mut self) {
        let bullet = match self.player_entity.map(|e| self.world.get::<&Tank>(e)) {
            Some(Ok(tank)) => tank.fire(),
            _ => return,
        };
        spawn_bullet(&mut self.world, bullet);
        self.resolve();
    }

    /// Advance by a frame's worth of wall time
    pub fn update(&mut self, delta: Duration) {
        if !self.is_running() {
            return;
        }
        let steps = self.clock.advance(delta);
        let dt = self.clock.step();
        for _ in 0..steps {
            self.tick(dt);
            if !self.is_running() {
                break;
            }
        }
    }

    /// One fixed simulation step. Stops as soon as the game is over.
    fn tick(&mut self, dt: f32) {
        for _ in 0..self.bullet_timer.update(dt) {
            advance_bullets(&mut self.world);
            self.resolve();
            if !self.is_running() {
                return;
            }
        }

        for _ in 0..self.ai_timer.update(dt) {
            let player = self.player_slab();
            let actions = run_enemy_ai(&mut self.world, player, self.config.enemy_wander_chance, &mut self.rng);
            execute_ai_actions(&mut self.world, &self.arena, actions, self.clock.elapsed());
        }
        self.resolve();
        if !self.is_running() {
            return;
        }

        for _ in 0..self.spawn_timer.update(dt) {
            self.try_spawn_enemy();
        }
    }

    fn spawn_rules(&self) -> SpawnRules {
        SpawnRules {
            clearance: self.config.spawn_clearance,
            attempts: self.config.spawn_attempts,
            fire_rate: self.config.enemy_fire_rate,
        }
    }

    fn try_spawn_enemy(&mut self) {
        if self.enemy_count() >= self.config.max_enemies {
            return;
        }
        let rules = self.spawn_rules();
        let player = self.player_slab();
        match spawn_enemy_random(&mut self.world, &self.arena, player, &rules, &mut self.rng) {
            Some(entity) => {
                if let Ok(tank) = self.world.get::<&Tank>(entity) {
                    self.events.push(GameEvent::EnemySpawned { pos: tank.pos() });
                }
            }
            None => log::warn!("No free spot for an enemy, skipping spawn"),
        }
    }

    /// Run collision resolution and apply its score and damage
    fn resolve(&mut self) {
        let report = resolve_collisions(&mut self.world, &self.arena);

        for _ in &report.enemies_destroyed {
            self.kills += 1;
            self.score += self.config.score_per_kill;
            log::info!("Enemy destroyed, score {}", self.score);
            self.events.push(GameEvent::EnemyDestroyed { score: self.score });
        }

        for _ in 0..report.player_hits {
            if self.lives == 0 {
                break;
            }
            self.lives -= 1;
            log::info!("Player hit, {} lives left", self.lives);
            self.events.push(GameEvent::PlayerHit { lives_left: self.lives });
        }

        if self.lives == 0 && self.is_running() {
            self.state = GameState::GameOver { score: self.score };
            log::info!("Game over with score {}", self.score);
            self.events.push(GameEvent::GameOver { score: self.score });
        }
    }

    /// Replace the arena, pulling tanks back inside and dropping bullets
    /// that no longer fit. Enemies left stacked on another tank are moved to
    /// a free spot, or removed when there is none.
    pub fn resize(&mut self, arena: Arena) -> Result<()> {
        arena.ensure_fits(GridPos::new(TANK_SIZE, TANK_SIZE))?;
        self.arena = arena;

        for (_, tank) in self.world.query_mut::<&mut Tank>() {
            tank.slab = arena.clamp(tank.slab);
        }
        self.separate_tanks();
        self.resolve();

        log::debug!("Arena resized to {}x{}", arena.width, arena.height);
        Ok(())
    }

    /// Re-place enemies that overlap the player or an earlier tank
    fn separate_tanks(&mut self) {
        let mut settled: Vec<Slab> = self.player_slab().into_iter().collect();
        let mut stacked: Vec<(Entity, Heading)> = Vec::new();

        let mut enemies: Vec<(Entity, Slab, Heading)> = self
            .world
            .query::<(&Tank, &Enemy)>()
            .iter()
            .map(|(entity, (tank, _))| (entity, tank.slab, tank.heading))
            .collect();
        enemies.sort_by_key(|(entity, _, _)| entity.id());

        for (entity, slab, heading) in enemies {
            if settled.iter().any(|other| other.overlaps(&slab)) {
                stacked.push((entity, heading));
            } else {
                settled.push(slab);
            }
        }

        for (entity, _) in &stacked {
            let _ = self.world.despawn(*entity);
        }

        let rules = self.spawn_rules();
        let player = self.player_slab();
        for (_, heading) in stacked {
            match find_spawn_point(&self.world, &self.arena, player, &rules, &mut self.rng) {
                Some(pos) => {
                    spawn_enemy(&mut self.world, pos, heading, rules.fire_rate);
                    log::debug!("Moved a stacked enemy to ({}, {})", pos.x, pos.y);
                }
                None => log::warn!("No room left for a stacked enemy, removing it"),
            }
        }
    }

    /// Start over with a fresh field
    pub fn restart(&mut self) {
        self.world.clear();
        self.player_entity = Some(spawn_player(&mut self.world, GridPos::new(0, 0)));
        self.state = GameState::Playing;
        self.score = 0;
        self.kills = 0;
        self.lives = self.config.lives;
        self.clock.reset();
        self.bullet_timer.reset();
        self.ai_timer.reset();
        self.spawn_timer.reset();
        self.move_throttle.reset();
        self.fire_throttle.reset();
        self.events.clear();
        log::info!("Game restarted");
    }

    /// Place an enemy directly. Used by tests and benchmarks to build scenes.
    pub fn insert_enemy(&mut self, pos: GridPos, heading: Heading) -> Entity {
        crate::entities::spawn_enemy(&mut self.world, pos, heading, self.config.enemy_fire_rate)
    }

    /// Place a bullet directly
    pub fn insert_bullet(&mut self, bullet: Bullet) -> Entity {
        spawn_bullet(&mut self.world, bullet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Faction;

    /// Config with no spawns or AI getting in the way
    fn quiet_config() -> GameConfig {
        GameConfig {
            seed: Some(1),
            enemy_spawn_interval: 1_000.0,
            enemy_think_rate: 0.001,
            ..GameConfig::default()
        }
    }

    fn new_game() -> Game {
        Game::new(quiet_config(), Arena::from_cells(30, 20)).unwrap()
    }

    /// Run whole simulated seconds in small frames
    fn run_for(game: &mut Game, seconds: f32) {
        let frames = (seconds * 60.0) as u32;
        for _ in 0..frames {
            game.update(Duration::from_secs_f32(1.0 / 60.0));
        }
    }

    #[test]
    fn test_new_game() {
        let game = new_game();
        assert_eq!(game.state(), &GameState::Playing);
        assert_eq!(game.lives(), 3);
        assert_eq!(game.score(), 0);
        let tank = game.player_tank().unwrap();
        assert_eq!(tank.pos(), GridPos::new(0, 0));
        assert_eq!(tank.heading, Heading::Right);
        assert!(game.world.get::<&crate::ecs::Player>(game.player_entity.unwrap()).is_ok());
    }

    #[test]
    fn test_arena_too_small() {
        assert!(Game::new(quiet_config(), Arena::from_cells(2, 2)).is_err());
    }

    #[test]
    fn test_invalid_config() {
        let config = GameConfig { bullet_speed: -1.0, ..quiet_config() };
        assert!(Game::new(config, Arena::from_cells(30, 20)).is_err());
    }

    #[test]
    fn test_turn_then_move() {
        let mut game = new_game();
        game.command(PlayerCommand::Turn(Heading::Down));
        assert_eq!(game.player_tank().unwrap().heading, Heading::Down);
        assert_eq!(game.player_tank().unwrap().pos(), GridPos::new(0, 0));

        // Inside the move throttle window
        game.command(PlayerCommand::Turn(Heading::Down));
        assert_eq!(game.player_tank().unwrap().pos(), GridPos::new(0, 0));

        run_for(&mut game, 0.1);
        game.command(PlayerCommand::Turn(Heading::Down));
        assert_eq!(game.player_tank().unwrap().pos(), GridPos::new(0, 1));
    }

    #[test]
    fn test_fire_is_throttled() {
        let mut game = new_game();
        game.command(PlayerCommand::Fire);
        game.command(PlayerCommand::Fire);
        assert_eq!(game.bullet_count(), 1);

        run_for(&mut game, 0.25);
        game.command(PlayerCommand::Fire);
        assert_eq!(game.bullet_count(), 2);
    }

    #[test]
    fn test_bullets_fly_and_expire() {
        let mut game = new_game();
        game.command(PlayerCommand::Fire);
        assert_eq!(game.bullet_count(), 1);

        // 27 cells to the edge at 45 cells per second
        run_for(&mut game, 1.0);
        assert_eq!(game.bullet_count(), 0);
    }

    #[test]
    fn test_shooting_an_enemy_scores() {
        let mut game = new_game();
        game.insert_enemy(GridPos::new(10, 0), Heading::Down);
        game.command(PlayerCommand::Fire);

        run_for(&mut game, 0.5);
        assert_eq!(game.enemy_count(), 0);
        assert_eq!(game.kills(), 1);
        assert_eq!(game.score(), 100);
        assert_eq!(game.bullet_count(), 0);

        let events = game.drain_events();
        assert!(events.contains(&GameEvent::EnemyDestroyed { score: 100 }));
        assert!(game.drain_events().is_empty());
    }

    #[test]
    fn test_enemy_blocks_player() {
        let mut game = new_game();
        game.insert_enemy(GridPos::new(3, 0), Heading::Left);
        game.command(PlayerCommand::Turn(Heading::Right));
        assert_eq!(game.player_tank().unwrap().pos(), GridPos::new(0, 0));
    }

    #[test]
    fn test_losing_all_lives_ends_game() {
        let mut game = Game::new(
            GameConfig { lives: 2, ..quiet_config() },
            Arena::from_cells(30, 20),
        )
        .unwrap();

        game.insert_bullet(Bullet::new(GridPos::new(1, 1), Heading::Left, Faction::Enemy));
        game.update(Duration::from_millis(10));
        assert_eq!(game.lives(), 1);
        assert_eq!(game.state(), &GameState::Playing);

        game.insert_bullet(Bullet::new(GridPos::new(1, 1), Heading::Left, Faction::Enemy));
        game.update(Duration::from_millis(10));
        assert_eq!(game.lives(), 0);
        assert_eq!(game.state(), &GameState::GameOver { score: 0 });

        let events = game.drain_events();
        assert!(events.contains(&GameEvent::PlayerHit { lives_left: 0 }));
        assert!(events.contains(&GameEvent::GameOver { score: 0 }));

        // Frozen after game over
        game.command(PlayerCommand::Fire);
        assert_eq!(game.bullet_count(), 0);
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let mut game = new_game();
        game.command(PlayerCommand::Fire);
        game.command(PlayerCommand::Pause);
        assert_eq!(game.state(), &GameState::Paused);

        let before = game.elapsed();
        run_for(&mut game, 1.0);
        assert_eq!(game.elapsed(), before);
        assert_eq!(game.bullet_count(), 1);

        game.command(PlayerCommand::Pause);
        assert_eq!(game.state(), &GameState::Playing);
    }

    #[test]
    fn test_enemies_spawn_up_to_limit() {
        let config = GameConfig {
            seed: Some(5),
            enemy_spawn_interval: 0.1,
            enemy_think_rate: 0.001,
            max_enemies: 3,
            spawn_clearance: 2,
            ..GameConfig::default()
        };
        let mut game = Game::new(config, Arena::from_cells(40, 24)).unwrap();

        run_for(&mut game, 1.0);
        assert_eq!(game.enemy_count(), 3);

        let spawned = game
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::EnemySpawned { .. }))
            .count();
        assert_eq!(spawned, 3);
    }

    #[test]
    fn test_enemy_shoots_lined_up_player() {
        let config = GameConfig {
            seed: Some(2),
            enemy_spawn_interval: 1_000.0,
            enemy_think_rate: 10.0,
            enemy_wander_chance: 0.0,
            ..GameConfig::default()
        };
        let mut game = Game::new(config, Arena::from_cells(30, 20)).unwrap();
        game.insert_enemy(GridPos::new(20, 0), Heading::Left);

        run_for(&mut game, 2.0);
        assert!(game.lives() < 3);
    }

    #[test]
    fn test_resize_clamps_tanks() {
        let mut game = new_game();
        let enemy = game.insert_enemy(GridPos::new(25, 15), Heading::Up);
        game.insert_bullet(Bullet::new(GridPos::new(20, 5), Heading::Up, Faction::Player));

        game.resize(Arena::from_cells(15, 10)).unwrap();
        assert_eq!(game.arena(), Arena::from_cells(15, 10));
        assert_eq!(game.world().get::<&Tank>(enemy).unwrap().pos(), GridPos::new(12, 7));
        assert_eq!(game.bullet_count(), 0);

        assert!(game.resize(Arena::from_cells(2, 10)).is_err());
        assert_eq!(game.arena(), Arena::from_cells(15, 10));
    }

    #[test]
    fn test_nothing_scores_after_game_over_in_same_tick() {
        let config = GameConfig {
            lives: 1,
            bullet_speed: 480.0,
            ..quiet_config()
        };
        let mut game = Game::new(config, Arena::from_cells(30, 20)).unwrap();
        game.insert_enemy(GridPos::new(10, 10), Heading::Up);
        // Hits the player on the first bullet step
        game.insert_bullet(Bullet::new(GridPos::new(3, 1), Heading::Left, Faction::Enemy));
        // Would reach the enemy on the second
        game.insert_bullet(Bullet::new(GridPos::new(8, 11), Heading::Right, Faction::Player));

        game.update(Duration::from_millis(10));
        assert_eq!(game.state(), &GameState::GameOver { score: game.score() });
        assert_eq!(game.score(), 0);
        assert_eq!(game.kills(), 0);
        assert_eq!(game.enemy_count(), 1);

        let events = game.drain_events();
        assert_eq!(events.last(), Some(&GameEvent::GameOver { score: 0 }));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::EnemyDestroyed { .. })));
    }

    fn tank_slabs(game: &Game) -> Vec<Slab> {
        game.world().query::<&Tank>().iter().map(|(_, tank)| tank.slab).collect()
    }

    #[test]
    fn test_resize_separates_stacked_tanks() {
        let mut game = new_game();
        game.insert_enemy(GridPos::new(20, 5), Heading::Left);
        game.insert_enemy(GridPos::new(25, 5), Heading::Left);

        game.resize(Arena::from_cells(15, 10)).unwrap();
        assert_eq!(game.enemy_count(), 2);

        let slabs = tank_slabs(&game);
        for (i, a) in slabs.iter().enumerate() {
            assert_eq!(game.arena().clamp(*a), *a, "tank outside arena");
            for b in slabs.iter().skip(i + 1) {
                assert!(!a.overlaps(b), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_resize_drops_stacked_tank_without_room() {
        let mut game = new_game();
        game.insert_enemy(GridPos::new(20, 0), Heading::Left);
        game.insert_enemy(GridPos::new(25, 0), Heading::Left);

        game.resize(Arena::from_cells(6, 3)).unwrap();
        assert_eq!(game.enemy_count(), 1);
        assert_eq!(game.player_tank().unwrap().pos(), GridPos::new(0, 0));

        let slabs = tank_slabs(&game);
        assert!(!slabs[0].overlaps(&slabs[1]));
    }

    #[test]
    fn test_spawn_skipped_when_arena_full() {
        let config = GameConfig {
            enemy_spawn_interval: 0.1,
            ..quiet_config()
        };
        // The player fills the whole arena
        let mut game = Game::new(config, Arena::from_cells(3, 3)).unwrap();

        run_for(&mut game, 1.0);
        assert_eq!(game.enemy_count(), 0);
        assert_eq!(game.state(), &GameState::Playing);
        assert!(game.drain_events().is_empty());
    }

    #[test]
    fn test_enemies_aiming() {
        let config = GameConfig {
            enemy_think_rate: 10.0,
            ..quiet_config()
        };
        let mut game = Game::new(config, Arena::from_cells(30, 20)).unwrap();
        game.insert_enemy(GridPos::new(20, 0), Heading::Left);
        game.insert_enemy(GridPos::new(20, 12), Heading::Left);
        assert_eq!(game.enemies_aiming(), 0);

        run_for(&mut game, 0.2);
        assert_eq!(game.enemies_aiming(), 1);
    }

    #[test]
    fn test_restart() {
        let mut game = new_game();
        game.insert_enemy(GridPos::new(10, 10), Heading::Up);
        game.command(PlayerCommand::Turn(Heading::Down));
        game.command(PlayerCommand::Restart);

        assert_eq!(game.enemy_count(), 0);
        assert_eq!(game.lives(), 3);
        assert_eq!(game.player_tank().unwrap().heading, Heading::Right);
        assert_eq!(game.elapsed(), 0.0);
    }

    #[test]
    fn test_quit() {
        let mut game = new_game();
        game.command(PlayerCommand::Quit);
        assert_eq!(game.state(), &GameState::Quit);
    }
}
