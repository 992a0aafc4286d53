//! Game module - Core game logic and state management

mod state;
mod time;

pub use state::{Game, GameEvent, GameState, PlayerCommand};
pub use time::{Interval, SimClock, Throttle};
