//! Tank body
//!
//! A tank is a 3x3 slab carrying a 3x3 block sprite. The sprite is turned in
//! place by matrix transforms whenever the heading changes, so the drawn
//! barrel always points where the tank will move and fire.

use crate::ecs::{Faction, Heading, Turn};
use crate::world::{Arena, GridPos, Slab};

use super::Bullet;

/// Side length of a tank in cells
pub const TANK_SIZE: i32 = 3;

/// Block sprite of a tank, row-major
pub type Shape = [[bool; 3]; 3];

/// Sprite of a tank facing right
pub const SHAPE_FACING_RIGHT: Shape = [
    [true, true, false],
    [false, true, true],
    [true, true, false],
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tank {
    pub slab: Slab,
    pub shape: Shape,
    pub heading: Heading,
    pub faction: Faction,
}

impl Tank {
    /// A tank at `(x, y)` facing right
    pub fn new(x: i32, y: i32, faction: Faction) -> Self {
        Self {
            slab: Slab::new(x, y, TANK_SIZE, TANK_SIZE),
            shape: SHAPE_FACING_RIGHT,
            heading: Heading::Right,
            faction,
        }
    }

    /// A tank at `(x, y)` with its sprite turned to `heading`
    pub fn facing(x: i32, y: i32, faction: Faction, heading: Heading) -> Self {
        let mut tank = Self::new(x, y, faction);
        tank.rotate(heading);
        tank
    }

    pub fn pos(&self) -> GridPos {
        self.slab.pos
    }

    fn transpose_shape(&mut self) {
        for m in 0..3 {
            for n in (m + 1)..3 {
                let tmp = self.shape[m][n];
                self.shape[m][n] = self.shape[n][m];
                self.shape[n][m] = tmp;
            }
        }
    }

    pub fn rotate_clockwise(&mut self) {
        self.transpose_shape();
        for row in self.shape.iter_mut() {
            row.reverse();
        }
    }

    pub fn rotate_counter_clockwise(&mut self) {
        self.transpose_shape();
        self.shape.reverse();
    }

    /// Turn the sprite 180 degrees, mirroring along the current heading's axis
    pub fn flip(&mut self) {
        if self.heading.is_horizontal() {
            for row in self.shape.iter_mut() {
                row.reverse();
            }
        } else {
            self.shape.reverse();
        }
    }

    /// Face `heading`, turning the sprite the short way round
    pub fn rotate(&mut self, heading: Heading) {
        match self.heading.turn_to(heading) {
            Turn::None => {}
            Turn::Reverse => self.flip(),
            Turn::Clockwise => self.rotate_clockwise(),
            Turn::CounterClockwise => self.rotate_counter_clockwise(),
        }
        self.heading = heading;
    }

    /// The slab one step toward `heading`, or `None` if the tank is already
    /// against that edge of the arena
    pub fn next_slab(&self, heading: Heading, arena: &Arena) -> Option<Slab> {
        let blocked = match heading {
            Heading::Left => self.slab.touches_left(),
            Heading::Up => self.slab.touches_top(),
            Heading::Right => self.slab.touches_right(arena),
            Heading::Down => self.slab.touches_bottom(arena),
        };
        if blocked {
            return None;
        }
        let (dx, dy) = heading.delta();
        Some(self.slab.translated(dx, dy))
    }

    /// Move one cell toward `heading` unless against the arena edge.
    /// Returns whether the tank moved.
    pub fn step(&mut self, heading: Heading, arena: &Arena) -> bool {
        match self.next_slab(heading, arena) {
            Some(slab) => {
                self.slab = slab;
                true
            }
            None => false,
        }
    }

    /// Drive forward when already facing `heading`, otherwise only turn
    pub fn move_or_rotate(&mut self, heading: Heading, arena: &Arena) -> bool {
        if self.heading == heading {
            self.step(heading, arena)
        } else {
            self.rotate(heading);
            false
        }
    }

    /// Cell just past the centre of the leading edge
    pub fn muzzle(&self) -> GridPos {
        let GridPos { x, y } = self.slab.pos;
        match self.heading {
            Heading::Left => GridPos::new(x - 1, y + 1),
            Heading::Up => GridPos::new(x + 1, y - 1),
            Heading::Right => GridPos::new(x + TANK_SIZE, y + 1),
            Heading::Down => GridPos::new(x + 1, y + TANK_SIZE),
        }
    }

    pub fn fire(&self) -> Bullet {
        Bullet::new(self.muzzle(), self.heading, self.faction)
    }

    /// Filled cells of the sprite in arena coordinates
    pub fn cells(&self) -> impl Iterator<Item = GridPos> + '_ {
        let origin = self.slab.pos;
        self.shape.iter().enumerate().flat_map(move |(m, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, filled)| **filled)
                .map(move |(n, _)| origin.offset(n as i32, m as i32))
        })
    }

    /// Heading that would point the barrel at `target`, if `target` sits in
    /// this tank's line of fire
    pub fn line_of_fire(&self, target: &Slab) -> Option<Heading> {
        let centre = self.slab.center();
        if target.spans_row(centre.y) {
            if target.pos.x >= self.slab.right() {
                return Some(Heading::Right);
            }
            if target.right() <= self.slab.pos.x {
                return Some(Heading::Left);
            }
        }
        if target.spans_column(centre.x) {
            if target.pos.y >= self.slab.bottom() {
                return Some(Heading::Down);
            }
            if target.bottom() <= self.slab.pos.y {
                return Some(Heading::Up);
            }
        }
        None
    }
}
