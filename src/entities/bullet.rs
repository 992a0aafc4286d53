//! Bullet body

use hecs::World;

use crate::ecs::{Faction, Heading};
use crate::world::{Arena, GridPos, Slab};

/// A single-cell projectile. It flies straight until it leaves the arena or
/// hits something hostile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bullet {
    pub slab: Slab,
    pub heading: Heading,
    pub owner: Faction,
    /// Cell occupied before the last step
    pub prev: GridPos,
}

impl Bullet {
    pub fn new(pos: GridPos, heading: Heading, owner: Faction) -> Self {
        let slab = Slab::cell(pos);
        Self {
            slab,
            heading,
            owner,
            prev: pos,
        }
    }

    pub fn pos(&self) -> GridPos {
        self.slab.pos
    }

    /// Move one cell along the heading. Bounds are not checked here.
    pub fn advance(&mut self) {
        let (dx, dy) = self.heading.delta();
        self.prev = self.slab.pos;
        self.slab = self.slab.translated(dx, dy);
    }

    /// Whether two bullets are on the same cell, or passed through each
    /// other head-on during their last step
    pub fn meets(&self, other: &Bullet) -> bool {
        let swapped = self.pos() == other.prev && other.pos() == self.prev;
        self.pos() == other.pos() || swapped
    }

    pub fn out_of_bounds(&self, arena: &Arena) -> bool {
        self.slab.out_of_bounds(arena)
    }
}

/// Put a fired bullet into the world
pub fn spawn_bullet(world: &mut World, bullet: Bullet) -> hecs::Entity {
    world.spawn((bullet,))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_each_heading() {
        let start = GridPos::new(5, 5);
        let expected = [
            (Heading::Left, GridPos::new(4, 5)),
            (Heading::Up, GridPos::new(5, 4)),
            (Heading::Right, GridPos::new(6, 5)),
            (Heading::Down, GridPos::new(5, 6)),
        ];
        for (heading, end) in expected {
            let mut bullet = Bullet::new(start, heading, Faction::Player);
            bullet.advance();
            assert_eq!(bullet.pos(), end, "heading {:?}", heading);
        }
    }

    #[test]
    fn test_remembers_previous_cell() {
        let mut bullet = Bullet::new(GridPos::new(5, 5), Heading::Up, Faction::Player);
        assert_eq!(bullet.prev, GridPos::new(5, 5));
        bullet.advance();
        assert_eq!(bullet.prev, GridPos::new(5, 5));
        assert_eq!(bullet.pos(), GridPos::new(5, 4));
    }

    /// Advance both bullets once and report whether they met
    fn meet_after_step(a: (i32, i32, Heading), b: (i32, i32, Heading)) -> bool {
        let mut a = Bullet::new(GridPos::new(a.0, a.1), a.2, Faction::Player);
        let mut b = Bullet::new(GridPos::new(b.0, b.1), b.2, Faction::Enemy);
        a.advance();
        b.advance();
        a.meets(&b) && b.meets(&a)
    }

    #[test]
    fn test_meets_head_on_and_same_cell() {
        // Swapped cells
        assert!(meet_after_step((4, 5, Heading::Right), (5, 5, Heading::Left)));
        // Converging on one cell
        assert!(meet_after_step((4, 5, Heading::Right), (6, 5, Heading::Left)));
        assert!(meet_after_step((4, 5, Heading::Right), (5, 4, Heading::Down)));
    }

    #[test]
    fn test_does_not_meet_when_never_sharing_a_cell() {
        // Trailing one cell behind on the same line
        assert!(!meet_after_step((4, 5, Heading::Right), (5, 5, Heading::Right)));
        // Crossing the cell the other just left
        assert!(!meet_after_step((4, 5, Heading::Right), (5, 5, Heading::Down)));
        // Side by side
        assert!(!meet_after_step((4, 5, Heading::Right), (4, 6, Heading::Right)));
    }

    #[test]
    fn test_fresh_bullets_on_one_cell_meet() {
        let a = Bullet::new(GridPos::new(2, 2), Heading::Up, Faction::Player);
        let b = Bullet::new(GridPos::new(2, 2), Heading::Left, Faction::Enemy);
        assert!(a.meets(&b));
        let c = Bullet::new(GridPos::new(3, 2), Heading::Left, Faction::Enemy);
        assert!(!a.meets(&c));
    }

    #[test]
    fn test_leaves_arena() {
        let arena = Arena::from_cells(4, 4);
        let mut bullet = Bullet::new(GridPos::new(3, 1), Heading::Right, Faction::Enemy);
        assert!(!bullet.out_of_bounds(&arena));
        bullet.advance();
        assert!(bullet.out_of_bounds(&arena));
    }
}
