//! Grid geometry
//!
//! Cell coordinates and axis-aligned rectangles of cells. All collision
//! checks in the game reduce to the overlap and bounds tests in this file.

use serde::{Deserialize, Serialize};

use super::Arena;

/// A cell coordinate. `(0, 0)` is the top-left cell, `y` grows downward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset by a delta
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// An axis-aligned rectangle of cells.
///
/// `pos` is the top-left cell and `size` the extent in cells. The right and
/// bottom edges are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slab {
    pub pos: GridPos,
    pub size: GridPos,
}

impl Slab {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            pos: GridPos::new(x, y),
            size: GridPos::new(w, h),
        }
    }

    /// A single cell
    pub const fn cell(pos: GridPos) -> Self {
        Self { pos, size: GridPos::new(1, 1) }
    }

    pub fn right(&self) -> i32 {
        self.pos.x + self.size.x
    }

    pub fn bottom(&self) -> i32 {
        self.pos.y + self.size.y
    }

    /// Center cell (rounded toward the top-left for even sizes)
    pub fn center(&self) -> GridPos {
        GridPos::new(self.pos.x + self.size.x / 2, self.pos.y + self.size.y / 2)
    }

    pub fn touches_left(&self) -> bool {
        self.pos.x == 0
    }

    pub fn touches_top(&self) -> bool {
        self.pos.y == 0
    }

    pub fn touches_right(&self, arena: &Arena) -> bool {
        self.right() == arena.width
    }

    pub fn touches_bottom(&self, arena: &Arena) -> bool {
        self.bottom() == arena.height
    }

    /// True if any part of the slab lies outside the arena
    pub fn out_of_bounds(&self, arena: &Arena) -> bool {
        self.pos.x < 0
            || self.pos.y < 0
            || self.right() > arena.width
            || self.bottom() > arena.height
    }

    /// Strict overlap. Slabs that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Slab) -> bool {
        self.pos.x < other.right()
            && other.pos.x < self.right()
            && self.pos.y < other.bottom()
            && other.pos.y < self.bottom()
    }

    /// The same slab moved by a delta
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self { pos: self.pos.offset(dx, dy), size: self.size }
    }

    /// Grow the slab by `margin` cells on every side
    pub fn inflate(&self, margin: i32) -> Self {
        Self::new(
            self.pos.x - margin,
            self.pos.y - margin,
            self.size.x + margin * 2,
            self.size.y + margin * 2,
        )
    }

    /// Whether the rows `[pos.y, bottom)` include row `y`
    pub fn spans_row(&self, y: i32) -> bool {
        y >= self.pos.y && y < self.bottom()
    }

    /// Whether the columns `[pos.x, right)` include column `x`
    pub fn spans_column(&self, x: i32) -> bool {
        x >= self.pos.x && x < self.right()
    }
}
