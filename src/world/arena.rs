//! Arena bounds
//!
//! The rectangular playfield, measured in cells.

use serde::{Deserialize, Serialize};

use super::geometry::{GridPos, Slab};
use crate::error::{GridtankError, Result};

/// The playfield. Valid cells are `0..width` by `0..height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arena {
    pub width: i32,
    pub height: i32,
}

impl Arena {
    pub const fn from_cells(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Fit an arena onto a drawing surface, dropping any partial cell at the
    /// right and bottom edges.
    pub fn fit(surface_width: u16, surface_height: u16, cell_width: u16, cell_height: u16) -> Self {
        let cell_width = cell_width.max(1);
        let cell_height = cell_height.max(1);
        let usable_w = surface_width - surface_width % cell_width;
        let usable_h = surface_height - surface_height % cell_height;
        Self::from_cells((usable_w / cell_width) as i32, (usable_h / cell_height) as i32)
    }

    /// Check that a slab of `size` fits at all
    pub fn ensure_fits(&self, size: GridPos) -> Result<()> {
        if self.width < size.x || self.height < size.y {
            return Err(GridtankError::ArenaTooSmall {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Move a slab the least distance needed to bring it fully inside
    pub fn clamp(&self, slab: Slab) -> Slab {
        let max_x = (self.width - slab.size.x).max(0);
        let max_y = (self.height - slab.size.y).max(0);
        Slab {
            pos: GridPos::new(slab.pos.x.clamp(0, max_x), slab.pos.y.clamp(0, max_y)),
            size: slab.size,
        }
    }

    /// Number of distinct top-left positions where a slab of `size` fits
    pub fn placements(&self, size: GridPos) -> (i32, i32) {
        (
            (self.width - size.x + 1).max(0),
            (self.height - size.y + 1).max(0),
        )
    }
}
