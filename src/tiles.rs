//! Tile grid - the destructible underground world.
//!
//! The world is a fixed-size grid of dirt and air tiles. Dirt carries a
//! hardness that grows with depth and accumulates dig progress until it
//! breaks through to air. The grid is the only owner of tile state; all
//! mutation goes through [`TileGrid::dig`].

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Resource wrapper so systems can query and dig the shared grid.
#[derive(Resource, Debug, Clone)]
pub struct TileMap(pub TileGrid);

/// What a tile is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    /// Solid diggable earth.
    Dirt,
    /// Open space - passable.
    Air,
}

/// A single cell of the world.
///
/// Invariant: `dug == true` exactly when `kind == Air`. `dig_progress`
/// is only meaningful while the tile is still dirt and never decreases.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    pub dug: bool,
    /// Effort required to break through this tile.
    pub hardness: f32,
    /// Accumulated dig effort so far.
    pub dig_progress: f32,
}

impl Tile {
    /// A solid dirt tile with the given hardness.
    pub fn dirt(hardness: f32) -> Self {
        Self {
            kind: TileKind::Dirt,
            dug: false,
            hardness,
            dig_progress: 0.0,
        }
    }

    /// An open air tile (counts as dug).
    pub fn air() -> Self {
        Self {
            kind: TileKind::Air,
            dug: true,
            hardness: 0.0,
            dig_progress: 0.0,
        }
    }

    pub fn is_passable(&self) -> bool {
        self.dug || self.kind == TileKind::Air
    }
}

/// Fixed-size grid of tiles (row-major order).
///
/// Positions are continuous floats in tile units: tile `(x, y)` covers
/// `[x, x+1) x [y, y+1)` and its center is `(x + 0.5, y + 0.5)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileGrid {
    pub width: usize,
    pub height: usize,
    cells: Vec<Tile>,
    /// Bumped whenever a tile opens, so render collaborators can skip
    /// re-reading unchanged terrain.
    #[serde(skip)]
    revision: u64,
}

impl TileGrid {
    /// Create a grid filled with air (world generation fills it in).
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Tile::air(); width * height],
            revision: 0,
        }
    }

    /// Change counter for the grid; advances whenever a tile opens.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn cell_index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            Some(y as usize * self.width + x as usize)
        } else {
            None
        }
    }

    /// Floor world coordinates to tile indices.
    #[inline]
    pub fn world_to_tile(x: f32, y: f32) -> (i32, i32) {
        (x.floor() as i32, y.floor() as i32)
    }

    /// Center of a tile in world coordinates.
    #[inline]
    pub fn tile_center(tx: i32, ty: i32) -> (f32, f32) {
        (tx as f32 + 0.5, ty as f32 + 0.5)
    }

    /// Get the tile under a world position. Out of range reads return
    /// `None`, which every caller treats as impassable and non-diggable.
    pub fn get(&self, x: f32, y: f32) -> Option<&Tile> {
        let (tx, ty) = Self::world_to_tile(x, y);
        self.get_tile(tx, ty)
    }

    /// Get a tile by integer indices.
    pub fn get_tile(&self, tx: i32, ty: i32) -> Option<&Tile> {
        self.cell_index(tx, ty).map(|i| &self.cells[i])
    }

    pub(crate) fn get_tile_mut(&mut self, tx: i32, ty: i32) -> Option<&mut Tile> {
        self.cell_index(tx, ty).map(|i| &mut self.cells[i])
    }

    /// Whether the tile under a world position can be walked through.
    pub fn is_passable(&self, x: f32, y: f32) -> bool {
        self.get(x, y).map(|t| t.is_passable()).unwrap_or(false)
    }

    /// Whether a tile by integer indices can be walked through.
    pub fn is_tile_passable(&self, tx: i32, ty: i32) -> bool {
        self.get_tile(tx, ty).map(|t| t.is_passable()).unwrap_or(false)
    }

    /// Apply dig effort to the tile under a world position.
    ///
    /// No-op (returns `false`) when out of bounds, already dug, or not
    /// dirt. Otherwise accumulates progress; returns `true` exactly on the
    /// call where progress reaches hardness and the tile breaks through to
    /// air, and `false` while still digging.
    pub fn dig(&mut self, x: f32, y: f32, power: f32) -> bool {
        let (tx, ty) = Self::world_to_tile(x, y);
        let Some(idx) = self.cell_index(tx, ty) else {
            return false;
        };
        let tile = &mut self.cells[idx];
        if tile.dug || tile.kind != TileKind::Dirt {
            return false;
        }

        tile.dig_progress += power;
        if tile.dig_progress >= tile.hardness {
            tile.kind = TileKind::Air;
            tile.dug = true;
            self.revision += 1;
            true
        } else {
            false
        }
    }

    /// Unconditionally open a tile (world generation only).
    pub(crate) fn carve(&mut self, tx: i32, ty: i32) {
        if let Some(idx) = self.cell_index(tx, ty) {
            let tile = &mut self.cells[idx];
            if !tile.is_passable() {
                tile.kind = TileKind::Air;
                tile.dug = true;
                self.revision += 1;
            }
        }
    }

    /// Count passable tiles within a square radius of a tile, excluding
    /// the tile itself. Used by placement scoring.
    pub fn dug_neighbor_count(&self, tx: i32, ty: i32, radius: i32) -> usize {
        let mut count = 0;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx == 0 && dy == 0 {
                    continue;
                }
                if self.is_tile_passable(tx + dx, ty + dy) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Iterate all tiles with their indices.
    pub fn iter_tiles(&self) -> impl Iterator<Item = (i32, i32, &Tile)> {
        self.cells.iter().enumerate().map(|(i, tile)| {
            let tx = (i % self.width) as i32;
            let ty = (i / self.width) as i32;
            (tx, ty, tile)
        })
    }
}

/// Flattened serializable view of the grid for the render collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileSnapshot {
    pub width: usize,
    pub height: usize,
    /// Passability per tile, row-major.
    pub passable: Vec<bool>,
    /// Hardness per tile, row-major (0.0 for air).
    pub hardness: Vec<f32>,
}

impl TileSnapshot {
    pub fn from_grid(grid: &TileGrid) -> Self {
        Self {
            width: grid.width,
            height: grid.height,
            passable: grid.cells.iter().map(|t| t.is_passable()).collect(),
            hardness: grid.cells.iter().map(|t| t.hardness).collect(),
        }
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
