//! Spatial partitioning for hostile-detection queries.
//!
//! Divides the world into buckets and tracks which ants are in each, so
//! aggro scans check nearby buckets instead of every ant. Food targeting
//! deliberately stays a linear scan (see the behavior system) to keep its
//! first-found tie-break.

use bevy_ecs::prelude::*;
use std::collections::HashMap;

/// Grid-based spatial partitioning over ant positions, rebuilt each tick.
#[derive(Resource, Debug)]
pub struct SpatialGrid {
    /// Bucket size in tile units.
    pub cell_size: f32,
    cells: HashMap<(i32, i32), Vec<SpatialEntry>>,
    entity_cells: HashMap<Entity, (i32, i32)>,
}

/// Entry in a spatial bucket.
#[derive(Debug, Clone, Copy)]
pub struct SpatialEntry {
    pub entity: Entity,
    pub x: f32,
    pub y: f32,
    pub colony: u32,
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(8.0)
    }
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            entity_cells: HashMap::new(),
        }
    }

    #[inline]
    pub fn world_to_cell(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    /// Clear all entries before rebuilding.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.entity_cells.clear();
    }

    /// Insert an ant at a position.
    pub fn insert(&mut self, entity: Entity, x: f32, y: f32, colony: u32) {
        let cell = self.world_to_cell(x, y);

        if let Some(&old_cell) = self.entity_cells.get(&entity) {
            if old_cell != cell {
                if let Some(entries) = self.cells.get_mut(&old_cell) {
                    entries.retain(|e| e.entity != entity);
                }
            }
        }

        let entry = SpatialEntry {
            entity,
            x,
            y,
            colony,
        };
        self.cells.entry(cell).or_default().push(entry);
        self.entity_cells.insert(entity, cell);
    }

    /// Query all ants within a radius of a point, closest first.
    pub fn query_radius(&self, x: f32, y: f32, radius: f32) -> Vec<SpatialEntry> {
        let radius_sq = radius * radius;
        let cells_to_check = (radius / self.cell_size).ceil() as i32 + 1;
        let center_cell = self.world_to_cell(x, y);

        let mut results = Vec::new();
        for dx in -cells_to_check..=cells_to_check {
            for dy in -cells_to_check..=cells_to_check {
                let cell = (center_cell.0 + dx, center_cell.1 + dy);
                if let Some(entries) = self.cells.get(&cell) {
                    for entry in entries {
                        let dist_sq = (entry.x - x).powi(2) + (entry.y - y).powi(2);
                        if dist_sq <= radius_sq {
                            results.push(*entry);
                        }
                    }
                }
            }
        }

        results.sort_by(|a, b| {
            let dist_a = (a.x - x).powi(2) + (a.y - y).powi(2);
            let dist_b = (b.x - x).powi(2) + (b.y - y).powi(2);
            dist_a.partial_cmp(&dist_b).unwrap_or(std::cmp::Ordering::Equal)
        });
        results
    }

    /// Query ants of other colonies within a radius, closest first.
    pub fn query_hostiles(&self, x: f32, y: f32, radius: f32, my_colony: u32) -> Vec<SpatialEntry> {
        let mut results = self.query_radius(x, y, radius);
        results.retain(|e| e.colony != my_colony);
        results
    }

    /// Nearest ant of another colony within the radius.
    pub fn nearest_hostile(
        &self,
        x: f32,
        y: f32,
        max_radius: f32,
        my_colony: u32,
    ) -> Option<SpatialEntry> {
        self.query_hostiles(x, y, max_radius, my_colony)
            .into_iter()
            .next()
    }

    pub fn total_count(&self) -> usize {
        self.entity_cells.len()
    }
}

/// System that rebuilds the spatial grid each tick from living ants.
pub fn spatial_grid_update_system(
    mut grid: ResMut<SpatialGrid>,
    query: Query<(
        Entity,
        &crate::components::Position,
        &crate::components::ColonyId,
        &crate::components::Health,
    )>,
) {
    grid.clear();
    for (entity, pos, colony, health) in query.iter() {
        if !health.is_alive() {
            continue;
        }
        grid.insert(entity, pos.x, pos.y, colony.0);
    }
}
