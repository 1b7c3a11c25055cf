//! Grid pathfinding over currently-dug tiles.
//!
//! A* on the 8-connected neighborhood of passable tiles. The heuristic is
//! Manhattan distance, which overestimates diagonal travel; that trades
//! strict optimality for fewer expansions, accepted for agent steering.
//! A hard expansion cap bounds worst-case cost on disconnected maps.

use crate::tiles::TileGrid;
use std::collections::BinaryHeap;
use std::collections::HashMap;

const AXIS_COST: f32 = 1.0;
const DIAGONAL_COST: f32 = 1.414;

/// The 8-connected neighborhood with per-step costs.
const NEIGHBORS: [(i32, i32, f32); 8] = [
    (1, 0, AXIS_COST),
    (-1, 0, AXIS_COST),
    (0, 1, AXIS_COST),
    (0, -1, AXIS_COST),
    (1, 1, DIAGONAL_COST),
    (1, -1, DIAGONAL_COST),
    (-1, 1, DIAGONAL_COST),
    (-1, -1, DIAGONAL_COST),
];

/// Open-set entry ordered by estimated total cost, inverted so the
/// standard max-heap pops the cheapest node first.
struct OpenNode {
    tile: (i32, i32),
    f: f32,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other.f.total_cmp(&self.f)
    }
}

fn heuristic(a: (i32, i32), b: (i32, i32)) -> f32 {
    ((a.0 - b.0).abs() + (a.1 - b.1).abs()) as f32
}

/// Find a path between two world positions over passable tiles.
///
/// Returns tile-center waypoints excluding the start tile and including
/// the goal tile, or `None` when either endpoint is impassable, no route
/// exists, or the expansion cap is exhausted. "No path" is an ordinary
/// outcome, not an error: callers fall back to direct movement with
/// digging.
pub fn find_path(
    grid: &TileGrid,
    start: (f32, f32),
    goal: (f32, f32),
    iteration_cap: usize,
) -> Option<Vec<(f32, f32)>> {
    let start_tile = TileGrid::world_to_tile(start.0, start.1);
    let goal_tile = TileGrid::world_to_tile(goal.0, goal.1);

    if !grid.is_tile_passable(start_tile.0, start_tile.1)
        || !grid.is_tile_passable(goal_tile.0, goal_tile.1)
    {
        return None;
    }
    if start_tile == goal_tile {
        return Some(vec![TileGrid::tile_center(goal_tile.0, goal_tile.1)]);
    }

    let mut open = BinaryHeap::new();
    let mut g_score: HashMap<(i32, i32), f32> = HashMap::new();
    let mut parent: HashMap<(i32, i32), (i32, i32)> = HashMap::new();

    g_score.insert(start_tile, 0.0);
    open.push(OpenNode {
        tile: start_tile,
        f: heuristic(start_tile, goal_tile),
    });

    let mut expansions = 0;
    while let Some(OpenNode { tile, .. }) = open.pop() {
        if tile == goal_tile {
            return Some(reconstruct(&parent, start_tile, goal_tile));
        }

        expansions += 1;
        if expansions > iteration_cap {
            return None;
        }

        // Stale heap entries are skipped by comparing against the best
        // known cost rather than tracking a closed set.
        let current_g = g_score[&tile];

        for (dx, dy, step_cost) in NEIGHBORS {
            let next = (tile.0 + dx, tile.1 + dy);
            if !grid.is_tile_passable(next.0, next.1) {
                continue;
            }
            let tentative = current_g + step_cost;
            if g_score.get(&next).map_or(true, |&g| tentative < g) {
                g_score.insert(next, tentative);
                parent.insert(next, tile);
                open.push(OpenNode {
                    tile: next,
                    f: tentative + heuristic(next, goal_tile),
                });
            }
        }
    }

    None
}

/// Walk parent pointers back from the goal, then reverse. The start tile
/// is excluded; the goal tile is included.
fn reconstruct(
    parent: &HashMap<(i32, i32), (i32, i32)>,
    start: (i32, i32),
    goal: (i32, i32),
) -> Vec<(f32, f32)> {
    let mut tiles = vec![goal];
    let mut current = goal;
    while let Some(&prev) = parent.get(&current) {
        if prev == start {
            break;
        }
        tiles.push(prev);
        current = prev;
    }
    tiles.reverse();
    tiles
        .into_iter()
        .map(|(tx, ty)| TileGrid::tile_center(tx, ty))
        .collect()
}
