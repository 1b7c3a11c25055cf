//! Movement system - velocity integration against the destructible grid.
//!
//! Blocked movement is not an error: an ant pressing against dirt feeds
//! dig effort into the tile instead of moving, so sustained pressure
//! eventually opens a path. Self-service tunneling is the primary way
//! agents expand reachable territory.

use crate::components::*;
use crate::tiles::{TileGrid, TileMap};
use bevy_ecs::prelude::*;

/// Resource containing the delta time for the current tick.
#[derive(Resource, Default)]
pub struct DeltaTime(pub f32);

/// Normalized input direction for the player ant, replaced once per tick
/// by the input collaborator. Keyboard and touch sources are equivalent
/// after normalization.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct InputState {
    pub dx: f32,
    pub dy: f32,
}

impl InputState {
    /// Clamp each axis to [-1, 1] and normalize diagonals to unit length.
    pub fn normalized(dx: f32, dy: f32) -> Self {
        let dx = dx.clamp(-1.0, 1.0);
        let dy = dy.clamp(-1.0, 1.0);
        let mag = (dx * dx + dy * dy).sqrt();
        if mag > 1.0 {
            Self {
                dx: dx / mag,
                dy: dy / mag,
            }
        } else {
            Self { dx, dy }
        }
    }
}

/// How far ahead of the ant dig effort lands, in tiles.
const DIG_REACH: f32 = 0.6;

/// System that turns the tick's input direction into player velocity.
/// The behavior system never steers the player; this is the only writer
/// of player velocity.
pub fn player_input_system(
    input: Res<InputState>,
    mut query: Query<(&mut Velocity, &AntStats, &Health), With<PlayerControlled>>,
) {
    for (mut vel, stats, health) in query.iter_mut() {
        if !health.is_alive() {
            continue;
        }
        vel.vx = input.dx * stats.speed;
        vel.vy = input.dy * stats.speed;
    }
}

/// System that advances per-ant countdown timers.
pub fn timer_tick_system(dt: Res<DeltaTime>, mut query: Query<&mut AntTimers>) {
    for mut timers in query.iter_mut() {
        timers.tick(dt.0);
    }
}

/// System that applies velocity to position, digging where blocked.
///
/// The candidate position is committed only when its tile is passable.
/// Otherwise dig effort scaled by `dig_power * dt` is applied at a point
/// offset along the movement direction; on diagonal moves both
/// axis-aligned blocking tiles receive effort so ants cannot corner-lock.
pub fn movement_system(
    dt: Res<DeltaTime>,
    mut map: ResMut<TileMap>,
    mut query: Query<(&mut Position, &Velocity, &AntStats, &Health)>,
) {
    let delta = dt.0;
    for (mut pos, vel, stats, health) in query.iter_mut() {
        if !health.is_alive() {
            continue;
        }
        let speed = vel.magnitude();
        if speed < 1e-4 {
            continue;
        }

        let next_x = pos.x + vel.vx * delta;
        let next_y = pos.y + vel.vy * delta;

        if map.0.is_passable(next_x, next_y) {
            pos.x = clamp_to_world(next_x, map.0.width);
            pos.y = clamp_to_world(next_y, map.0.height);
            continue;
        }

        // Blocked: convert the move into dig effort ahead of the ant.
        let power = stats.dig_power * delta;
        if power <= 0.0 {
            continue;
        }
        let dig_x = pos.x + vel.vx / speed * DIG_REACH;
        let dig_y = pos.y + vel.vy / speed * DIG_REACH;
        map.0.dig(dig_x, dig_y, power);

        // Diagonal moves also work both axis-aligned tiles.
        let (cur_tx, cur_ty) = TileGrid::world_to_tile(pos.x, pos.y);
        let (next_tx, next_ty) = TileGrid::world_to_tile(dig_x, dig_y);
        if cur_tx != next_tx && cur_ty != next_ty {
            if !map.0.is_tile_passable(next_tx, cur_ty) {
                let (cx, cy) = TileGrid::tile_center(next_tx, cur_ty);
                map.0.dig(cx, cy, power);
            }
            if !map.0.is_tile_passable(cur_tx, next_ty) {
                let (cx, cy) = TileGrid::tile_center(cur_tx, next_ty);
                map.0.dig(cx, cy, power);
            }
        }
    }
}

fn clamp_to_world(v: f32, extent: usize) -> f32 {
    v.clamp(0.0, extent as f32 - 1e-3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::{Tile, TileGrid};

    fn world_with_grid(grid: TileGrid) -> World {
        let mut world = World::new();
        world.insert_resource(DeltaTime(0.1));
        world.insert_resource(TileMap(grid));
        world
    }

    fn walking_ant(world: &mut World, x: f32, y: f32, vx: f32, vy: f32) -> Entity {
        world
            .spawn((
                Position::new(x, y),
                Velocity::new(vx, vy),
                AntStats::default(),
                Health::new(50.0),
            ))
            .id()
    }

    #[test]
    fn test_moves_through_open_tiles() {
        let mut world = world_with_grid(TileGrid::new(10, 10));
        let ant = walking_ant(&mut world, 2.0, 2.0, 3.0, 0.0);

        let mut schedule = Schedule::default();
        schedule.add_systems(movement_system);
        schedule.run(&mut world);

        let pos = world.get::<Position>(ant).unwrap();
        assert!((pos.x - 2.3).abs() < 1e-5);
        assert_eq!(pos.y, 2.0);
    }

    #[test]
    fn test_blocked_move_digs_instead() {
        let mut grid = TileGrid::new(10, 10);
        // Wall tile directly to the right of the ant.
        *grid.get_tile_mut(3, 2).unwrap() = Tile::dirt(1.0);
        let mut world = world_with_grid(grid);
        let ant = walking_ant(&mut world, 2.9, 2.5, 3.0, 0.0);

        let mut schedule = Schedule::default();
        schedule.add_systems(movement_system);
        schedule.run(&mut world);

        // Did not move, but the wall accumulated progress.
        let pos = world.get::<Position>(ant).unwrap();
        assert_eq!(pos.x, 2.9);
        let map = world.resource::<TileMap>();
        let progress = map.0.get_tile(3, 2).unwrap().dig_progress;
        assert!(progress > 0.0);
    }

    #[test]
    fn test_sustained_pressure_breaks_through() {
        let mut grid = TileGrid::new(10, 10);
        *grid.get_tile_mut(3, 2).unwrap() = Tile::dirt(0.5);
        let mut world = world_with_grid(grid);
        let ant = walking_ant(&mut world, 2.9, 2.5, 3.0, 0.0);

        let mut schedule = Schedule::default();
        schedule.add_systems(movement_system);
        // Default dig power 1.0 at dt 0.1: hardness 0.5 falls in 5 ticks.
        for _ in 0..6 {
            schedule.run(&mut world);
        }

        let map = world.resource::<TileMap>();
        assert!(map.0.is_tile_passable(3, 2));
        // And the next run walks through.
        schedule.run(&mut world);
        let pos = world.get::<Position>(ant).unwrap();
        assert!(pos.x > 2.9);
    }

    #[test]
    fn test_diagonal_block_digs_both_axis_tiles() {
        let mut grid = TileGrid::new(10, 10);
        *grid.get_tile_mut(3, 3).unwrap() = Tile::dirt(5.0);
        *grid.get_tile_mut(3, 2).unwrap() = Tile::dirt(5.0);
        *grid.get_tile_mut(2, 3).unwrap() = Tile::dirt(5.0);
        let mut world = world_with_grid(grid);
        walking_ant(&mut world, 2.9, 2.9, 2.0, 2.0);

        let mut schedule = Schedule::default();
        schedule.add_systems(movement_system);
        schedule.run(&mut world);

        let map = world.resource::<TileMap>();
        assert!(map.0.get_tile(3, 2).unwrap().dig_progress > 0.0);
        assert!(map.0.get_tile(2, 3).unwrap().dig_progress > 0.0);
    }

    #[test]
    fn test_input_normalization() {
        let diag = InputState::normalized(1.0, 1.0);
        let mag = (diag.dx * diag.dx + diag.dy * diag.dy).sqrt();
        assert!((mag - 1.0).abs() < 1e-5);

        let axis = InputState::normalized(0.5, 0.0);
        assert_eq!(axis.dx, 0.5);

        let wild = InputState::normalized(5.0, -5.0);
        assert!(wild.dx <= 1.0 && wild.dy >= -1.0);
    }
}
