//! Behavior system - the foraging state machine for autonomous ants.
//!
//! Idle -> SeekingFood -> CarryingFood -> Idle, with Fighting as an
//! overlay that interrupts any state while a hostile is inside aggro
//! range. "No food", "no path", and "no queen" are ordinary states, never
//! errors: the ant falls back to wandering or direct movement.

use crate::colony::Colonies;
use crate::components::*;
use crate::config::SimConfig;
use crate::path::find_path;
use crate::spatial::SpatialGrid;
use crate::tiles::TileMap;
use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::Rng;

/// Seeded RNG shared by agent behaviors. Worldgen owns its own stream so
/// behavior draws never perturb generation.
#[derive(Resource)]
pub struct SimRng(pub SmallRng);

/// Distance at which a waypoint or wander target counts as reached.
const ARRIVE_RADIUS: f32 = 0.4;
/// Wander targets are picked within this box around the ant.
const WANDER_SPAN: f32 = 5.0;

/// System that drives wander / seek / carry / fight decisions for every
/// autonomous ant. Player steering comes from `player_input_system`
/// afterward; pickup and delivery for the player happen here too, since
/// proximity transfer applies to every ant.
#[allow(clippy::too_many_arguments)]
pub fn behavior_system(
    config: Res<SimConfig>,
    map: Res<TileMap>,
    grid: Res<SpatialGrid>,
    mut rng: ResMut<SimRng>,
    mut colonies: ResMut<Colonies>,
    mut commands: Commands,
    mut ants: Query<
        (
            &Position,
            &ColonyId,
            &AntRole,
            &AntStats,
            &Health,
            &mut BehaviorState,
            &mut AiTarget,
            &mut Velocity,
            &mut AntTimers,
            &mut PathFollow,
            &mut Carrying,
            Option<&PlayerControlled>,
        ),
        Without<FoodSource>,
    >,
    mut food: Query<(Entity, &Position, &mut FoodAmount), With<FoodSource>>,
    queen_positions: Query<&Position, Without<FoodSource>>,
) {
    for (
        pos,
        colony,
        role,
        stats,
        health,
        mut state,
        mut target,
        mut vel,
        mut timers,
        mut path,
        mut carrying,
        player,
    ) in ants.iter_mut()
    {
        if !health.is_alive() {
            continue;
        }

        // Queens hold their chamber; the spawn system owns them.
        if role.is_queen() {
            *vel = Velocity::default();
            continue;
        }

        // Fighting overlay: a hostile in aggro range interrupts anything.
        if let Some(hostile) = grid.nearest_hostile(pos.x, pos.y, stats.aggro_range, colony.0) {
            if *state != BehaviorState::Fighting && carrying.0 > 0.0 {
                // Drop the load where we stand before engaging.
                commands.spawn(FoodBundle::new(pos.x, pos.y, carrying.0));
                carrying.0 = 0.0;
            }
            *state = BehaviorState::Fighting;
            target.hostile = Some(hostile.entity);
            path.clear();

            if player.is_none() {
                let dist = ((hostile.x - pos.x).powi(2) + (hostile.y - pos.y).powi(2)).sqrt();
                *vel = if dist > stats.attack_range {
                    Velocity::aim(pos, (hostile.x, hostile.y), stats.speed)
                } else {
                    Velocity::default()
                };
            }
            continue;
        }
        if *state == BehaviorState::Fighting {
            *state = BehaviorState::Idle;
            target.hostile = None;
        }

        // Proximity transfers apply to the player as well; steering below
        // does not.
        match *state {
            BehaviorState::Idle => {
                if carrying.0 > 0.0 {
                    // Picked up via a drop while idle; deliver it.
                    *state = BehaviorState::CarryingFood;
                } else if food.iter().any(|(_, _, amount)| !amount.is_depleted()) {
                    *state = BehaviorState::SeekingFood;
                    target.food = None;
                } else if player.is_none() {
                    wander(
                        &config, &map, &mut rng, pos, stats, &mut target, &mut vel, &mut timers,
                    );
                }
            }
            BehaviorState::SeekingFood => {
                seek_food(
                    &config, &map, pos, stats, &mut state, &mut target, &mut vel, &mut timers,
                    &mut path, &mut carrying, &mut food, player.is_some(),
                );
            }
            BehaviorState::CarryingFood => {
                carry_home(
                    &config,
                    &map,
                    pos,
                    colony,
                    stats,
                    &mut state,
                    &mut vel,
                    &mut timers,
                    &mut path,
                    &mut carrying,
                    &mut colonies,
                    &queen_positions,
                    player.is_some(),
                );
            }
            BehaviorState::Fighting => {}
        }
    }
}

/// Pick a fresh nearby point every `wander_interval` and walk toward it.
#[allow(clippy::too_many_arguments)]
fn wander(
    config: &SimConfig,
    map: &TileMap,
    rng: &mut SimRng,
    pos: &Position,
    stats: &AntStats,
    target: &mut AiTarget,
    vel: &mut Velocity,
    timers: &mut AntTimers,
) {
    if timers.wander <= 0.0 || target.wander_point.is_none() {
        let x = (pos.x + rng.0.gen_range(-WANDER_SPAN..WANDER_SPAN))
            .clamp(0.5, map.0.width as f32 - 0.5);
        let y = (pos.y + rng.0.gen_range(-WANDER_SPAN..WANDER_SPAN))
            .clamp(0.5, map.0.height as f32 - 0.5);
        target.wander_point = Some((x, y));
        timers.wander = config.wander_interval;
    }

    if let Some(point) = target.wander_point {
        let dist = ((point.0 - pos.x).powi(2) + (point.1 - pos.y).powi(2)).sqrt();
        if dist < ARRIVE_RADIUS {
            target.wander_point = None;
            *vel = Velocity::default();
        } else {
            *vel = Velocity::aim(pos, point, stats.speed * 0.6);
        }
    }
}

/// Route to the nearest non-depleted food source and transfer on arrival.
#[allow(clippy::too_many_arguments)]
fn seek_food(
    config: &SimConfig,
    map: &TileMap,
    pos: &Position,
    stats: &AntStats,
    state: &mut BehaviorState,
    target: &mut AiTarget,
    vel: &mut Velocity,
    timers: &mut AntTimers,
    path: &mut PathFollow,
    carrying: &mut Carrying,
    food: &mut Query<(Entity, &Position, &mut FoodAmount), With<FoodSource>>,
    is_player: bool,
) {
    // Re-resolve a stale target; nearest by linear scan, ties broken by
    // first-found (accepted non-determinism).
    let resolved = target
        .food
        .and_then(|e| food.get(e).ok().map(|(e, p, a)| (e, *p, a.amount)))
        .filter(|(_, _, amount)| *amount > 0.0);
    let chosen = resolved.or_else(|| {
        let mut best: Option<(Entity, Position, f32)> = None;
        let mut best_dist = f32::MAX;
        for (entity, food_pos, amount) in food.iter() {
            if amount.is_depleted() {
                continue;
            }
            let dist = pos.distance_to(food_pos);
            if dist < best_dist {
                best_dist = dist;
                best = Some((entity, *food_pos, amount.amount));
            }
        }
        best
    });

    let Some((food_entity, food_pos, _)) = chosen else {
        // Nothing left to forage; not an error.
        *state = BehaviorState::Idle;
        target.food = None;
        path.clear();
        return;
    };
    target.food = Some(food_entity);

    if pos.distance_to(&food_pos) < config.pickup_radius {
        if let Ok((_, _, mut amount)) = food.get_mut(food_entity) {
            carrying.0 = amount.take(stats.carry_capacity);
        }
        *state = BehaviorState::CarryingFood;
        target.food = None;
        path.clear();
        // Input owns player velocity, even on the transfer tick.
        if !is_player {
            *vel = Velocity::default();
        }
        return;
    }

    if !is_player {
        steer_along_path(config, map, pos, stats, (food_pos.x, food_pos.y), vel, timers, path);
    }
}

/// Head back to the queen and deposit into the colony stockpile.
#[allow(clippy::too_many_arguments)]
fn carry_home(
    config: &SimConfig,
    map: &TileMap,
    pos: &Position,
    colony: &ColonyId,
    stats: &AntStats,
    state: &mut BehaviorState,
    vel: &mut Velocity,
    timers: &mut AntTimers,
    path: &mut PathFollow,
    carrying: &mut Carrying,
    colonies: &mut Colonies,
    queen_positions: &Query<&Position, Without<FoodSource>>,
    is_player: bool,
) {
    let queen = colonies.get(colony.0).and_then(|c| c.queen);
    let Some(queen_pos) = queen.and_then(|q| queen_positions.get(q).ok()).copied() else {
        // Queenless colony: hold the food and go idle.
        *state = BehaviorState::Idle;
        path.clear();
        return;
    };

    if pos.distance_to(&queen_pos) < config.delivery_radius {
        if let Some(colony) = colonies.get_mut(colony.0) {
            colony.deposit(carrying.0);
        }
        carrying.0 = 0.0;
        *state = BehaviorState::Idle;
        path.clear();
        if !is_player {
            *vel = Velocity::default();
        }
        return;
    }

    if !is_player {
        steer_along_path(
            config,
            map,
            pos,
            stats,
            (queen_pos.x, queen_pos.y),
            vel,
            timers,
            path,
        );
    }
}

/// Follow the current path toward a goal, recomputing it on the recalc
/// interval. When no path exists the ant aims straight at the goal and
/// lets the movement system dig through whatever blocks it.
#[allow(clippy::too_many_arguments)]
fn steer_along_path(
    config: &SimConfig,
    map: &TileMap,
    pos: &Position,
    stats: &AntStats,
    goal: (f32, f32),
    vel: &mut Velocity,
    timers: &mut AntTimers,
    path: &mut PathFollow,
) {
    if timers.path <= 0.0 {
        match find_path(
            &map.0,
            (pos.x, pos.y),
            goal,
            config.pathfind_iteration_cap,
        ) {
            Some(waypoints) => path.set(waypoints),
            None => path.clear(),
        }
        timers.path = config.path_recalc_interval;
    }

    while let Some(wp) = path.current() {
        let dist = ((wp.0 - pos.x).powi(2) + (wp.1 - pos.y).powi(2)).sqrt();
        if dist < ARRIVE_RADIUS {
            path.advance();
        } else {
            *vel = Velocity::aim(pos, wp, stats.speed);
            return;
        }
    }

    // Direct fallback; blocked tiles become dig targets.
    *vel = Velocity::aim(pos, goal, stats.speed);
}
