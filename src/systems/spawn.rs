//! Queen spawn system - the colony growth economy.
//!
//! A queen accumulates time on her spawn timer; once the cooldown has
//! elapsed and the stockpile covers the food cost, she produces one
//! worker next to her chamber. Insufficient food simply holds the timer
//! at ready.

use crate::colony::Colonies;
use crate::components::*;
use crate::config::SimConfig;
use crate::systems::behavior::SimRng;
use crate::systems::movement::DeltaTime;
use crate::tiles::TileMap;
use bevy_ecs::prelude::*;
use rand::Rng;

/// Attempts at finding a passable tile next to the queen before falling
/// back to her own position.
const PLACEMENT_RETRIES: usize = 8;

/// System that spawns workers from queens on a food-gated cooldown.
pub fn queen_spawn_system(
    dt: Res<DeltaTime>,
    config: Res<SimConfig>,
    map: Res<TileMap>,
    mut rng: ResMut<SimRng>,
    mut colonies: ResMut<Colonies>,
    mut ids: ResMut<AntIdGen>,
    mut commands: Commands,
    mut queens: Query<(&Position, &ColonyId, &AntRole, &Health, &mut SpawnTimer)>,
) {
    for (pos, colony_id, role, health, mut timer) in queens.iter_mut() {
        if !role.is_queen() || !health.is_alive() {
            continue;
        }
        timer.0 += dt.0;
        if timer.0 < config.queen_spawn_cooldown {
            continue;
        }

        let Some(colony) = colonies.get_mut(colony_id.0) else {
            continue;
        };
        if !colony.try_spend(config.food_per_worker) {
            // Stay ready until a delivery covers the cost.
            continue;
        }

        let (x, y) = hatch_point(&map, &mut rng, pos);
        let worker_role = match role {
            AntRole::Queen => AntRole::Worker,
            _ => AntRole::EnemyWorker,
        };
        let worker = commands
            .spawn(AntBundle::new(
                ids.next(),
                worker_role,
                *colony_id,
                x,
                y,
                config.max_health(worker_role),
                config.stats_for(worker_role),
            ))
            .id();
        colony.workers.push(worker);
        timer.0 = 0.0;
    }
}

/// Pick a passable tile near the queen, falling back to her position.
fn hatch_point(map: &TileMap, rng: &mut SimRng, queen: &Position) -> (f32, f32) {
    for _ in 0..PLACEMENT_RETRIES {
        let x = queen.x + rng.0.gen_range(-2.0..2.0f32);
        let y = queen.y + rng.0.gen_range(-2.0..2.0f32);
        if map.0.is_passable(x, y) {
            return (x, y);
        }
    }
    (queen.x, queen.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::TileGrid;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn spawn_world() -> World {
        let mut world = World::new();
        world.insert_resource(SimConfig::default());
        world.insert_resource(DeltaTime(1.0));
        world.insert_resource(TileMap(TileGrid::new(20, 20)));
        world.insert_resource(SimRng(SmallRng::seed_from_u64(3)));
        world.insert_resource(Colonies::default());
        world.insert_resource(AntIdGen::default());
        world
    }

    fn place_queen(world: &mut World, colony: u32, food: f32) -> Entity {
        let config = SimConfig::default();
        let queen = world
            .spawn((
                AntBundle::new(
                    AntId(0),
                    AntRole::Queen,
                    ColonyId(colony),
                    10.0,
                    10.0,
                    config.max_health(AntRole::Queen),
                    config.stats_for(AntRole::Queen),
                ),
                SpawnTimer::default(),
            ))
            .id();
        let mut colonies = world.resource_mut::<Colonies>();
        let entry = colonies.insert(colony);
        entry.queen = Some(queen);
        entry.food = food;
        queen
    }

    fn worker_count(world: &mut World) -> usize {
        world
            .query::<&AntRole>()
            .iter(world)
            .filter(|r| **r == AntRole::Worker)
            .count()
    }

    #[test]
    fn test_spawn_costs_food_and_adds_one_worker() {
        let mut world = spawn_world();
        place_queen(&mut world, 0, 25.0);

        let mut schedule = Schedule::default();
        schedule.add_systems(queen_spawn_system);
        // Cooldown is 10s; dt is 1s per run.
        for _ in 0..10 {
            schedule.run(&mut world);
        }

        assert_eq!(worker_count(&mut world), 1);
        let colony = world.resource::<Colonies>().get(0).unwrap().clone();
        assert_eq!(colony.food, 5.0);
        assert_eq!(colony.workers.len(), 1);
    }

    #[test]
    fn test_no_food_holds_the_timer_ready() {
        let mut world = spawn_world();
        let queen = place_queen(&mut world, 0, 10.0);

        let mut schedule = Schedule::default();
        schedule.add_systems(queen_spawn_system);
        for _ in 0..30 {
            schedule.run(&mut world);
        }
        assert_eq!(worker_count(&mut world), 0);

        // A delivery arrives; the very next tick hatches a worker.
        world.resource_mut::<Colonies>().get_mut(0).unwrap().deposit(10.0);
        schedule.run(&mut world);
        assert_eq!(worker_count(&mut world), 1);
        assert_eq!(world.get::<SpawnTimer>(queen).unwrap().0, 0.0);
    }

    #[test]
    fn test_enemy_queen_hatches_enemy_workers() {
        let mut world = spawn_world();
        let config = SimConfig::default();
        let queen = world
            .spawn((
                AntBundle::new(
                    AntId(0),
                    AntRole::EnemyQueen,
                    ColonyId(1),
                    10.0,
                    10.0,
                    config.max_health(AntRole::EnemyQueen),
                    config.stats_for(AntRole::EnemyQueen),
                ),
                SpawnTimer(9.5),
            ))
            .id();
        {
            let mut colonies = world.resource_mut::<Colonies>();
            let entry = colonies.insert(1);
            entry.queen = Some(queen);
            entry.food = 20.0;
        }

        let mut schedule = Schedule::default();
        schedule.add_systems(queen_spawn_system);
        schedule.run(&mut world);

        let roles: Vec<AntRole> = world
            .query::<&AntRole>()
            .iter(&world)
            .copied()
            .filter(|r| !r.is_queen())
            .collect();
        assert_eq!(roles, vec![AntRole::EnemyWorker]);
    }

    #[test]
    fn test_hatch_point_is_passable() {
        let mut grid = TileGrid::new(20, 20);
        // Wall off everything except the queen's own tile.
        for ty in 0..20 {
            for tx in 0..20 {
                if (tx, ty) != (10, 10) {
                    *grid.get_tile_mut(tx, ty).unwrap() = crate::tiles::Tile::dirt(1.0);
                }
            }
        }
        let map = TileMap(grid);
        let mut rng = SimRng(SmallRng::seed_from_u64(5));
        let queen = Position::new(10.5, 10.5);

        let (x, y) = hatch_point(&map, &mut rng, &queen);
        assert!(map.0.is_passable(x, y));
    }
}
