//! Public API for the simulation.
//!
//! [`SimWorld`] is the single entry point an embedder needs: build a
//! world from a config, feed it input and real-time deltas, and read
//! back snapshots. The simulation advances on a fixed timestep driven by
//! an accumulator, so agent behavior is framerate-independent.

use crate::colony::{Colonies, PLAYER_COLONY_ID};
use crate::components::*;
use crate::config::SimConfig;
use crate::spatial::{spatial_grid_update_system, SpatialGrid};
use crate::systems::behavior::{behavior_system, SimRng};
use crate::systems::combat::combat_system;
use crate::systems::lifecycle::lifecycle_system;
use crate::systems::movement::{
    movement_system, player_input_system, timer_tick_system, DeltaTime, InputState,
};
use crate::systems::spawn::queen_spawn_system;
use crate::tiles::{TileMap, TileSnapshot};
use crate::world::Snapshot;
use crate::worldgen::generate;
use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

pub use crate::systems::lifecycle::RunOutcome;

/// The complete simulation: ECS world, fixed-order schedule, and the
/// fixed-timestep clock.
pub struct SimWorld {
    world: World,
    schedule: Schedule,
    tick: u64,
    time: f32,
    accumulator: f32,
    /// Grid revision captured by the last `tile_snapshot` call.
    tile_revision_seen: u64,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SimWorld {
    /// Build a world with default configuration.
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    /// Build a world from a config. A fixed `rng_seed` reproduces the
    /// terrain and every behavior decision exactly.
    pub fn with_config(config: SimConfig) -> Self {
        let seed = config.rng_seed.unwrap_or_else(rand::random);
        let generated = generate(&config, seed);

        let mut world = World::new();
        world.insert_resource(DeltaTime(config.fixed_timestep));
        world.insert_resource(InputState::default());
        world.insert_resource(SpatialGrid::default());
        world.insert_resource(Colonies::default());
        world.insert_resource(AntIdGen::default());
        // Behavior draws from its own stream so they never interleave
        // with the generation draws.
        world.insert_resource(SimRng(SmallRng::seed_from_u64(seed.wrapping_add(1))));
        world.insert_resource(RunOutcome::default());
        world.insert_resource(TileMap(generated.grid));

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                spatial_grid_update_system,
                timer_tick_system,
                player_input_system,
                behavior_system,
                queen_spawn_system,
                movement_system,
                combat_system,
                lifecycle_system,
            )
                .chain(),
        );

        let mut sim = Self {
            world,
            schedule,
            tick: 0,
            time: 0.0,
            accumulator: 0.0,
            tile_revision_seen: 0,
        };
        sim.populate(&config, &generated.colony_anchor, &generated.enemy_nests);
        for &(x, y) in &generated.food_spots {
            sim.world.spawn(FoodBundle::new(x, y, config.food_source_amount));
        }
        sim.world.insert_resource(config);
        sim
    }

    /// Spawn the player colony at the starting chamber and one enemy
    /// colony per nest.
    fn populate(&mut self, config: &SimConfig, anchor: &(f32, f32), nests: &[(f32, f32)]) {
        self.spawn_colony(
            config,
            PLAYER_COLONY_ID,
            *anchor,
            AntRole::Queen,
            AntRole::Worker,
            config.starting_workers,
            true,
        );
        for (i, nest) in nests.iter().enumerate() {
            self.spawn_colony(
                config,
                PLAYER_COLONY_ID + 1 + i as u32,
                *nest,
                AntRole::EnemyQueen,
                AntRole::EnemyWorker,
                config.nest_workers,
                false,
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn spawn_colony(
        &mut self,
        config: &SimConfig,
        id: u32,
        anchor: (f32, f32),
        queen_role: AntRole,
        worker_role: AntRole,
        worker_count: usize,
        with_player: bool,
    ) {
        let queen_id = self.world.resource_mut::<AntIdGen>().next();
        let queen = self
            .world
            .spawn((
                AntBundle::new(
                    queen_id,
                    queen_role,
                    ColonyId(id),
                    anchor.0,
                    anchor.1,
                    config.max_health(queen_role),
                    config.stats_for(queen_role),
                ),
                SpawnTimer::default(),
            ))
            .id();

        let mut workers = Vec::with_capacity(worker_count);
        for i in 0..worker_count {
            // Ring the queen so freshly spawned ants do not stack.
            let angle = i as f32 / worker_count.max(1) as f32 * std::f32::consts::TAU;
            let x = anchor.0 + angle.cos() * 1.5;
            let y = anchor.1 + angle.sin() * 1.5;
            let worker_id = self.world.resource_mut::<AntIdGen>().next();
            let worker = self
                .world
                .spawn(AntBundle::new(
                    worker_id,
                    worker_role,
                    ColonyId(id),
                    x,
                    y,
                    config.max_health(worker_role),
                    config.stats_for(worker_role),
                ))
                .id();
            workers.push(worker);
        }

        if with_player {
            let player_id = self.world.resource_mut::<AntIdGen>().next();
            self.world.spawn((
                AntBundle::new(
                    player_id,
                    AntRole::Worker,
                    ColonyId(id),
                    anchor.0 + 0.5,
                    anchor.1,
                    config.player_max_health(),
                    config.player_stats(),
                ),
                PlayerControlled,
            ));
        }

        let mut colonies = self.world.resource_mut::<Colonies>();
        let colony = colonies.insert(id);
        colony.queen = Some(queen);
        colony.workers = workers;
    }

    /// Advance the simulation by a real-time delta.
    ///
    /// The delta is clamped to `max_frame_dt` and consumed in fixed
    /// steps, so a stalled frame never tunnels agents through walls.
    /// Once the run outcome is terminal this becomes a no-op.
    pub fn step(&mut self, real_dt: f32) {
        if self.outcome().is_over() {
            return;
        }
        let config = self.world.resource::<SimConfig>();
        let fixed = config.fixed_timestep;
        let clamped = real_dt.clamp(0.0, config.max_frame_dt);

        self.accumulator += clamped;
        while self.accumulator >= fixed {
            self.schedule.run(&mut self.world);
            self.tick += 1;
            self.time += fixed;
            self.accumulator -= fixed;
            if self.outcome().is_over() {
                self.accumulator = 0.0;
                break;
            }
        }
    }

    /// Replace the player input direction for subsequent ticks. Each
    /// axis is clamped to [-1, 1] and diagonals normalize to unit length.
    pub fn set_input(&mut self, dx: f32, dy: f32) {
        self.world.insert_resource(InputState::normalized(dx, dy));
    }

    /// Terminal state of the run.
    pub fn outcome(&self) -> RunOutcome {
        *self.world.resource::<RunOutcome>()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Capture a read-only snapshot of ants, food, and colonies.
    pub fn snapshot(&mut self) -> Snapshot {
        Snapshot::from_world(&mut self.world, self.tick, self.time)
    }

    /// Snapshot serialized as compact JSON.
    pub fn snapshot_json(&mut self) -> Result<String, serde_json::Error> {
        self.snapshot().to_json()
    }

    /// Whether terrain changed since the last [`tile_snapshot`] call.
    /// Fresh worlds start dirty so the first frame always uploads.
    ///
    /// [`tile_snapshot`]: SimWorld::tile_snapshot
    pub fn tiles_dirty(&self) -> bool {
        self.world.resource::<TileMap>().0.revision() != self.tile_revision_seen
    }

    /// Copy of the tile grid for terrain rendering. Clears the dirty flag.
    pub fn tile_snapshot(&mut self) -> TileSnapshot {
        let snapshot = TileSnapshot::from_grid(&self.world.resource::<TileMap>().0);
        self.tile_revision_seen = self.world.resource::<TileMap>().0.revision();
        snapshot
    }

    /// Direct world access for tests and advanced embedders.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}
