//! Simulation configuration.
//!
//! Every tunable the simulation reads lives here with a documented default,
//! so tests and embedders can build reproducible worlds without touching
//! the systems themselves.

use crate::components::{AntRole, AntStats};
use bevy_ecs::prelude::*;

/// Configuration for the simulation: world generation parameters, colony
/// economics, combat balance, and the fixed-timestep driver.
#[derive(Resource, Debug, Clone)]
pub struct SimConfig {
    /// World width in tiles.
    pub world_width: usize,
    /// World height in tiles.
    pub world_height: usize,
    /// Rows from the top that are permanently open air (the surface).
    pub surface_rows: usize,

    /// Initial cave fill probability for the cellular automaton (0..1).
    pub cave_fill_probability: f32,
    /// Number of majority-rule smoothing passes.
    pub cave_smoothing_iterations: usize,
    /// Number of standalone circular chambers to carve.
    pub cave_room_count: usize,
    /// Number of winding tunnels to carve.
    pub tunnel_count: usize,
    /// Number of vertical shafts to carve.
    pub shaft_count: usize,
    /// Number of complex caves (main chamber plus connected satellites).
    pub complex_cave_count: usize,

    /// Number of food sources to place (fewer if candidates run out).
    pub food_spawn_count: usize,
    /// Number of enemy nests to place (fewer if candidates run out).
    pub enemy_nest_count: usize,
    /// Minimum distance between placements and the starting chamber.
    pub min_spawn_separation: f32,
    /// Food units in a freshly placed source.
    pub food_source_amount: f32,
    /// Workers spawned per colony at world start.
    pub starting_workers: usize,
    /// Enemy grunts spawned per nest at world start.
    pub nest_workers: usize,

    /// Seconds a queen must accumulate before she can spawn a worker.
    pub queen_spawn_cooldown: f32,
    /// Food deducted from the colony stockpile per spawned worker.
    pub food_per_worker: f32,

    /// Movement speed in tiles per second, by role.
    pub speed_player: f32,
    pub speed_worker: f32,
    pub speed_enemy: f32,
    /// Dig power applied per second of pressing against a wall, by role.
    pub dig_power_player: f32,
    pub dig_power_worker: f32,
    pub dig_power_enemy: f32,
    /// Maximum food units carried at once, by role.
    pub carry_player: f32,
    pub carry_worker: f32,
    pub carry_enemy: f32,
    /// Flat damage per hit, by role.
    pub attack_damage_player: f32,
    pub attack_damage_worker: f32,
    pub attack_damage_enemy: f32,
    /// Seconds between attacks, by role.
    pub attack_cooldown_player: f32,
    pub attack_cooldown_worker: f32,
    pub attack_cooldown_enemy: f32,

    /// Distance at which a hostile interrupts the current task.
    pub aggro_range: f32,
    /// Distance at which an attack can land.
    pub attack_range: f32,
    /// Distance at which food transfers from a source to the carrier.
    pub pickup_radius: f32,
    /// Distance at which carried food transfers to the queen's stockpile.
    pub delivery_radius: f32,
    /// Seconds between fresh wander targets while idle.
    pub wander_interval: f32,
    /// Seconds between path recomputations while routing to a target.
    pub path_recalc_interval: f32,
    /// Hard cap on A* node expansions per query.
    pub pathfind_iteration_cap: usize,

    /// Fixed timestep in seconds (1/30 = 30 Hz).
    pub fixed_timestep: f32,
    /// Maximum real time consumed per `step` call; larger deltas are
    /// clamped so a stalled frame cannot tunnel agents through walls.
    pub max_frame_dt: f32,
    /// RNG seed; `None` seeds from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            world_width: 120,
            world_height: 80,
            surface_rows: 12,

            cave_fill_probability: 0.48,
            cave_smoothing_iterations: 4,
            cave_room_count: 6,
            tunnel_count: 5,
            shaft_count: 3,
            complex_cave_count: 2,

            food_spawn_count: 10,
            enemy_nest_count: 2,
            min_spawn_separation: 18.0,
            food_source_amount: 50.0,
            starting_workers: 4,
            nest_workers: 3,

            queen_spawn_cooldown: 10.0,
            food_per_worker: 20.0,

            speed_player: 4.0,
            speed_worker: 3.0,
            speed_enemy: 2.5,
            dig_power_player: 2.0,
            dig_power_worker: 1.0,
            dig_power_enemy: 0.8,
            carry_player: 20.0,
            carry_worker: 10.0,
            carry_enemy: 5.0,
            attack_damage_player: 15.0,
            attack_damage_worker: 10.0,
            attack_damage_enemy: 6.0,
            attack_cooldown_player: 0.5,
            attack_cooldown_worker: 0.6,
            attack_cooldown_enemy: 0.8,

            aggro_range: 6.0,
            attack_range: 1.2,
            pickup_radius: 0.8,
            delivery_radius: 1.5,
            wander_interval: 3.0,
            path_recalc_interval: 1.0,
            pathfind_iteration_cap: 500,

            fixed_timestep: 1.0 / 30.0,
            max_frame_dt: 0.1,
            rng_seed: None,
        }
    }
}

impl SimConfig {
    /// Movement speed for a role. Queens never move.
    pub fn speed(&self, role: AntRole) -> f32 {
        match role {
            AntRole::Worker => self.speed_worker,
            AntRole::EnemyWorker => self.speed_enemy,
            AntRole::Queen | AntRole::EnemyQueen => 0.0,
        }
    }

    /// Dig power per second for a role.
    pub fn dig_power(&self, role: AntRole) -> f32 {
        match role {
            AntRole::Worker => self.dig_power_worker,
            AntRole::EnemyWorker => self.dig_power_enemy,
            AntRole::Queen | AntRole::EnemyQueen => 0.0,
        }
    }

    /// Carry capacity for a role.
    pub fn carry_capacity(&self, role: AntRole) -> f32 {
        match role {
            AntRole::Worker => self.carry_worker,
            AntRole::EnemyWorker => self.carry_enemy,
            AntRole::Queen | AntRole::EnemyQueen => 0.0,
        }
    }

    /// Flat damage per hit for a role.
    pub fn attack_damage(&self, role: AntRole) -> f32 {
        match role {
            AntRole::Worker => self.attack_damage_worker,
            AntRole::EnemyWorker => self.attack_damage_enemy,
            // Queens defend themselves, weakly.
            AntRole::Queen | AntRole::EnemyQueen => self.attack_damage_enemy,
        }
    }

    /// Attack cooldown in seconds for a role.
    pub fn attack_cooldown(&self, role: AntRole) -> f32 {
        match role {
            AntRole::Worker => self.attack_cooldown_worker,
            AntRole::EnemyWorker | AntRole::Queen | AntRole::EnemyQueen => {
                self.attack_cooldown_enemy
            }
        }
    }

    /// Maximum health for a role.
    pub fn max_health(&self, role: AntRole) -> f32 {
        match role {
            AntRole::Worker => 50.0,
            AntRole::EnemyWorker => 40.0,
            AntRole::Queen => 200.0,
            AntRole::EnemyQueen => 150.0,
        }
    }

    /// Per-ant stats for a role, pulled from the balance tables above.
    pub fn stats_for(&self, role: AntRole) -> AntStats {
        AntStats {
            speed: self.speed(role),
            dig_power: self.dig_power(role),
            carry_capacity: self.carry_capacity(role),
            attack_damage: self.attack_damage(role),
            attack_range: self.attack_range,
            aggro_range: self.aggro_range,
            attack_cooldown: self.attack_cooldown(role),
        }
    }

    /// Stats for the player-controlled ant (a worker with its own
    /// balance column).
    pub fn player_stats(&self) -> AntStats {
        AntStats {
            speed: self.speed_player,
            dig_power: self.dig_power_player,
            carry_capacity: self.carry_player,
            attack_damage: self.attack_damage_player,
            attack_range: self.attack_range,
            aggro_range: self.aggro_range,
            attack_cooldown: self.attack_cooldown_player,
        }
    }

    /// Maximum health for the player-controlled ant.
    pub fn player_max_health(&self) -> f32 {
        100.0
    }
}
