//! Read-only state snapshots for render and UI collaborators.
//!
//! A snapshot is a plain serializable copy of everything a frontend
//! needs: ants, food sources, colony stockpiles, and the run outcome.
//! Collaborators read snapshots; they never mutate simulation state.

use crate::colony::Colonies;
use crate::components::*;
use crate::systems::lifecycle::RunOutcome;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// One ant as a frontend sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AntSnapshot {
    pub id: u32,
    pub colony: u32,
    pub role: AntRole,
    pub x: f32,
    pub y: f32,
    pub health: f32,
    pub max_health: f32,
    pub state: BehaviorState,
    pub carrying: f32,
    pub is_player: bool,
}

/// One food source as a frontend sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodSnapshot {
    pub x: f32,
    pub y: f32,
    pub amount: f32,
    pub max: f32,
}

/// One colony's aggregate state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColonySnapshot {
    pub id: u32,
    pub food: f32,
    pub worker_count: usize,
    pub has_queen: bool,
}

/// Complete per-tick view of the simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub time: f32,
    pub outcome: RunOutcome,
    pub ants: Vec<AntSnapshot>,
    pub food: Vec<FoodSnapshot>,
    pub colonies: Vec<ColonySnapshot>,
}

impl Snapshot {
    /// Capture the current world state.
    pub fn from_world(world: &mut World, tick: u64, time: f32) -> Self {
        let outcome = *world.resource::<RunOutcome>();

        let mut ants: Vec<AntSnapshot> = world
            .query::<(
                &AntId,
                &ColonyId,
                &AntRole,
                &Position,
                &Health,
                &BehaviorState,
                &Carrying,
                Option<&PlayerControlled>,
            )>()
            .iter(world)
            .map(
                |(id, colony, role, pos, health, state, carrying, player)| AntSnapshot {
                    id: id.0,
                    colony: colony.0,
                    role: *role,
                    x: pos.x,
                    y: pos.y,
                    health: health.current,
                    max_health: health.max,
                    state: *state,
                    carrying: carrying.0,
                    is_player: player.is_some(),
                },
            )
            .collect();
        // Stable ordering for consumers and for diffable JSON output.
        ants.sort_by_key(|a| a.id);

        let food: Vec<FoodSnapshot> = world
            .query_filtered::<(&Position, &FoodAmount), With<FoodSource>>()
            .iter(world)
            .map(|(pos, amount)| FoodSnapshot {
                x: pos.x,
                y: pos.y,
                amount: amount.amount,
                max: amount.max,
            })
            .collect();

        let colonies: Vec<ColonySnapshot> = world
            .resource::<Colonies>()
            .iter()
            .map(|colony| ColonySnapshot {
                id: colony.id,
                food: colony.food,
                worker_count: colony.workers.len(),
                has_queen: colony.queen.is_some(),
            })
            .collect();

        Self {
            tick,
            time,
            outcome,
            ants,
            food,
            colonies,
        }
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to human-readable JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
