//! Colony state - per-faction food stockpile, queen, and worker roster.
//!
//! Colonies live in a flat id-indexed table; ants reference their colony
//! by [`ColonyId`](crate::components::ColonyId) and the colony references
//! its members by `Entity`, so there are no ownership cycles between
//! workers and queens.

use bevy_ecs::prelude::*;
use std::collections::BTreeMap;

/// The colony the player belongs to. Enemy nests take ids from 1 up.
pub const PLAYER_COLONY_ID: u32 = 0;

/// One faction's persistent state.
#[derive(Debug, Clone)]
pub struct Colony {
    pub id: u32,
    /// Shared food stockpile; non-negative, adjusted only by deliveries
    /// and spawn spending.
    pub food: f32,
    /// The colony's queen, if she still lives.
    pub queen: Option<Entity>,
    /// Worker roster in insertion order; mutated only by spawn and death.
    pub workers: Vec<Entity>,
}

impl Colony {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            food: 0.0,
            queen: None,
            workers: Vec::new(),
        }
    }

    /// Add delivered food to the stockpile.
    pub fn deposit(&mut self, amount: f32) {
        self.food += amount.max(0.0);
    }

    /// Spend food if the stockpile covers it. Returns whether the spend
    /// happened; insufficient food is an ordinary outcome, not an error.
    pub fn try_spend(&mut self, amount: f32) -> bool {
        if self.food >= amount {
            self.food -= amount;
            true
        } else {
            false
        }
    }
}

/// Resource holding all colonies, keyed by colony id.
#[derive(Resource, Debug, Clone, Default)]
pub struct Colonies {
    table: BTreeMap<u32, Colony>,
}

impl Colonies {
    /// Register a new colony and return its id.
    pub fn insert(&mut self, id: u32) -> &mut Colony {
        self.table.entry(id).or_insert_with(|| Colony::new(id))
    }

    pub fn get(&self, id: u32) -> Option<&Colony> {
        self.table.get(&id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Colony> {
        self.table.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Colony> {
        self.table.values()
    }

    /// Remove a dead worker from its colony's roster.
    pub fn remove_worker(&mut self, id: u32, worker: Entity) {
        if let Some(colony) = self.table.get_mut(&id) {
            colony.workers.retain(|&e| e != worker);
        }
    }

    /// Clear the queen reference once she dies.
    pub fn remove_queen(&mut self, id: u32, queen: Entity) {
        if let Some(colony) = self.table.get_mut(&id) {
            if colony.queen == Some(queen) {
                colony.queen = None;
            }
        }
    }
}
