//! ECS components for the colony simulation.
//!
//! Components are pure data containers attached to entities.
//! All game logic lives in systems that query these components.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

// ============================================================================
// SPATIAL COMPONENTS
// ============================================================================

/// 2D position in tile units (continuous; the tile grid floors it).
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// 2D velocity in tiles per second.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub vx: f32,
    pub vy: f32,
}

impl Velocity {
    pub fn new(vx: f32, vy: f32) -> Self {
        Self { vx, vy }
    }

    pub fn magnitude(&self) -> f32 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }

    /// Point toward a target at the given speed. Zero velocity when
    /// already on top of the target.
    pub fn aim(from: &Position, to: (f32, f32), speed: f32) -> Self {
        let dx = to.0 - from.x;
        let dy = to.1 - from.y;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist < 1e-4 {
            Self::default()
        } else {
            Self {
                vx: dx / dist * speed,
                vy: dy / dist * speed,
            }
        }
    }
}

// ============================================================================
// IDENTITY COMPONENTS
// ============================================================================

/// Stable identifier for an ant, used by snapshots.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AntId(pub u32);

/// Faction identifier. Ants of differing colonies are hostile.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColonyId(pub u32);

/// Behavior tag dispatched by the systems - no inheritance, one
/// `advance`-equivalent update path per role.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AntRole {
    Worker,
    Queen,
    EnemyWorker,
    EnemyQueen,
}

impl AntRole {
    pub fn is_queen(&self) -> bool {
        matches!(self, AntRole::Queen | AntRole::EnemyQueen)
    }
}

/// Marker for the directly controlled ant.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PlayerControlled;

// ============================================================================
// VITALS & COMBAT COMPONENTS
// ============================================================================

/// Health of an ant. Damage clamps to `[0, max]`; death (current == 0)
/// is irreversible - there is no heal path.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    pub fn damage(&mut self, amount: f32) {
        self.current = (self.current - amount).clamp(0.0, self.max);
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(50.0)
    }
}

/// Per-ant tunables, filled from `SimConfig` by role at spawn time.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AntStats {
    /// Movement speed (tiles per second).
    pub speed: f32,
    /// Dig effort applied per second of pressing against a wall.
    pub dig_power: f32,
    /// Maximum food units carried at once.
    pub carry_capacity: f32,
    /// Flat damage per landed hit.
    pub attack_damage: f32,
    /// Distance at which an attack can land.
    pub attack_range: f32,
    /// Distance at which a hostile interrupts the current task.
    pub aggro_range: f32,
    /// Seconds between attacks.
    pub attack_cooldown: f32,
}

impl Default for AntStats {
    fn default() -> Self {
        Self {
            speed: 3.0,
            dig_power: 1.0,
            carry_capacity: 10.0,
            attack_damage: 10.0,
            attack_range: 1.2,
            aggro_range: 6.0,
            attack_cooldown: 0.6,
        }
    }
}

// ============================================================================
// BEHAVIOR COMPONENTS
// ============================================================================

/// Foraging state machine. Fighting overlays the loop from any state when
/// a hostile enters aggro range; death is handled by the lifecycle sweep.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BehaviorState {
    #[default]
    Idle,
    SeekingFood,
    CarryingFood,
    Fighting,
}

/// Food currently carried, `0 <= carried <= stats.carry_capacity`.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Carrying(pub f32);

/// Per-ant countdown timers, all in seconds.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct AntTimers {
    /// Remaining attack cooldown; an attack is legal at zero.
    pub attack: f32,
    /// Time until the current path is recomputed.
    pub path: f32,
    /// Time until a fresh wander target is picked.
    pub wander: f32,
}

impl AntTimers {
    pub fn tick(&mut self, dt: f32) {
        self.attack = (self.attack - dt).max(0.0);
        self.path = (self.path - dt).max(0.0);
        self.wander = (self.wander - dt).max(0.0);
    }
}

/// Current behavior targets. Entity references are resolved (and dropped
/// when stale) each tick by the behavior system.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct AiTarget {
    pub food: Option<Entity>,
    pub hostile: Option<Entity>,
    pub wander_point: Option<(f32, f32)>,
}

/// Waypoint queue produced by the pathfinder.
#[derive(Component, Debug, Clone, Default)]
pub struct PathFollow {
    pub waypoints: Vec<(f32, f32)>,
    pub next: usize,
}

impl PathFollow {
    pub fn set(&mut self, waypoints: Vec<(f32, f32)>) {
        self.waypoints = waypoints;
        self.next = 0;
    }

    pub fn clear(&mut self) {
        self.waypoints.clear();
        self.next = 0;
    }

    pub fn current(&self) -> Option<(f32, f32)> {
        self.waypoints.get(self.next).copied()
    }

    /// Pop the current waypoint once reached.
    pub fn advance(&mut self) {
        self.next += 1;
        if self.next >= self.waypoints.len() {
            self.clear();
        }
    }
}

/// Accumulating spawn timer carried by queens.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SpawnTimer(pub f32);

// ============================================================================
// FOOD COMPONENTS
// ============================================================================

/// Marker for food source entities.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct FoodSource;

/// Remaining food in a source, `0 <= amount <= max`. The source entity is
/// despawned by the lifecycle sweep once depleted.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FoodAmount {
    pub amount: f32,
    pub max: f32,
}

impl FoodAmount {
    pub fn new(amount: f32) -> Self {
        Self {
            amount,
            max: amount,
        }
    }

    pub fn is_depleted(&self) -> bool {
        self.amount <= 0.0
    }

    /// Remove up to `requested` units, returning what was actually taken.
    pub fn take(&mut self, requested: f32) -> f32 {
        let taken = requested.min(self.amount).max(0.0);
        self.amount -= taken;
        taken
    }
}

// ============================================================================
// RESOURCES & BUNDLES
// ============================================================================

/// Allocator for stable ant ids across the run.
#[derive(Resource, Debug, Default)]
pub struct AntIdGen(u32);

impl AntIdGen {
    pub fn next(&mut self) -> AntId {
        let id = AntId(self.0);
        self.0 += 1;
        id
    }
}

/// Bundle for spawning a complete ant entity.
#[derive(Bundle)]
pub struct AntBundle {
    pub id: AntId,
    pub role: AntRole,
    pub colony: ColonyId,
    pub position: Position,
    pub velocity: Velocity,
    pub health: Health,
    pub stats: AntStats,
    pub state: BehaviorState,
    pub carrying: Carrying,
    pub timers: AntTimers,
    pub target: AiTarget,
    pub path: PathFollow,
}

impl AntBundle {
    pub fn new(
        id: AntId,
        role: AntRole,
        colony: ColonyId,
        x: f32,
        y: f32,
        health: f32,
        stats: AntStats,
    ) -> Self {
        Self {
            id,
            role,
            colony,
            position: Position::new(x, y),
            velocity: Velocity::default(),
            health: Health::new(health),
            stats,
            state: BehaviorState::Idle,
            carrying: Carrying::default(),
            timers: AntTimers::default(),
            target: AiTarget::default(),
            path: PathFollow::default(),
        }
    }
}

/// Bundle for spawning a food source.
#[derive(Bundle)]
pub struct FoodBundle {
    pub marker: FoodSource,
    pub position: Position,
    pub amount: FoodAmount,
}

impl FoodBundle {
    pub fn new(x: f32, y: f32, amount: f32) -> Self {
        Self {
            marker: FoodSource,
            position: Position::new(x, y),
            amount: FoodAmount::new(amount),
        }
    }
}
